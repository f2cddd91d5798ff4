//! Formatting utilities used for CLI, API and export outputs.

/// Duration text used across attendance reports: `"7h 45min"`.
pub fn duration_text(seconds: i64) -> String {
    let s = seconds.max(0);
    format!("{}h {}min", s / 3600, (s % 3600) / 60)
}

/// Round to 2 decimals, half away from zero.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn hours(seconds: i64) -> f64 {
    seconds as f64 / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_text_truncates_minutes() {
        assert_eq!(duration_text(7 * 3600 + 45 * 60 + 59), "7h 45min");
        assert_eq!(duration_text(0), "0h 0min");
    }

    #[test]
    fn round2_half_away_from_zero() {
        assert_eq!(round2(1.005_000_1), 1.01);
        assert_eq!(round2(240.0), 240.0);
        assert_eq!(round2(-2.345_000_1), -2.35);
    }
}
