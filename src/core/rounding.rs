//! Clock-in/clock-out time rounding.

use crate::config::{RoundingDirection, TimeRoundingConfig};
use crate::errors::{AppError, AppResult};
use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde_json::{Map, Value};

const LAST_MINUTE: u32 = 23 * 60 + 59;

/// Round `dt` to the configured grid. Seconds are always dropped when
/// rounding is enabled; results past midnight stay on the same day at 23:59.
pub fn round_time(dt: NaiveDateTime, cfg: &TimeRoundingConfig) -> NaiveDateTime {
    if !cfg.enabled || cfg.rounding_minutes == 0 {
        return dt;
    }

    let m = dt.hour() * 60 + dt.minute();
    let r = cfg.rounding_minutes;

    let rounded = match cfg.rounding_direction {
        RoundingDirection::Up => m.div_ceil(r) * r,
        RoundingDirection::Down => (m / r) * r,
        RoundingDirection::Nearest => ((m as f64 / r as f64).round() as u32) * r,
    }
    .min(LAST_MINUTE);

    let t = NaiveTime::from_hms_opt(rounded / 60, rounded % 60, 0).unwrap_or(dt.time());
    dt.date().and_time(t)
}

pub fn round_start(dt: NaiveDateTime, cfg: &TimeRoundingConfig) -> NaiveDateTime {
    if cfg.start_time_rounding {
        round_time(dt, cfg)
    } else {
        dt
    }
}

pub fn round_stop(dt: NaiveDateTime, cfg: &TimeRoundingConfig) -> NaiveDateTime {
    if cfg.end_time_rounding {
        round_time(dt, cfg)
    } else {
        dt
    }
}

/// Merge a partial JSON update into `current` and validate the result.
pub fn merge_update(
    current: &TimeRoundingConfig,
    update: &Map<String, Value>,
) -> AppResult<TimeRoundingConfig> {
    let mut doc = match serde_json::to_value(current)? {
        Value::Object(m) => m,
        _ => Map::new(),
    };
    for (k, v) in update {
        doc.insert(k.clone(), v.clone());
    }

    if let Some(dir) = doc.get("rounding_direction")
        && !matches!(dir.as_str(), Some("up" | "down" | "nearest"))
    {
        return Err(AppError::BadRequest(
            "rounding_direction musi być jednym z: up, down, nearest".into(),
        ));
    }

    let merged: TimeRoundingConfig = serde_json::from_value(Value::Object(doc))
        .map_err(|e| AppError::BadRequest(format!("Niepoprawna konfiguracja: {e}")))?;

    if !(1..=60).contains(&merged.rounding_minutes) {
        return Err(AppError::BadRequest(
            "rounding_minutes musi być w zakresie 1-60".into(),
        ));
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::date::parse_datetime;
    use serde_json::json;

    fn cfg(direction: RoundingDirection, minutes: u32) -> TimeRoundingConfig {
        TimeRoundingConfig {
            enabled: true,
            rounding_minutes: minutes,
            rounding_direction: direction,
            ..TimeRoundingConfig::default()
        }
    }

    fn at(s: &str) -> NaiveDateTime {
        parse_datetime(s).unwrap()
    }

    #[test]
    fn disabled_is_identity() {
        let dt = at("2025-03-10 08:07:33");
        assert_eq!(round_time(dt, &TimeRoundingConfig::default()), dt);
    }

    #[test]
    fn directions() {
        let dt = at("2025-03-10 08:07:33");
        assert_eq!(
            round_time(dt, &cfg(RoundingDirection::Nearest, 15)),
            at("2025-03-10 08:00:00")
        );
        assert_eq!(
            round_time(dt, &cfg(RoundingDirection::Up, 15)),
            at("2025-03-10 08:15:00")
        );
        assert_eq!(
            round_time(at("2025-03-10 08:14:59"), &cfg(RoundingDirection::Down, 15)),
            at("2025-03-10 08:00:00")
        );
    }

    #[test]
    fn ties_round_up() {
        let dt = at("2025-03-10 08:05:00");
        assert_eq!(
            round_time(dt, &cfg(RoundingDirection::Nearest, 10)),
            at("2025-03-10 08:10:00")
        );
    }

    #[test]
    fn never_crosses_midnight() {
        let dt = at("2025-03-10 23:55:00");
        assert_eq!(
            round_time(dt, &cfg(RoundingDirection::Up, 15)),
            at("2025-03-10 23:59:00")
        );
    }

    #[test]
    fn merge_validates_minutes_and_direction() {
        let base = TimeRoundingConfig::default();

        let ok = merge_update(&base, json!({"enabled": true, "rounding_minutes": 5}).as_object().unwrap()).unwrap();
        assert!(ok.enabled);
        assert_eq!(ok.rounding_minutes, 5);
        assert_eq!(ok.rounding_direction, RoundingDirection::Nearest);

        let bad = merge_update(&base, json!({"rounding_minutes": 0}).as_object().unwrap());
        assert!(matches!(bad, Err(AppError::BadRequest(_))));

        let bad = merge_update(&base, json!({"rounding_direction": "sideways"}).as_object().unwrap());
        assert!(matches!(bad, Err(AppError::BadRequest(_))));
    }
}
