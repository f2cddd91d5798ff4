//! Polish statutory public holidays.

use chrono::{Datelike, Duration, NaiveDate};

/// Easter Sunday, anonymous Gregorian algorithm.
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// Every public holiday of `year`, sorted.
pub fn holidays_in_year(year: i32) -> Vec<NaiveDate> {
    let mut fixed: Vec<(u32, u32)> = vec![
        (1, 1),
        (5, 1),
        (5, 3),
        (8, 15),
        (11, 1),
        (11, 11),
        (12, 25),
        (12, 26),
    ];
    if year >= 2011 {
        fixed.push((1, 6));
    }
    if year >= 2025 {
        fixed.push((12, 24));
    }

    let mut days: Vec<NaiveDate> = fixed
        .into_iter()
        .filter_map(|(m, d)| NaiveDate::from_ymd_opt(year, m, d))
        .collect();

    if let Some(easter) = easter_sunday(year) {
        // Easter, Easter Monday, Pentecost, Corpus Christi
        days.extend(
            [0, 1, 49, 60]
                .into_iter()
                .filter_map(|offset| easter.checked_add_signed(Duration::days(offset))),
        );
    }

    days.sort();
    days
}

pub fn is_public_holiday(date: NaiveDate) -> bool {
    holidays_in_year(date.year()).contains(&date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn easter_dates() {
        assert_eq!(easter_sunday(2024), Some(d(2024, 3, 31)));
        assert_eq!(easter_sunday(2025), Some(d(2025, 4, 20)));
        assert_eq!(easter_sunday(2026), Some(d(2026, 4, 5)));
    }

    #[test]
    fn movable_feasts_follow_easter() {
        assert!(is_public_holiday(d(2025, 4, 21)));
        assert!(is_public_holiday(d(2025, 6, 8)));
        assert!(is_public_holiday(d(2025, 6, 19)));
        assert!(!is_public_holiday(d(2025, 4, 22)));
    }

    #[test]
    fn christmas_eve_only_from_2025() {
        assert!(!is_public_holiday(d(2024, 12, 24)));
        assert!(is_public_holiday(d(2025, 12, 24)));
    }

    #[test]
    fn epiphany_only_from_2011() {
        assert!(!is_public_holiday(d(2010, 1, 6)));
        assert!(is_public_holiday(d(2011, 1, 6)));
        assert_eq!(holidays_in_year(2025).len(), 14);
    }
}
