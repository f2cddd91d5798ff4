//! Date / datetime helpers shared by the db layer, the calculator and the API.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Storage format for every timestamp column.
pub const DB_DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FMT: &str = "%Y-%m-%d";

/// Formats accepted from clients, tried in order.
const INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Current local time truncated to whole seconds.
pub fn now() -> NaiveDateTime {
    let n = Local::now().naive_local();
    n.with_nanosecond(0).unwrap_or(n)
}

pub fn to_db(dt: &NaiveDateTime) -> String {
    dt.format(DB_DATETIME_FMT).to_string()
}

/// `serialize_with` helpers emitting the storage format in JSON.
pub mod db_format {
    use super::to_db;
    use chrono::NaiveDateTime;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&to_db(dt))
    }

    pub fn serialize_opt<S: Serializer>(dt: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error> {
        match dt {
            Some(dt) => s.serialize_str(&to_db(dt)),
            None => s.serialize_none(),
        }
    }
}

pub fn day_start(d: NaiveDate) -> NaiveDateTime {
    d.and_time(NaiveTime::MIN)
}

/// Exclusive upper bound of a day: the next midnight.
pub fn day_end_exclusive(d: NaiveDate) -> AppResult<NaiveDateTime> {
    d.succ_opt()
        .map(day_start)
        .ok_or_else(|| AppError::InvalidDate(d.format(DATE_FMT).to_string()))
}

pub fn parse_date(s: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FMT).map_err(|_| AppError::InvalidDate(s.to_string()))
}

/// Parse a value read back from a timestamp column.
pub fn parse_db(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    INPUT_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, DATE_FMT)
                .ok()
                .map(day_start)
        })
}

/// Parse a client supplied datetime. RFC 3339 values with an offset are
/// converted to local time, naive values are taken as local already.
pub fn parse_datetime(s: &str) -> AppResult<NaiveDateTime> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        let local = dt.with_timezone(&Local).naive_local();
        return Ok(local.with_nanosecond(0).unwrap_or(local));
    }

    INPUT_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .map(|dt| dt.with_nanosecond(0).unwrap_or(dt))
        .ok_or_else(|| AppError::InvalidDateTime(s.to_string()))
}

/// `date` + `HH:MM`.
pub fn combine(date: NaiveDate, hhmm: &str) -> AppResult<NaiveDateTime> {
    let t = NaiveTime::parse_from_str(hhmm.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(hhmm.trim(), "%H:%M:%S"))
        .map_err(|_| AppError::InvalidTime(hhmm.to_string()))?;
    Ok(date.and_time(t))
}

pub fn hhmm(dt: &NaiveDateTime) -> String {
    dt.format("%H:%M").to_string()
}

/// Monday of the week containing `d`.
pub fn week_start(d: NaiveDate) -> NaiveDate {
    d.checked_sub_signed(Duration::days(d.weekday().num_days_from_monday() as i64))
        .unwrap_or(d)
}

pub fn month_start(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "Styczeń",
        2 => "Luty",
        3 => "Marzec",
        4 => "Kwiecień",
        5 => "Maj",
        6 => "Czerwiec",
        7 => "Lipiec",
        8 => "Sierpień",
        9 => "Wrzesień",
        10 => "Październik",
        11 => "Listopad",
        12 => "Grudzień",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_client_format() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(8, 5, 0)
            .unwrap();

        for raw in [
            "2025-03-10T08:05:00",
            "2025-03-10 08:05:00",
            "2025-03-10T08:05",
            "2025-03-10 08:05",
            "2025-03-10T08:05:00.123456",
        ] {
            assert_eq!(parse_datetime(raw).unwrap(), expected, "{raw}");
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_datetime("yesterday"),
            Err(AppError::InvalidDateTime(_))
        ));
        assert!(parse_date("2025-13-01").is_err());
    }

    #[test]
    fn day_end_is_next_midnight_or_an_error() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        assert_eq!(day_end_exclusive(d).unwrap(), parse_datetime("2025-04-01 00:00").unwrap());

        let last = parse_date("+262142-12-31").unwrap();
        assert!(matches!(day_end_exclusive(last), Err(AppError::InvalidDate(_))));
        assert_eq!(week_start(NaiveDate::MIN), NaiveDate::MIN);
    }

    #[test]
    fn week_starts_on_monday() {
        let sunday = NaiveDate::from_ymd_opt(2025, 3, 16).unwrap();
        assert_eq!(
            week_start(sunday),
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
        );
    }
}
