use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Excel serial number and number format for date-like cells.
/// Returns `None` for anything that is not a date, datetime or clock time.
pub(crate) fn parse_to_excel_date(s: &str) -> Option<(&'static str, f64)> {
    let s = s.trim();

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(("yyyy-mm-dd hh:mm", excel_serial(&dt)?));
        }
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(("yyyy-mm-dd", excel_serial(&d.and_hms_opt(0, 0, 0)?)?));
    }

    for fmt in ["%H:%M:%S", "%H:%M"] {
        if let Ok(t) = NaiveTime::parse_from_str(s, fmt) {
            return Some(("hh:mm", t.num_seconds_from_midnight() as f64 / 86400.0));
        }
    }

    None
}

fn excel_serial(dt: &NaiveDateTime) -> Option<f64> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let d = *dt - epoch;
    let days = d.num_days();
    Some(days as f64 + (d.num_seconds() - days * 86400) as f64 / 86400.0)
}
