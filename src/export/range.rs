use crate::errors::{AppError, AppResult};
use crate::utils::date::month_start;
use chrono::{Datelike, Months, NaiveDate};

fn bad(msg: &str) -> AppError {
    AppError::InvalidDate(msg.to_string())
}

/// First and last day covered by one `YYYY`, `YYYY-MM` or `YYYY-MM-DD` token.
fn bounds(token: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    match token.len() {
        4 => {
            let y: i32 = token.parse().map_err(|_| bad(token))?;
            let first = NaiveDate::from_ymd_opt(y, 1, 1).ok_or_else(|| bad(token))?;
            let last = NaiveDate::from_ymd_opt(y, 12, 31).ok_or_else(|| bad(token))?;
            Ok((first, last))
        }
        7 => {
            let first = NaiveDate::parse_from_str(&format!("{token}-01"), "%Y-%m-%d")
                .map_err(|_| bad(token))?;
            Ok((first, month_end(first)?))
        }
        10 => {
            let d = NaiveDate::parse_from_str(token, "%Y-%m-%d").map_err(|_| bad(token))?;
            Ok((d, d))
        }
        _ => Err(bad(token)),
    }
}

fn month_end(first: NaiveDate) -> AppResult<NaiveDate> {
    first
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| bad(&first.to_string()))
}

/// Parse `--range`.
///
/// Accepts `YYYY`, `YYYY-MM`, `YYYY-MM-DD` and `start:end` pairs of the same
/// shape. `None` means the month containing `today`.
pub fn parse_range(r: Option<&str>, today: NaiveDate) -> AppResult<(NaiveDate, NaiveDate)> {
    let Some(r) = r.map(str::trim).filter(|r| !r.is_empty()) else {
        let first = month_start(today);
        return Ok((first, month_end(first)?));
    };

    let (from, to) = match r.split_once(':') {
        Some((start, end)) => {
            let (start, end) = (start.trim(), end.trim());
            if start.len() != end.len() {
                return Err(bad("start and end must have the same format"));
            }
            (bounds(start)?.0, bounds(end)?.1)
        }
        None => bounds(r)?,
    };

    if from > to {
        return Err(AppError::BadRequest(format!(
            "range start {from} is after its end {to}"
        )));
    }
    Ok((from, to))
}

/// Human title for a report period.
pub fn period_label(from: NaiveDate, to: NaiveDate) -> String {
    if from == to {
        return from.to_string();
    }
    if from.day() == 1 && month_end(from).ok() == Some(to) {
        return format!("{} {}", crate::utils::date::month_name(from.month()), from.year());
    }
    format!("{from} - {to}")
}
