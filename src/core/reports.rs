//! Attendance reports read by the web panel and the exporters.

use crate::config::PayrollConfig;
use crate::core::calculator::{
    AttendanceDetails, AttendanceSummary, PayrollCalculator, build_details, is_public_holiday,
};
use crate::db::{employees, shifts};
use crate::errors::AppResult;
use crate::models::Employee;
use crate::utils::date::{self, hhmm};
use crate::utils::formatting::{duration_text, hours, round2};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Closed shifts of one worker started within `[from, to]`, priced.
pub fn attendance_details(
    conn: &Connection,
    payroll: &PayrollConfig,
    worker_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<AttendanceDetails> {
    let Some(emp) = employees::find_employee(conn, worker_id)? else {
        return Ok(AttendanceDetails::default());
    };

    let calc = PayrollCalculator::new(payroll)?;
    let in_range = shifts::closed_shifts_between(
        conn,
        Some(worker_id),
        date::day_start(from),
        date::day_end_exclusive(to)?,
    )?;
    let history = shifts::all_closed_shifts(conn, worker_id)?;

    Ok(build_details(&calc, &emp, &in_range, &history))
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkSummaryRow {
    pub id: String,
    pub imie: String,
    pub nazwisko: String,
    #[serde(flatten)]
    pub summary: AttendanceSummary,
}

/// Payroll summary of every employee over `[from, to]`.
pub fn work_summary(
    conn: &Connection,
    payroll: &PayrollConfig,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<Vec<WorkSummaryRow>> {
    let calc = PayrollCalculator::new(payroll)?;
    let mut rows = Vec::new();

    for emp in employees::list_employees(conn)? {
        let in_range = shifts::closed_shifts_between(
            conn,
            Some(&emp.id),
            date::day_start(from),
            date::day_end_exclusive(to)?,
        )?;
        let history = shifts::all_closed_shifts(conn, &emp.id)?;
        let details = build_details(&calc, &emp, &in_range, &history);

        rows.push(WorkSummaryRow {
            id: emp.id.clone(),
            imie: emp.first_name().to_string(),
            nazwisko: emp.last_name().to_string(),
            summary: details.summary,
        });
    }

    Ok(rows)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummaryRow {
    pub id: String,
    pub name: String,
    pub rate: f64,
    pub days_present: usize,
    pub total_time: String,
    pub total_hours: f64,
    pub saturdays: u32,
    pub sundays: u32,
    pub holidays: u32,
}

fn employee_map(conn: &Connection) -> AppResult<HashMap<String, Employee>> {
    Ok(employees::list_employees(conn)?
        .into_iter()
        .map(|e| (e.id.clone(), e))
        .collect())
}

/// Presence per employee over `[from, to]`, ordered by name.
pub fn attendance_summary(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<Vec<SummaryRow>> {
    let staff = employee_map(conn)?;
    let logs = shifts::closed_shifts_between(
        conn,
        None,
        date::day_start(from),
        date::day_end_exclusive(to)?,
    )?;

    struct Acc {
        days: BTreeSet<NaiveDate>,
        seconds: i64,
        saturdays: u32,
        sundays: u32,
        holidays: u32,
    }

    let mut acc: BTreeMap<&str, Acc> = BTreeMap::new();
    for s in &logs {
        let Some(emp) = staff.get(&s.worker_id) else {
            continue;
        };
        let a = acc.entry(emp.id.as_str()).or_insert_with(|| Acc {
            days: BTreeSet::new(),
            seconds: 0,
            saturdays: 0,
            sundays: 0,
            holidays: 0,
        });

        let day = s.start_time.date();
        a.days.insert(day);
        a.seconds += s.worked_seconds();
        match day.weekday() {
            Weekday::Sat => a.saturdays += 1,
            Weekday::Sun => a.sundays += 1,
            _ => {}
        }
        if is_public_holiday(day) {
            a.holidays += 1;
        }
    }

    let mut rows: Vec<SummaryRow> = acc
        .into_iter()
        .filter_map(|(id, a)| {
            let emp = staff.get(id)?;
            Some(SummaryRow {
                id: emp.id.clone(),
                name: emp.display_name(),
                rate: emp.hourly_rate,
                days_present: a.days.len(),
                total_time: duration_text(a.seconds),
                total_hours: round2(hours(a.seconds)),
                saturdays: a.saturdays,
                sundays: a.sundays,
                holidays: a.holidays,
            })
        })
        .collect();

    rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    Ok(rows)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailyRow {
    pub log_id: i64,
    pub worker_id: String,
    pub name: String,
    pub start: String,
    pub stop: String,
    pub duration: String,
    pub start_lat: Option<f64>,
    pub start_lon: Option<f64>,
    pub stop_lat: Option<f64>,
    pub stop_lon: Option<f64>,
}

/// Every shift started on `day`, open ones included.
pub fn attendance_by_date(conn: &Connection, day: NaiveDate) -> AppResult<Vec<DailyRow>> {
    let staff = employee_map(conn)?;
    let logs = shifts::shifts_between(
        conn,
        None,
        date::day_start(day),
        date::day_end_exclusive(day)?,
    )?;

    Ok(logs
        .into_iter()
        .filter_map(|s| {
            let emp = staff.get(&s.worker_id)?;
            Some(DailyRow {
                log_id: s.id,
                worker_id: s.worker_id.clone(),
                name: emp.display_name(),
                start: hhmm(&s.start_time),
                stop: s
                    .stop_time
                    .as_ref()
                    .map(hhmm)
                    .unwrap_or_else(|| "Trwa".into()),
                duration: if s.is_open() {
                    "W trakcie".into()
                } else {
                    duration_text(s.worked_seconds())
                },
                start_lat: s.start_lat,
                start_lon: s.start_lon,
                stop_lat: s.stop_lat,
                stop_lon: s.stop_lon,
            })
        })
        .collect())
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActiveWorker {
    pub worker_id: String,
    pub name: String,
    pub start_time: String,
    pub duration: String,
    pub online: bool,
    pub start_lat: Option<f64>,
    pub start_lon: Option<f64>,
}

/// Latest shift of today per employee; `online` while it is still open.
pub fn active_workers(conn: &Connection, now: NaiveDateTime) -> AppResult<Vec<ActiveWorker>> {
    let staff = employee_map(conn)?;
    let today = now.date();
    let logs = shifts::shifts_between(
        conn,
        None,
        date::day_start(today),
        date::day_end_exclusive(today)?,
    )?;

    // Ordered by start, so the last insert per worker wins.
    let mut latest: BTreeMap<String, crate::models::Shift> = BTreeMap::new();
    for s in logs {
        latest.insert(s.worker_id.clone(), s);
    }

    let mut rows: Vec<ActiveWorker> = latest
        .into_values()
        .filter_map(|s| {
            let emp = staff.get(&s.worker_id)?;
            let end = s.stop_time.unwrap_or(now);
            Some(ActiveWorker {
                worker_id: s.worker_id.clone(),
                name: emp.display_name(),
                start_time: hhmm(&s.start_time),
                duration: duration_text((end - s.start_time).num_seconds()),
                online: s.is_open(),
                start_lat: s.start_lat,
                start_lon: s.start_lon,
            })
        })
        .collect();

    rows.sort_by(|a, b| a.start_time.cmp(&b.start_time));
    Ok(rows)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmployeeRef {
    pub id: String,
    pub name: String,
}

pub fn employees_without_logs(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<Vec<EmployeeRef>> {
    let present: BTreeSet<String> = shifts::shifts_between(
        conn,
        None,
        date::day_start(from),
        date::day_end_exclusive(to)?,
    )?
    .into_iter()
    .map(|s| s.worker_id)
    .collect();

    Ok(employees::list_employees(conn)?
        .into_iter()
        .filter(|e| !present.contains(&e.id))
        .map(|e| EmployeeRef {
            name: e.display_name(),
            id: e.id,
        })
        .collect())
}
