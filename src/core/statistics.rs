//! Worker statistics: the admin panel overview and the PIN-protected
//! statistics screen of the mobile app.

use crate::config::SecurityConfig;
use crate::core::auth::AuthLogic;
use crate::db::{access, devices, employees, shifts};
use crate::errors::{AppError, AppResult};
use crate::models::access::ALERT_DEVICE_CHANGE;
use crate::models::{DeviceInfo, NewAccessLog, Shift};
use crate::utils::date::{self, DATE_FMT, hhmm};
use crate::utils::formatting::{duration_text, hours, round2};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

pub const MSG_MISSING_CREDENTIALS: &str = "Brak ID pracownika lub PIN";
pub const MSG_UNKNOWN_WORKER: &str = "Niepoprawny PIN lub ID pracownika";
pub const MSG_WRONG_PIN: &str = "Niepoprawny PIN. Próba dostępu została zarejestrowana.";
pub const MSG_GRANTED: &str = "Dostęp autoryzowany";
pub const MSG_NOT_AUTHORIZED: &str = "Brak autoryzacji. Wprowadź PIN ponownie.";
pub const MSG_BAD_DATE: &str = "Niepoprawny format daty (wymagany: YYYY-MM-DD)";

// ---------------------------
// Admin overview of one worker
// ---------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RecentShift {
    pub id: i64,
    pub date: String,
    pub start_time: String,
    pub stop_time: String,
    pub hours: f64,
    pub duration_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyStat {
    pub date: String,
    pub hours: f64,
    pub shifts: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyStat {
    pub week_start: String,
    pub hours: f64,
    pub days: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyStat {
    pub month: String,
    pub month_name: String,
    pub year: i32,
    pub hours: f64,
    pub days: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Averages {
    pub average_hours_per_day: f64,
    pub average_hours_per_week: f64,
    pub average_hours_per_month: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkerStats {
    pub worker_id: String,
    pub total_hours: f64,
    pub total_days: usize,
    pub this_week_hours: f64,
    pub this_month_hours: f64,
    pub recent_shifts: Vec<RecentShift>,
    pub daily_stats: Vec<DailyStat>,
    pub weekly_stats: Vec<WeeklyStat>,
    pub monthly_summary: Vec<MonthlyStat>,
    pub summary: Averages,
}

fn avg(total: f64, n: usize) -> f64 {
    if n == 0 { 0.0 } else { round2(total / n as f64) }
}

/// Per-day, per-week and per-month hours of a worker's closed shifts.
pub fn worker_stats(conn: &rusqlite::Connection, worker_id: &str, today: NaiveDate) -> AppResult<WorkerStats> {
    if employees::find_employee(conn, worker_id)?.is_none() {
        return Err(AppError::NotFound("Worker not found".into()));
    }
    let all = shifts::all_closed_shifts(conn, worker_id)?;

    let week = date::week_start(today);
    let month = date::month_start(today);

    let mut total = 0.0;
    let mut this_week = 0.0;
    let mut this_month = 0.0;
    let mut days: BTreeMap<NaiveDate, (f64, u32)> = BTreeMap::new();
    let mut weeks: BTreeMap<NaiveDate, (f64, BTreeSet<NaiveDate>)> = BTreeMap::new();
    let mut months: BTreeMap<(i32, u32), (f64, BTreeSet<NaiveDate>)> = BTreeMap::new();

    for s in &all {
        let h = hours(s.worked_seconds());
        let d = s.start_time.date();
        total += h;
        if d >= week {
            this_week += h;
        }
        if d >= month {
            this_month += h;
        }

        let day = days.entry(d).or_default();
        day.0 += h;
        day.1 += 1;

        let w = weeks.entry(date::week_start(d)).or_default();
        w.0 += h;
        w.1.insert(d);

        let m = months.entry((d.year(), d.month())).or_default();
        m.0 += h;
        m.1.insert(d);
    }

    let recent_shifts = all
        .iter()
        .rev()
        .take(10)
        .map(|s| RecentShift {
            id: s.id,
            date: s.start_time.format(DATE_FMT).to_string(),
            start_time: hhmm(&s.start_time),
            stop_time: s.stop_time.as_ref().map(hhmm).unwrap_or_default(),
            hours: round2(hours(s.worked_seconds())),
            duration_text: duration_text(s.worked_seconds()),
        })
        .collect();

    let total_days = days.len();
    let (n_weeks, n_months) = (weeks.len(), months.len());

    Ok(WorkerStats {
        worker_id: worker_id.to_string(),
        total_hours: round2(total),
        total_days,
        this_week_hours: round2(this_week),
        this_month_hours: round2(this_month),
        recent_shifts,
        daily_stats: days
            .into_iter()
            .rev()
            .take(30)
            .map(|(d, (h, n))| DailyStat {
                date: d.format(DATE_FMT).to_string(),
                hours: round2(h),
                shifts: n,
            })
            .collect(),
        weekly_stats: weeks
            .into_iter()
            .rev()
            .take(12)
            .map(|(w, (h, ds))| WeeklyStat {
                week_start: w.format(DATE_FMT).to_string(),
                hours: round2(h),
                days: ds.len(),
            })
            .collect(),
        monthly_summary: months
            .into_iter()
            .rev()
            .take(12)
            .map(|((y, m), (h, ds))| MonthlyStat {
                month: format!("{y:04}-{m:02}"),
                month_name: date::month_name(m).to_string(),
                year: y,
                hours: round2(h),
                days: ds.len(),
            })
            .collect(),
        summary: Averages {
            average_hours_per_day: avg(total, total_days),
            average_hours_per_week: avg(total, n_weeks),
            average_hours_per_month: avg(total, n_months),
        },
    })
}

// ---------------------------
// Period statistics
// ---------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodType {
    Day,
    Week,
    Month,
    Custom,
}

impl PeriodType {
    /// Unknown values fall back to `Month`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "day" => PeriodType::Day,
            "week" => PeriodType::Week,
            "custom" => PeriodType::Custom,
            _ => PeriodType::Month,
        }
    }
}

/// Requested window, inclusive on both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodWindow {
    pub period_type: String,
    pub period_name: String,
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

pub fn period_window(
    period_type: &str,
    start_date: Option<&str>,
    end_date: Option<&str>,
    now: NaiveDateTime,
) -> AppResult<PeriodWindow> {
    let last_30 = |pt: &str| PeriodWindow {
        period_type: pt.to_string(),
        period_name: "Ostatnie 30 dni".into(),
        from: now - Duration::days(30),
        to: now,
    };

    Ok(match PeriodType::parse(period_type) {
        PeriodType::Day => PeriodWindow {
            period_type: period_type.to_string(),
            period_name: "Dzisiaj".into(),
            from: date::day_start(now.date()),
            to: now,
        },
        PeriodType::Week => PeriodWindow {
            period_type: period_type.to_string(),
            period_name: "Ostatnie 7 dni".into(),
            from: now - Duration::days(7),
            to: now,
        },
        PeriodType::Custom => match (start_date, end_date) {
            (Some(s), Some(e)) => {
                let bad = |_| AppError::BadRequest(MSG_BAD_DATE.into());
                let from = date::parse_date(s).map_err(bad)?;
                let to = date::parse_date(e).map_err(bad)?;
                PeriodWindow {
                    period_type: period_type.to_string(),
                    period_name: format!("Od {s} do {e}"),
                    from: date::day_start(from),
                    to: to.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)),
                }
            }
            _ => last_30(period_type),
        },
        PeriodType::Month => last_30(period_type),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodShift {
    pub date: String,
    pub start: String,
    pub stop: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodStats {
    pub worker_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_name: Option<String>,
    pub period_type: String,
    pub period_name: String,
    pub start_date: String,
    pub end_date: String,
    pub total_hours: f64,
    pub total_days: usize,
    pub total_shifts: usize,
    pub average_hours_per_day: f64,
    pub recent_shifts: Vec<PeriodShift>,
}

fn shift_row(s: &Shift) -> PeriodShift {
    PeriodShift {
        date: s.start_time.format(DATE_FMT).to_string(),
        start: hhmm(&s.start_time),
        stop: s.stop_time.as_ref().map(hhmm).unwrap_or_default(),
        hours: round2(hours(s.worked_seconds())),
    }
}

/// Closed shifts of a worker started inside `window`, newest first.
pub fn period_stats(
    conn: &rusqlite::Connection,
    worker_id: &str,
    window: &PeriodWindow,
    recent_limit: Option<usize>,
) -> AppResult<PeriodStats> {
    // the window's upper bound is inclusive
    let until = window
        .to
        .checked_add_signed(Duration::seconds(1))
        .ok_or_else(|| AppError::BadRequest(MSG_BAD_DATE.into()))?;
    let logs: Vec<Shift> = shifts::closed_shifts_between(conn, Some(worker_id), window.from, until)?
    .into_iter()
    .rev()
    .collect();

    let total: f64 = logs.iter().map(|s| hours(s.worked_seconds())).sum();
    let days: BTreeSet<NaiveDate> = logs.iter().map(|s| s.start_time.date()).collect();

    Ok(PeriodStats {
        worker_id: worker_id.to_string(),
        worker_name: None,
        period_type: window.period_type.clone(),
        period_name: window.period_name.clone(),
        start_date: window.from.format(DATE_FMT).to_string(),
        end_date: window.to.format(DATE_FMT).to_string(),
        total_hours: round2(total),
        total_days: days.len(),
        total_shifts: logs.len(),
        average_hours_per_day: avg(total, days.len()),
        recent_shifts: logs
            .iter()
            .take(recent_limit.unwrap_or(usize::MAX))
            .map(shift_row)
            .collect(),
    })
}

// ---------------------------
// PIN-protected access
// ---------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessLocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyPinRequest {
    #[serde(default)]
    pub worker_id: String,
    #[serde(default)]
    pub pin: String,
    #[serde(default)]
    pub device_info: Option<DeviceInfo>,
    #[serde(default)]
    pub location: Option<AccessLocation>,
    #[serde(default)]
    pub period_type: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyPinResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts_logged: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_changed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<PeriodStats>,
}

impl VerifyPinResponse {
    fn denied(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            attempts_logged: None,
            device_changed: None,
            worker_name: None,
            statistics: None,
        }
    }
}

pub struct StatisticsLogic;

impl StatisticsLogic {
    /// PIN check of the statistics screen. Every attempt is recorded.
    pub fn verify_pin(conn: &rusqlite::Connection, req: &VerifyPinRequest, now: NaiveDateTime) -> AppResult<VerifyPinResponse> {
        let worker_id = req.worker_id.trim();
        if worker_id.is_empty() || req.pin.trim().is_empty() {
            return Ok(VerifyPinResponse::denied(MSG_MISSING_CREDENTIALS));
        }

        let device = req.device_info.clone().unwrap_or_default();
        let loc = req.location.clone().unwrap_or_default();
        let mut attempt = NewAccessLog {
            worker_id: worker_id.to_string(),
            device_id: Some(non_empty_or_unknown(&device.device_id)),
            device_model: Some(non_empty_or_unknown(&device.device_model)),
            pin_correct: false,
            latitude: loc.latitude,
            longitude: loc.longitude,
            location_text: loc.location_text.clone(),
        };

        if employees::find_employee(conn, worker_id)?.is_none() {
            access::insert_access_log(conn, &attempt, now)?;
            warn!(worker = worker_id, "statistics access for unknown worker");
            return Ok(VerifyPinResponse::denied(MSG_UNKNOWN_WORKER));
        }

        let employee = AuthLogic::verify_pin(conn, worker_id, &req.pin)?;
        attempt.pin_correct = employee.is_some();

        let mut device_changed = false;
        let new_id = device.device_id.trim();
        if !new_id.is_empty()
            && let Some(last) = devices::latest_approved_device(conn, worker_id)?
            && last.device_id != new_id
        {
            device_changed = true;
            access::insert_alert(
                conn,
                worker_id,
                ALERT_DEVICE_CHANGE,
                Some(&last.device_id),
                Some(&last.device_model),
                Some(new_id),
                Some(&device.device_model),
            )?;
            warn!(worker = worker_id, old = %last.device_id, new = new_id, "device change detected");
        }

        access::insert_access_log(conn, &attempt, now)?;

        let Some(employee) = employee else {
            warn!(worker = worker_id, "wrong statistics PIN");
            return Ok(VerifyPinResponse {
                attempts_logged: Some(true),
                ..VerifyPinResponse::denied(MSG_WRONG_PIN)
            });
        };

        let window = period_window(
            req.period_type.as_deref().unwrap_or("month"),
            req.start_date.as_deref(),
            req.end_date.as_deref(),
            now,
        );
        let window = match window {
            Ok(w) => w,
            Err(_) => return Ok(VerifyPinResponse::denied(MSG_BAD_DATE)),
        };

        let mut stats = period_stats(conn, worker_id, &window, Some(20))?;
        stats.worker_name = Some(employee.name.clone());
        info!(worker = worker_id, "statistics access granted");

        Ok(VerifyPinResponse {
            success: true,
            message: MSG_GRANTED.into(),
            attempts_logged: None,
            device_changed: Some(device_changed),
            worker_name: Some(employee.name),
            statistics: Some(stats),
        })
    }

    /// True when the worker passed the PIN check within the access window.
    /// A valid access is extended to `now`.
    pub fn is_authorized(
        conn: &rusqlite::Connection,
        security: &SecurityConfig,
        worker_id: &str,
        now: NaiveDateTime,
    ) -> AppResult<bool> {
        let since = now
            .checked_sub_signed(Duration::minutes(security.stats_access_minutes))
            .unwrap_or(NaiveDateTime::MIN);
        match access::latest_granted_access(conn, worker_id, since)? {
            Some(a) => {
                access::refresh_access(conn, a.id, now)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Latest 30 closed shifts of a worker, for the statistics screen.
    pub fn recent_overview(conn: &rusqlite::Connection, worker_id: &str) -> AppResult<RecentOverview> {
        let logs = shifts::recent_closed_shifts(conn, worker_id, 30)?;
        let total: f64 = logs.iter().map(|s| hours(s.worked_seconds())).sum();
        let days: BTreeSet<NaiveDate> = logs.iter().map(|s| s.start_time.date()).collect();

        Ok(RecentOverview {
            worker_id: worker_id.to_string(),
            total_hours: round2(total),
            total_days: days.len(),
            average_hours_per_day: avg(total, days.len()),
            recent_shifts: logs.iter().map(shift_row).collect(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentOverview {
    pub worker_id: String,
    pub total_hours: f64,
    pub total_days: usize,
    pub average_hours_per_day: f64,
    pub recent_shifts: Vec<PeriodShift>,
}

fn non_empty_or_unknown(s: &str) -> String {
    if s.trim().is_empty() {
        "unknown".to_string()
    } else {
        s.trim().to_string()
    }
}
