//! Clock in / clock out and administrative shift closing.

use crate::config::TimeRoundingConfig;
use crate::core::rounding::{round_start, round_stop};
use crate::db::{employees, log::admin_log, shifts};
use crate::errors::{AppError, AppResult};
use crate::models::admin_log::ACTION_FORCE_STOP;
use crate::models::shift::rounded_minutes;
use crate::models::{NewShift, Shift};
use crate::utils::date::{self, hhmm};
use chrono::NaiveDateTime;
use rusqlite::Connection;
use tracing::{info, warn};

pub const SESSION_EXPIRED_MSG: &str = "No active shifts found - please restart app and login again";

/// Clock-out result.
#[derive(Debug, Clone, PartialEq)]
pub enum StopOutcome {
    Stopped { id: i64, duration_min: i64 },
    /// No shift is open anywhere: the app holds a stale session.
    SessionExpired,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmergencyEnd {
    pub count: usize,
    pub end_time: NaiveDateTime,
}

pub struct ShiftLogic;

impl ShiftLogic {
    /// Open a shift. Returns the new log id.
    pub fn start(
        conn: &Connection,
        rounding: &TimeRoundingConfig,
        employee_id: &str,
        at: NaiveDateTime,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> AppResult<i64> {
        if employees::find_employee(conn, employee_id)?.is_none() {
            return Err(AppError::NotFound("Worker not found".into()));
        }
        if let Some(open) = shifts::open_shift_for(conn, employee_id)? {
            return Err(AppError::Conflict(format!(
                "Pracownik ma już aktywną zmianę rozpoczętą o {}",
                hhmm(&open.start_time)
            )));
        }

        let start = round_start(at, rounding);
        let id = shifts::insert_shift(conn, &NewShift::open(employee_id, start, lat, lon))?;
        info!(worker = employee_id, log_id = id, start = %start, "shift started");
        Ok(id)
    }

    /// Close the most recent open shift of `employee_id`.
    pub fn stop(
        conn: &Connection,
        rounding: &TimeRoundingConfig,
        employee_id: &str,
        at: NaiveDateTime,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> AppResult<StopOutcome> {
        let Some(open) = shifts::open_shift_for(conn, employee_id)? else {
            if shifts::count_open_shifts(conn)? == 0 {
                warn!(worker = employee_id, "stop without any open shift, session expired");
                return Ok(StopOutcome::SessionExpired);
            }
            return Err(AppError::NotFound("No active shift found".into()));
        };

        let stop = round_stop(at, rounding);
        if stop < open.start_time {
            return Err(AppError::BadRequest(
                "Czas zakończenia musi być późniejszy niż czas rozpoczęcia".into(),
            ));
        }

        let duration_min = rounded_minutes(open.start_time, stop);
        shifts::close_shift(conn, open.id, stop, lat, lon, duration_min, false, None)?;
        info!(worker = employee_id, log_id = open.id, duration_min, "shift stopped");

        Ok(StopOutcome::Stopped {
            id: open.id,
            duration_min,
        })
    }

    /// Administrator closes one open shift at `now`.
    pub fn force_stop(conn: &Connection, log_id: i64, admin_id: &str, now: NaiveDateTime) -> AppResult<Shift> {
        let shift = shifts::find_shift(conn, log_id)?
            .filter(Shift::is_open)
            .ok_or_else(|| AppError::NotFound("Nie znaleziono aktywnej zmiany".into()))?;

        let stop = now.max(shift.start_time);
        let note = format!("Zakończono przez administratora {admin_id}");
        let tx = conn.unchecked_transaction()?;
        shifts::close_shift(
            &tx,
            log_id,
            stop,
            None,
            None,
            rounded_minutes(shift.start_time, stop),
            false,
            Some(&note),
        )?;
        admin_log(
            &tx,
            ACTION_FORCE_STOP,
            admin_id,
            Some(&shift.worker_id),
            &format!("Force stop of log {log_id}"),
        )?;
        tx.commit()?;

        warn!(admin = admin_id, log_id, worker = %shift.worker_id, "shift force-stopped");
        shifts::find_shift(conn, log_id)?
            .ok_or_else(|| AppError::NotFound("Nie znaleziono aktywnej zmiany".into()))
    }

    /// Close every open shift at `now`, flagged as emergency ends.
    pub fn emergency_end(conn: &Connection, admin_id: &str, now: NaiveDateTime) -> AppResult<EmergencyEnd> {
        let open = shifts::open_shifts(conn)?;

        let tx = conn.unchecked_transaction()?;
        for s in &open {
            let stop = now.max(s.start_time);
            shifts::close_shift(
                &tx,
                s.id,
                stop,
                None,
                None,
                rounded_minutes(s.start_time, stop),
                true,
                Some("Emergency end"),
            )?;
            admin_log(
                &tx,
                ACTION_FORCE_STOP,
                admin_id,
                Some(&s.worker_id),
                &format!("Emergency end of log {}", s.id),
            )?;
        }
        tx.commit()?;

        if !open.is_empty() {
            warn!(admin = admin_id, count = open.len(), end = %date::to_db(&now), "emergency end");
        }
        Ok(EmergencyEnd {
            count: open.len(),
            end_time: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoundingDirection;
    use crate::db::initialize::init_db;
    use crate::models::Rates;
    use crate::utils::date::parse_datetime;

    fn conn() -> Connection {
        let c = Connection::open_in_memory().unwrap();
        init_db(&c).unwrap();
        for id in ["1", "2"] {
            employees::insert_employee(&c, id, "Jan Kowalski", &Rates::default(), None).unwrap();
        }
        c
    }

    fn at(s: &str) -> NaiveDateTime {
        parse_datetime(s).unwrap()
    }

    #[test]
    fn start_then_stop() {
        let c = conn();
        let r = TimeRoundingConfig::default();
        let id = ShiftLogic::start(&c, &r, "1", at("2025-03-10 08:00:00"), Some(52.0), Some(21.0)).unwrap();

        let out = ShiftLogic::stop(&c, &r, "1", at("2025-03-10 16:00:29"), None, None).unwrap();
        assert_eq!(out, StopOutcome::Stopped { id, duration_min: 480 });
    }

    #[test]
    fn second_start_is_rejected() {
        let c = conn();
        let r = TimeRoundingConfig::default();
        ShiftLogic::start(&c, &r, "1", at("2025-03-10 08:00"), None, None).unwrap();
        let err = ShiftLogic::start(&c, &r, "1", at("2025-03-10 09:00"), None, None).unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m.contains("08:00")));
    }

    #[test]
    fn unknown_worker_cannot_start() {
        let c = conn();
        let err = ShiftLogic::start(&c, &TimeRoundingConfig::default(), "99", at("2025-03-10 08:00"), None, None)
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn stop_without_any_open_shift_reports_expired_session() {
        let c = conn();
        let r = TimeRoundingConfig::default();
        assert_eq!(
            ShiftLogic::stop(&c, &r, "1", at("2025-03-10 16:00"), None, None).unwrap(),
            StopOutcome::SessionExpired
        );

        ShiftLogic::start(&c, &r, "2", at("2025-03-10 08:00"), None, None).unwrap();
        assert!(matches!(
            ShiftLogic::stop(&c, &r, "1", at("2025-03-10 16:00"), None, None),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn rounding_applies_to_both_ends() {
        let c = conn();
        let r = TimeRoundingConfig {
            enabled: true,
            rounding_minutes: 15,
            rounding_direction: RoundingDirection::Nearest,
            ..TimeRoundingConfig::default()
        };
        let id = ShiftLogic::start(&c, &r, "1", at("2025-03-10 07:53:10"), None, None).unwrap();
        ShiftLogic::stop(&c, &r, "1", at("2025-03-10 16:06:00"), None, None).unwrap();

        let s = shifts::find_shift(&c, id).unwrap().unwrap();
        assert_eq!(s.start_time, at("2025-03-10 08:00"));
        assert_eq!(s.stop_time, Some(at("2025-03-10 16:00")));
        assert_eq!(s.duration_min, Some(480));
    }

    #[test]
    fn emergency_end_closes_everything() {
        let c = conn();
        let r = TimeRoundingConfig::default();
        ShiftLogic::start(&c, &r, "1", at("2025-03-10 08:00"), None, None).unwrap();
        ShiftLogic::start(&c, &r, "2", at("2025-03-10 09:00"), None, None).unwrap();

        let res = ShiftLogic::emergency_end(&c, "admin", at("2025-03-10 12:00")).unwrap();
        assert_eq!(res.count, 2);
        assert_eq!(shifts::count_open_shifts(&c).unwrap(), 0);
        assert!(shifts::list_shifts(&c, None).unwrap().iter().all(|s| s.emergency_end));
        assert_eq!(crate::db::log::list_admin_logs(&c, 10).unwrap().len(), 2);

        let again = ShiftLogic::emergency_end(&c, "admin", at("2025-03-10 12:05")).unwrap();
        assert_eq!(again.count, 0);
    }

    #[test]
    fn force_stop_only_open_shifts() {
        let c = conn();
        let r = TimeRoundingConfig::default();
        let id = ShiftLogic::start(&c, &r, "1", at("2025-03-10 08:00"), None, None).unwrap();

        let s = ShiftLogic::force_stop(&c, id, "admin", at("2025-03-10 10:00")).unwrap();
        assert_eq!(s.duration_min, Some(120));
        assert!(s.notes.contains("admin"));
        assert!(matches!(
            ShiftLogic::force_stop(&c, id, "admin", at("2025-03-10 11:00")),
            Err(AppError::NotFound(_))
        ));
    }
}
