//! Manual corrections of attendance logs from the admin panel.

use crate::db::{employees, log::ttlog, shifts};
use crate::errors::{AppError, AppResult};
use crate::models::shift::rounded_minutes;
use crate::models::{HolidayFlag, NewShift, Shift, SickFlag};
use crate::utils::date::{self, DATE_FMT};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

const DEFAULT_START: &str = "08:00";
const DEFAULT_STOP: &str = "16:00";

#[derive(Debug, Clone, Deserialize)]
pub struct LogCreate {
    pub worker_id: String,
    pub start_time: String,
    pub stop_time: String,
    #[serde(default)]
    pub start_lat: Option<f64>,
    #[serde(default)]
    pub start_lon: Option<f64>,
    #[serde(default)]
    pub stop_lat: Option<f64>,
    #[serde(default)]
    pub stop_lon: Option<f64>,
    #[serde(default)]
    pub is_holiday: HolidayFlag,
    #[serde(default)]
    pub is_sick: SickFlag,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogPatch {
    pub start_time: Option<String>,
    pub stop_time: Option<String>,
    pub is_holiday: Option<HolidayFlag>,
    pub is_sick: Option<SickFlag>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchItem {
    pub employee_id: String,
    pub date: String,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub stop: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BatchCreated {
    pub id: i64,
    pub date: String,
}

fn log_not_found() -> AppError {
    AppError::NotFound("Log nie istnieje".into())
}

fn ordered(start: chrono::NaiveDateTime, stop: chrono::NaiveDateTime) -> AppResult<()> {
    if start >= stop {
        return Err(AppError::BadRequest(
            "Czas zakończenia musi być późniejszy niż czas rozpoczęcia".into(),
        ));
    }
    Ok(())
}

pub struct AttendanceLogic;

impl AttendanceLogic {
    pub fn list(conn: &Connection, worker_id: Option<&str>) -> AppResult<Vec<Shift>> {
        shifts::list_shifts(conn, worker_id)
    }

    pub fn create(conn: &Connection, req: &LogCreate) -> AppResult<Shift> {
        if !employees::employee_exists(conn, &req.worker_id)? {
            return Err(AppError::NotFound("Worker not found".into()));
        }
        let start = date::parse_datetime(&req.start_time)?;
        let stop = date::parse_datetime(&req.stop_time)?;
        ordered(start, stop)?;

        let new = NewShift {
            worker_id: req.worker_id.clone(),
            start_time: start,
            start_lat: req.start_lat,
            start_lon: req.start_lon,
            stop_time: Some(stop),
            stop_lat: req.stop_lat,
            stop_lon: req.stop_lon,
            is_holiday: req.is_holiday,
            is_sick: req.is_sick,
        };
        let id = shifts::insert_shift(conn, &new)?;
        ttlog(conn, "add", &req.worker_id, &format!("Attendance log {id} created"))?;

        shifts::find_shift(conn, id)?.ok_or_else(log_not_found)
    }

    pub fn patch(conn: &Connection, id: i64, patch: &LogPatch) -> AppResult<Shift> {
        let mut shift = shifts::find_shift(conn, id)?.ok_or_else(log_not_found)?;

        if let Some(raw) = &patch.start_time {
            shift.start_time = date::parse_datetime(raw)?;
        }
        if let Some(raw) = &patch.stop_time {
            shift.stop_time = Some(date::parse_datetime(raw)?);
        }
        if let Some(flag) = patch.is_holiday {
            shift.is_holiday = flag;
        }
        if let Some(flag) = patch.is_sick {
            shift.is_sick = flag;
        }
        if let Some(notes) = &patch.notes {
            shift.notes = notes.clone();
        }

        if let Some(stop) = shift.stop_time {
            ordered(shift.start_time, stop)?;
            shift.duration_min = Some(rounded_minutes(shift.start_time, stop));
        }

        shifts::update_shift(conn, &shift)?;
        ttlog(conn, "edit", &shift.worker_id, &format!("Attendance log {id} updated"))?;
        Ok(shift)
    }

    pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
        let shift = shifts::find_shift(conn, id)?.ok_or_else(log_not_found)?;
        shifts::delete_shift(conn, id)?;
        ttlog(conn, "del", &shift.worker_id, &format!("Attendance log {id} deleted"))?;
        Ok(())
    }

    /// Insert many closed shifts at once. All or nothing.
    pub fn batch(conn: &Connection, items: &[BatchItem]) -> AppResult<Vec<BatchCreated>> {
        let tx = conn.unchecked_transaction()?;
        let mut created = Vec::with_capacity(items.len());

        for item in items {
            if !employees::employee_exists(&tx, &item.employee_id)? {
                return Err(AppError::BadRequest(format!(
                    "Nieznany pracownik: {}",
                    item.employee_id
                )));
            }
            let day = date::parse_date(&item.date)?;
            let start = date::combine(day, item.start.as_deref().unwrap_or(DEFAULT_START))?;
            let stop = date::combine(day, item.stop.as_deref().unwrap_or(DEFAULT_STOP))?;
            ordered(start, stop)?;

            let mut new = NewShift::open(&item.employee_id, start, None, None);
            new.stop_time = Some(stop);
            let id = shifts::insert_shift(&tx, &new)?;

            created.push(BatchCreated {
                id,
                date: day.format(DATE_FMT).to_string(),
            });
        }

        ttlog(&tx, "add", "batch", &format!("{} attendance logs created", created.len()))?;
        tx.commit()?;
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;
    use crate::models::Rates;

    fn conn() -> Connection {
        let c = Connection::open_in_memory().unwrap();
        init_db(&c).unwrap();
        employees::insert_employee(&c, "1", "Jan Kowalski", &Rates::default(), None).unwrap();
        c
    }

    fn create(c: &Connection, start: &str, stop: &str) -> AppResult<Shift> {
        AttendanceLogic::create(
            c,
            &LogCreate {
                worker_id: "1".into(),
                start_time: start.into(),
                stop_time: stop.into(),
                start_lat: None,
                start_lon: None,
                stop_lat: None,
                stop_lon: None,
                is_holiday: HolidayFlag::No,
                is_sick: SickFlag::Zus,
            },
        )
    }

    #[test]
    fn create_rejects_reversed_times() {
        let c = conn();
        assert!(matches!(
            create(&c, "2025-03-10T16:00:00", "2025-03-10T08:00:00"),
            Err(AppError::BadRequest(_))
        ));
        let s = create(&c, "2025-03-10T08:00:00", "2025-03-10T16:00:00").unwrap();
        assert_eq!(s.duration_min, Some(480));
        assert_eq!(s.is_sick, SickFlag::Zus);
    }

    #[test]
    fn patch_recomputes_duration() {
        let c = conn();
        let s = create(&c, "2025-03-10 08:00", "2025-03-10 16:00").unwrap();

        let patched = AttendanceLogic::patch(
            &c,
            s.id,
            &LogPatch {
                stop_time: Some("2025-03-10 12:30".into()),
                is_holiday: Some(HolidayFlag::Yes),
                ..LogPatch::default()
            },
        )
        .unwrap();
        assert_eq!(patched.duration_min, Some(270));
        assert_eq!(patched.is_holiday, HolidayFlag::Yes);

        let bad = AttendanceLogic::patch(
            &c,
            s.id,
            &LogPatch {
                start_time: Some("not a date".into()),
                ..LogPatch::default()
            },
        );
        assert!(matches!(bad, Err(AppError::InvalidDateTime(_))));
    }

    #[test]
    fn batch_is_all_or_nothing() {
        let c = conn();
        let items = vec![
            BatchItem {
                employee_id: "1".into(),
                date: "2025-03-10".into(),
                start: None,
                stop: None,
            },
            BatchItem {
                employee_id: "1".into(),
                date: "2025-03-11".into(),
                start: Some("17:00".into()),
                stop: Some("09:00".into()),
            },
        ];
        assert!(AttendanceLogic::batch(&c, &items).is_err());
        assert!(AttendanceLogic::list(&c, None).unwrap().is_empty());

        let created = AttendanceLogic::batch(&c, &items[..1]).unwrap();
        assert_eq!(created[0].date, "2025-03-10");
        let s = shifts::find_shift(&c, created[0].id).unwrap().unwrap();
        assert_eq!(s.duration_min, Some(480));
    }

    #[test]
    fn delete_missing_is_not_found() {
        let c = conn();
        assert!(matches!(
            AttendanceLogic::delete(&c, 42),
            Err(AppError::NotFound(_))
        ));
    }
}
