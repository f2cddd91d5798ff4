//! Queries over `attendance_logs`.

use crate::errors::{AppError, AppResult};
use crate::models::{HolidayFlag, NewShift, Shift, SickFlag};
use crate::utils::date;
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

const SELECT_SHIFT: &str = "SELECT id, worker_id, start_time, start_lat, start_lon, stop_time,
        stop_lat, stop_lon, duration_min, is_holiday, is_sick, emergency_end, notes
     FROM attendance_logs";

fn ts(idx: usize, raw: &str) -> rusqlite::Result<NaiveDateTime> {
    date::parse_db(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            Box::new(AppError::InvalidDateTime(raw.to_string())),
        )
    })
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Shift> {
    let start_raw: String = row.get(2)?;
    let stop_raw: Option<String> = row.get(5)?;
    let holiday: Option<String> = row.get(9)?;
    let sick: Option<String> = row.get(10)?;

    Ok(Shift {
        id: row.get(0)?,
        worker_id: row.get(1)?,
        start_time: ts(2, &start_raw)?,
        start_lat: row.get(3)?,
        start_lon: row.get(4)?,
        stop_time: stop_raw.as_deref().map(|s| ts(5, s)).transpose()?,
        stop_lat: row.get(6)?,
        stop_lon: row.get(7)?,
        duration_min: row.get(8)?,
        is_holiday: HolidayFlag::parse(holiday.as_deref().unwrap_or("nie")),
        is_sick: SickFlag::parse(sick.as_deref().unwrap_or("nie")),
        emergency_end: row.get::<_, Option<i64>>(11)?.unwrap_or(0) != 0,
        notes: row.get::<_, Option<String>>(12)?.unwrap_or_default(),
    })
}

fn collect(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> AppResult<Vec<Shift>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map(params, map_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn insert_shift(conn: &Connection, s: &NewShift) -> AppResult<i64> {
    let duration = s
        .stop_time
        .map(|stop| crate::models::shift::rounded_minutes(s.start_time, stop));

    conn.execute(
        "INSERT INTO attendance_logs
            (worker_id, start_time, start_lat, start_lon, stop_time, stop_lat, stop_lon,
             duration_min, is_holiday, is_sick)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            s.worker_id,
            date::to_db(&s.start_time),
            s.start_lat,
            s.start_lon,
            s.stop_time.as_ref().map(date::to_db),
            s.stop_lat,
            s.stop_lon,
            duration,
            s.is_holiday.to_db_str(),
            s.is_sick.to_db_str(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_shift(conn: &Connection, id: i64) -> AppResult<Option<Shift>> {
    let mut stmt = conn.prepare_cached(&format!("{SELECT_SHIFT} WHERE id = ?1"))?;
    Ok(stmt.query_row([id], map_row).optional()?)
}

/// Most recent open shift of a worker.
pub fn open_shift_for(conn: &Connection, worker_id: &str) -> AppResult<Option<Shift>> {
    let mut stmt = conn.prepare_cached(&format!(
        "{SELECT_SHIFT} WHERE worker_id = ?1 AND stop_time IS NULL
         ORDER BY start_time DESC, id DESC LIMIT 1"
    ))?;
    Ok(stmt.query_row([worker_id], map_row).optional()?)
}

pub fn open_shifts(conn: &Connection) -> AppResult<Vec<Shift>> {
    collect(
        conn,
        &format!("{SELECT_SHIFT} WHERE stop_time IS NULL ORDER BY start_time"),
        [],
    )
}

pub fn count_open_shifts(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM attendance_logs WHERE stop_time IS NULL",
        [],
        |row| row.get(0),
    )?)
}

/// Close an open shift. Returns false if it was not open.
#[allow(clippy::too_many_arguments)]
pub fn close_shift(
    conn: &Connection,
    id: i64,
    stop: NaiveDateTime,
    lat: Option<f64>,
    lon: Option<f64>,
    duration_min: i64,
    emergency: bool,
    note: Option<&str>,
) -> AppResult<bool> {
    let n = conn.execute(
        "UPDATE attendance_logs SET stop_time = ?2, stop_lat = ?3, stop_lon = ?4,
             duration_min = ?5, emergency_end = ?6,
             notes = CASE WHEN ?7 IS NULL THEN notes
                          WHEN notes = '' THEN ?7
                          ELSE notes || '; ' || ?7 END
         WHERE id = ?1 AND stop_time IS NULL",
        params![
            id,
            date::to_db(&stop),
            lat,
            lon,
            duration_min,
            emergency as i64,
            note
        ],
    )?;
    Ok(n > 0)
}

/// Overwrite the editable columns of a shift.
pub fn update_shift(conn: &Connection, s: &Shift) -> AppResult<bool> {
    let n = conn.execute(
        "UPDATE attendance_logs SET start_time = ?2, stop_time = ?3, duration_min = ?4,
             is_holiday = ?5, is_sick = ?6, notes = ?7
         WHERE id = ?1",
        params![
            s.id,
            date::to_db(&s.start_time),
            s.stop_time.as_ref().map(date::to_db),
            s.duration_min,
            s.is_holiday.to_db_str(),
            s.is_sick.to_db_str(),
            s.notes,
        ],
    )?;
    Ok(n > 0)
}

pub fn delete_shift(conn: &Connection, id: i64) -> AppResult<bool> {
    Ok(conn.execute("DELETE FROM attendance_logs WHERE id = ?1", [id])? > 0)
}

pub fn list_shifts(conn: &Connection, worker_id: Option<&str>) -> AppResult<Vec<Shift>> {
    match worker_id {
        Some(w) => collect(
            conn,
            &format!("{SELECT_SHIFT} WHERE worker_id = ?1 ORDER BY start_time, id"),
            [w],
        ),
        None => collect(
            conn,
            &format!("{SELECT_SHIFT} ORDER BY start_time, id"),
            [],
        ),
    }
}

/// Shifts (open or closed) with `from <= start_time < to`.
pub fn shifts_between(
    conn: &Connection,
    worker_id: Option<&str>,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> AppResult<Vec<Shift>> {
    let (f, t) = (date::to_db(&from), date::to_db(&to));
    match worker_id {
        Some(w) => collect(
            conn,
            &format!(
                "{SELECT_SHIFT} WHERE worker_id = ?1 AND start_time >= ?2 AND start_time < ?3
                 ORDER BY start_time, id"
            ),
            params![w, f, t],
        ),
        None => collect(
            conn,
            &format!(
                "{SELECT_SHIFT} WHERE start_time >= ?1 AND start_time < ?2 ORDER BY start_time, id"
            ),
            params![f, t],
        ),
    }
}

/// Closed shifts with `from <= start_time < to`.
pub fn closed_shifts_between(
    conn: &Connection,
    worker_id: Option<&str>,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> AppResult<Vec<Shift>> {
    Ok(shifts_between(conn, worker_id, from, to)?
        .into_iter()
        .filter(|s| !s.is_open())
        .collect())
}

/// Latest closed shifts of a worker, newest first.
pub fn recent_closed_shifts(conn: &Connection, worker_id: &str, limit: i64) -> AppResult<Vec<Shift>> {
    collect(
        conn,
        &format!(
            "{SELECT_SHIFT} WHERE worker_id = ?1 AND stop_time IS NOT NULL
             ORDER BY start_time DESC, id DESC LIMIT ?2"
        ),
        params![worker_id, limit],
    )
}

/// Every closed shift of a worker, oldest first.
pub fn all_closed_shifts(conn: &Connection, worker_id: &str) -> AppResult<Vec<Shift>> {
    collect(
        conn,
        &format!(
            "{SELECT_SHIFT} WHERE worker_id = ?1 AND stop_time IS NOT NULL ORDER BY start_time, id"
        ),
        [worker_id],
    )
}
