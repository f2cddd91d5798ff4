//! Statistics access attempts and device security alerts.

use crate::errors::AppResult;
use crate::models::{AccessLog, NewAccessLog, SecurityAlert};
use crate::utils::date;
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, Row, params};

const SELECT_ACCESS: &str = "SELECT id, worker_id, device_id, device_model, pin_correct,
        access_granted, latitude, longitude, location_text, attempted_at
     FROM statistics_access_logs";

fn map_access(row: &Row<'_>) -> rusqlite::Result<AccessLog> {
    Ok(AccessLog {
        id: row.get(0)?,
        worker_id: row.get(1)?,
        device_id: row.get(2)?,
        device_model: row.get(3)?,
        pin_correct: row.get(4)?,
        access_granted: row.get(5)?,
        latitude: row.get(6)?,
        longitude: row.get(7)?,
        location_text: row.get(8)?,
        attempted_at: row.get(9)?,
    })
}

pub fn insert_access_log(conn: &Connection, a: &NewAccessLog, at: NaiveDateTime) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO statistics_access_logs
            (worker_id, device_id, device_model, pin_correct, access_granted,
             latitude, longitude, location_text, attempted_at)
         VALUES (?1, ?2, ?3, ?4, ?4, ?5, ?6, ?7, ?8)",
        params![
            a.worker_id,
            a.device_id,
            a.device_model,
            a.pin_correct,
            a.latitude,
            a.longitude,
            a.location_text,
            date::to_db(&at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Latest granted access of a worker at or after `since`.
pub fn latest_granted_access(
    conn: &Connection,
    worker_id: &str,
    since: NaiveDateTime,
) -> AppResult<Option<AccessLog>> {
    let mut stmt = conn.prepare_cached(&format!(
        "{SELECT_ACCESS} WHERE worker_id = ?1 AND access_granted = 1 AND attempted_at >= ?2
         ORDER BY attempted_at DESC, id DESC LIMIT 1"
    ))?;
    Ok(stmt
        .query_row(params![worker_id, date::to_db(&since)], map_access)
        .optional()?)
}

/// Extend an access window by moving its timestamp to `at`.
pub fn refresh_access(conn: &Connection, id: i64, at: NaiveDateTime) -> AppResult<()> {
    conn.execute(
        "UPDATE statistics_access_logs SET attempted_at = ?2 WHERE id = ?1",
        params![id, date::to_db(&at)],
    )?;
    Ok(())
}

pub fn list_access_logs(conn: &Connection, limit: i64) -> AppResult<Vec<AccessLog>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_ACCESS} ORDER BY attempted_at DESC, id DESC LIMIT ?1"
    ))?;
    let rows = stmt.query_map([limit], map_access)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

// ---------------------------
// device_security_alerts
// ---------------------------

fn map_alert(row: &Row<'_>) -> rusqlite::Result<SecurityAlert> {
    Ok(SecurityAlert {
        id: row.get(0)?,
        worker_id: row.get(1)?,
        old_device_id: row.get(2)?,
        new_device_id: row.get(3)?,
        old_device_model: row.get(4)?,
        new_device_model: row.get(5)?,
        alert_type: row.get(6)?,
        is_resolved: row.get(7)?,
        created_at: row.get(8)?,
        resolved_at: row.get(9)?,
    })
}

#[allow(clippy::too_many_arguments)]
pub fn insert_alert(
    conn: &Connection,
    worker_id: &str,
    alert_type: &str,
    old_device_id: Option<&str>,
    old_device_model: Option<&str>,
    new_device_id: Option<&str>,
    new_device_model: Option<&str>,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO device_security_alerts
            (worker_id, old_device_id, new_device_id, old_device_model, new_device_model,
             alert_type, is_resolved, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
        params![
            worker_id,
            old_device_id,
            new_device_id,
            old_device_model,
            new_device_model,
            alert_type,
            date::to_db(&date::now()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn unresolved_alerts(conn: &Connection) -> AppResult<Vec<SecurityAlert>> {
    let mut stmt = conn.prepare(
        "SELECT id, worker_id, old_device_id, new_device_id, old_device_model, new_device_model,
                alert_type, is_resolved, created_at, resolved_at
         FROM device_security_alerts WHERE is_resolved = 0
         ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map([], map_alert)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn resolve_alert(conn: &Connection, id: i64) -> AppResult<bool> {
    Ok(conn.execute(
        "UPDATE device_security_alerts SET is_resolved = 1, resolved_at = ?2
         WHERE id = ?1 AND is_resolved = 0",
        params![id, date::to_db(&date::now())],
    )? > 0)
}
