//! Queries over `device_logs`.

use crate::errors::AppResult;
use crate::models::{DeviceInfo, DeviceLog};
use crate::utils::date;
use rusqlite::{Connection, OptionalExtension, Row, params};

const SELECT_DEVICE: &str = "SELECT id, worker_id, device_id, device_model, os_version, app_version,
        location, is_approved, is_suspicious, user_rejected, created_at, updated_at
     FROM device_logs";

fn map_row(row: &Row<'_>) -> rusqlite::Result<DeviceLog> {
    Ok(DeviceLog {
        id: row.get(0)?,
        worker_id: row.get(1)?,
        device_id: row.get(2)?,
        device_model: row.get(3)?,
        os_version: row.get(4)?,
        app_version: row.get(5)?,
        location: row.get(6)?,
        is_approved: row.get(7)?,
        is_suspicious: row.get(8)?,
        user_rejected: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

pub fn find_device(conn: &Connection, worker_id: &str, device_id: &str) -> AppResult<Option<DeviceLog>> {
    let mut stmt = conn.prepare_cached(&format!(
        "{SELECT_DEVICE} WHERE worker_id = ?1 AND device_id = ?2 ORDER BY id DESC LIMIT 1"
    ))?;
    Ok(stmt.query_row([worker_id, device_id], map_row).optional()?)
}

/// Devices already registered for a worker.
pub fn count_devices(conn: &Connection, worker_id: &str) -> AppResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM device_logs WHERE worker_id = ?1",
        [worker_id],
        |row| row.get(0),
    )?)
}

pub fn insert_device(
    conn: &Connection,
    worker_id: &str,
    info: &DeviceInfo,
    approved: bool,
    suspicious: bool,
    rejected: bool,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO device_logs
            (worker_id, device_id, device_model, os_version, app_version, location,
             is_approved, is_suspicious, user_rejected, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            worker_id,
            info.device_id,
            info.device_model,
            info.os_version,
            info.app_version,
            info.location_text(),
            approved,
            suspicious,
            rejected,
            date::to_db(&date::now()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn touch_device(conn: &Connection, id: i64) -> AppResult<()> {
    conn.execute(
        "UPDATE device_logs SET updated_at = ?2 WHERE id = ?1",
        params![id, date::to_db(&date::now())],
    )?;
    Ok(())
}

/// Latest approved device of a worker.
pub fn latest_approved_device(conn: &Connection, worker_id: &str) -> AppResult<Option<DeviceLog>> {
    let mut stmt = conn.prepare_cached(&format!(
        "{SELECT_DEVICE} WHERE worker_id = ?1 AND is_approved = 1
         ORDER BY COALESCE(updated_at, created_at) DESC, id DESC LIMIT 1"
    ))?;
    Ok(stmt.query_row([worker_id], map_row).optional()?)
}

pub fn list_devices(conn: &Connection) -> AppResult<Vec<DeviceLog>> {
    let mut stmt = conn.prepare(&format!("{SELECT_DEVICE} ORDER BY created_at DESC, id DESC"))?;
    let rows = stmt.query_map([], map_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
