use crate::errors::AppResult;
use crate::models::AdminLog;
use crate::utils::date;
use chrono::Local;
use rusqlite::{Connection, params};

/// Write an internal log line into the `log` table.
pub fn ttlog(conn: &Connection, operation: &str, target: &str, message: &str) -> AppResult<()> {
    let now = Local::now().to_rfc3339();

    let mut stmt = conn.prepare_cached(
        "INSERT INTO log (date, operation, target, message)
         VALUES (?1, ?2, ?3, ?4)",
    )?;

    stmt.execute(params![now, operation, target, message])?;

    Ok(())
}

/// Append an administrator action to `admin_logs`.
pub fn admin_log(
    conn: &Connection,
    action_type: &str,
    admin_id: &str,
    target_id: Option<&str>,
    notes: &str,
) -> AppResult<()> {
    conn.execute(
        "INSERT INTO admin_logs (action_type, admin_id, target_id, action_time, notes)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![action_type, admin_id, target_id, date::to_db(&date::now()), notes],
    )?;
    Ok(())
}

pub fn list_admin_logs(conn: &Connection, limit: i64) -> AppResult<Vec<AdminLog>> {
    let mut stmt = conn.prepare(
        "SELECT id, action_type, admin_id, target_id, action_time, notes
         FROM admin_logs ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map([limit], |row| {
        Ok(AdminLog {
            id: row.get(0)?,
            action_type: row.get(1)?,
            admin_id: row.get(2)?,
            target_id: row.get(3)?,
            action_time: row.get(4)?,
            notes: row.get(5)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// One row of the internal `log` table.
pub struct LogEntry {
    pub id: i64,
    pub date: String,
    pub operation: String,
    pub target: String,
    pub message: String,
}

pub fn list_log(conn: &Connection, limit: Option<i64>) -> AppResult<Vec<LogEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, operation, COALESCE(target, ''), message FROM (
             SELECT * FROM log ORDER BY id DESC LIMIT ?1
         ) ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([limit.unwrap_or(-1)], |row| {
        Ok(LogEntry {
            id: row.get(0)?,
            date: row.get(1)?,
            operation: row.get(2)?,
            target: row.get(3)?,
            message: row.get(4)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
