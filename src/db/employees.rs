//! Queries over the `employees` table. Credential hashes only leave this module
//! through `pin_hash`, `employees_with_pin` and `admin_password_hash`.

use crate::errors::AppResult;
use crate::models::{Employee, Rates};
use crate::utils::date;
use rusqlite::{Connection, OptionalExtension, Row, params};

const SELECT_EMPLOYEE: &str = "SELECT id, COALESCE(name, ''), COALESCE(hourly_rate, 0),
        COALESCE(rate_saturday, 0), COALESCE(rate_sunday, 0), COALESCE(rate_night, 0),
        COALESCE(rate_overtime, 0), COALESCE(is_admin, 0), pin_hash IS NOT NULL, created_at
     FROM employees";

/// Mapping DB → Employee (riusato per tutte le query).
fn map_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: row.get(0)?,
        name: row.get(1)?,
        hourly_rate: row.get(2)?,
        rate_saturday: row.get(3)?,
        rate_sunday: row.get(4)?,
        rate_night: row.get(5)?,
        rate_overtime: row.get(6)?,
        is_admin: row.get::<_, i64>(7)? != 0,
        has_pin: row.get(8)?,
        created_at: row.get(9)?,
    })
}

/// Every non-admin employee, ordered by id. Administrator accounts only log
/// into the panel and never appear in worker lists or reports.
pub fn list_employees(conn: &Connection) -> AppResult<Vec<Employee>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_EMPLOYEE} WHERE COALESCE(is_admin, 0) = 0 ORDER BY id"
    ))?;
    let rows = stmt.query_map([], map_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn find_employee(conn: &Connection, id: &str) -> AppResult<Option<Employee>> {
    let mut stmt = conn.prepare_cached(&format!("{SELECT_EMPLOYEE} WHERE id = ?1"))?;
    Ok(stmt.query_row([id], map_row).optional()?)
}

pub fn employee_exists(conn: &Connection, id: &str) -> AppResult<bool> {
    Ok(conn
        .query_row("SELECT 1 FROM employees WHERE id = ?1", [id], |_| Ok(()))
        .optional()?
        .is_some())
}

pub fn insert_employee(
    conn: &Connection,
    id: &str,
    name: &str,
    rates: &Rates,
    pin_hash: Option<&str>,
) -> AppResult<()> {
    conn.execute(
        "INSERT INTO employees
            (id, name, hourly_rate, rate_saturday, rate_sunday, rate_night, rate_overtime, pin_hash, is_admin, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9)",
        params![
            id,
            name,
            rates.hourly_rate,
            rates.rate_saturday,
            rates.rate_sunday,
            rates.rate_night,
            rates.rate_overtime,
            pin_hash,
            date::to_db(&date::now()),
        ],
    )?;
    Ok(())
}

/// Update name and rates. Returns false when the id does not exist.
pub fn update_employee(conn: &Connection, id: &str, name: &str, rates: &Rates) -> AppResult<bool> {
    let n = conn.execute(
        "UPDATE employees SET name = ?2, hourly_rate = ?3, rate_saturday = ?4,
             rate_sunday = ?5, rate_night = ?6, rate_overtime = ?7
         WHERE id = ?1",
        params![
            id,
            name,
            rates.hourly_rate,
            rates.rate_saturday,
            rates.rate_sunday,
            rates.rate_night,
            rates.rate_overtime,
        ],
    )?;
    Ok(n > 0)
}

/// Update name and hourly rate only, keeping premium rates.
pub fn update_name_and_rate(conn: &Connection, id: &str, name: &str, rate: f64) -> AppResult<bool> {
    let n = conn.execute(
        "UPDATE employees SET name = ?2, hourly_rate = ?3 WHERE id = ?1",
        params![id, name, rate],
    )?;
    Ok(n > 0)
}

/// Move an employee to a new id, together with every row that refers to it.
/// Callers run this inside a transaction.
pub fn rename_employee(conn: &Connection, old_id: &str, new_id: &str) -> AppResult<()> {
    conn.execute(
        "UPDATE employees SET id = ?2 WHERE id = ?1",
        params![old_id, new_id],
    )?;
    for table in [
        "attendance_logs",
        "device_logs",
        "statistics_access_logs",
        "device_security_alerts",
    ] {
        conn.execute(
            &format!("UPDATE {table} SET worker_id = ?2 WHERE worker_id = ?1"),
            params![old_id, new_id],
        )?;
    }
    Ok(())
}

pub fn delete_employee(conn: &Connection, id: &str) -> AppResult<bool> {
    Ok(conn.execute("DELETE FROM employees WHERE id = ?1", [id])? > 0)
}

pub fn set_pin_hash(conn: &Connection, id: &str, pin_hash: &str) -> AppResult<bool> {
    Ok(conn.execute(
        "UPDATE employees SET pin_hash = ?2 WHERE id = ?1",
        params![id, pin_hash],
    )? > 0)
}

pub fn pin_hash(conn: &Connection, id: &str) -> AppResult<Option<String>> {
    Ok(conn
        .query_row("SELECT pin_hash FROM employees WHERE id = ?1", [id], |row| {
            row.get::<_, Option<String>>(0)
        })
        .optional()?
        .flatten())
}

/// Every employee with a PIN, for lookups by PIN alone.
pub fn employees_with_pin(conn: &Connection) -> AppResult<Vec<(Employee, String)>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_EMPLOYEE} WHERE pin_hash IS NOT NULL ORDER BY id"
    ))?;
    let employees = stmt
        .query_map([], map_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut out = Vec::with_capacity(employees.len());
    for e in employees {
        if let Some(hash) = pin_hash(conn, &e.id)? {
            out.push((e, hash));
        }
    }
    Ok(out)
}

/// Password hash of an administrator account.
pub fn admin_password_hash(conn: &Connection, id: &str) -> AppResult<Option<String>> {
    Ok(conn
        .query_row(
            "SELECT password_hash FROM employees WHERE id = ?1 AND is_admin = 1",
            [id],
            |row| row.get::<_, Option<String>>(0),
        )
        .optional()?
        .flatten())
}

/// Create an administrator or reset its password.
pub fn upsert_admin(conn: &Connection, id: &str, name: &str, password_hash: &str) -> AppResult<()> {
    conn.execute(
        "INSERT INTO employees (id, name, hourly_rate, password_hash, is_admin, created_at)
         VALUES (?1, ?2, 0, ?3, 1, ?4)
         ON CONFLICT(id) DO UPDATE SET
             name = excluded.name, password_hash = excluded.password_hash, is_admin = 1",
        params![id, name, password_hash, date::to_db(&date::now())],
    )?;
    Ok(())
}
