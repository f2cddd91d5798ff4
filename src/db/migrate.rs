use crate::core::auth::hash_secret;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{success, warning};
use rusqlite::{Connection, OptionalExtension, params};

/// PIN hashing during migration uses a fixed, moderate cost.
const MIGRATION_PIN_ITERATIONS: u32 = 10_000;

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

pub(crate) fn table_exists(conn: &Connection, name: &str) -> AppResult<bool> {
    let exists: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
            [name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(exists.is_some())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> AppResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{table}')"))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn migration_applied(conn: &Connection, version: &str) -> AppResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM log WHERE operation = 'migration_applied' AND target = ?1 LIMIT 1",
            [version],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> AppResult<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now', 'localtime'), 'migration_applied', ?1, ?2)",
        params![version, message],
    )?;
    success(format!("Migration applied: {version} → {message}"));
    Ok(())
}

/// List every applied migration, oldest first.
pub fn applied_migrations(conn: &Connection) -> AppResult<Vec<(String, String)>> {
    if !table_exists(conn, "log")? {
        return Ok(Vec::new());
    }
    let mut stmt = conn.prepare(
        "SELECT target, date FROM log WHERE operation = 'migration_applied' ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Current schema for every table. Safe on a populated database.
fn create_schema(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            id             TEXT PRIMARY KEY,
            name           TEXT NOT NULL,
            hourly_rate    REAL NOT NULL DEFAULT 0,
            rate_saturday  REAL NOT NULL DEFAULT 0,
            rate_sunday    REAL NOT NULL DEFAULT 0,
            rate_night     REAL NOT NULL DEFAULT 0,
            rate_overtime  REAL NOT NULL DEFAULT 0,
            pin_hash       TEXT,
            password_hash  TEXT,
            is_admin       INTEGER NOT NULL DEFAULT 0,
            created_at     TEXT
        );

        CREATE TABLE IF NOT EXISTS attendance_logs (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            worker_id      TEXT NOT NULL,
            start_time     TEXT NOT NULL,
            start_lat      REAL,
            start_lon      REAL,
            stop_time      TEXT,
            stop_lat       REAL,
            stop_lon       REAL,
            duration_min   INTEGER,
            is_holiday     TEXT NOT NULL DEFAULT 'nie',
            is_sick        TEXT NOT NULL DEFAULT 'nie',
            emergency_end  INTEGER NOT NULL DEFAULT 0,
            notes          TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS device_logs (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            worker_id      TEXT NOT NULL,
            device_id      TEXT NOT NULL,
            device_model   TEXT NOT NULL DEFAULT '',
            os_version     TEXT NOT NULL DEFAULT '',
            app_version    TEXT NOT NULL DEFAULT '',
            location       TEXT,
            is_approved    INTEGER NOT NULL DEFAULT 0,
            is_suspicious  INTEGER NOT NULL DEFAULT 0,
            user_rejected  INTEGER NOT NULL DEFAULT 0,
            created_at     TEXT NOT NULL,
            updated_at     TEXT
        );

        CREATE TABLE IF NOT EXISTS statistics_access_logs (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            worker_id      TEXT NOT NULL,
            device_id      TEXT,
            device_model   TEXT,
            pin_correct    INTEGER NOT NULL DEFAULT 0,
            access_granted INTEGER NOT NULL DEFAULT 0,
            latitude       REAL,
            longitude      REAL,
            location_text  TEXT,
            attempted_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS device_security_alerts (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            worker_id        TEXT NOT NULL,
            old_device_id    TEXT,
            new_device_id    TEXT,
            old_device_model TEXT,
            new_device_model TEXT,
            alert_type       TEXT NOT NULL,
            is_resolved      INTEGER NOT NULL DEFAULT 0,
            created_at       TEXT NOT NULL,
            resolved_at      TEXT
        );

        CREATE TABLE IF NOT EXISTS admin_logs (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            action_type  TEXT NOT NULL,
            admin_id     TEXT NOT NULL,
            target_id    TEXT,
            action_time  TEXT NOT NULL,
            notes        TEXT
        );
        "#,
    )?;
    Ok(())
}

fn create_indexes(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE INDEX IF NOT EXISTS idx_attendance_worker_start ON attendance_logs(worker_id, start_time);
        CREATE INDEX IF NOT EXISTS idx_attendance_stop ON attendance_logs(stop_time);
        CREATE INDEX IF NOT EXISTS idx_device_logs_worker ON device_logs(worker_id, device_id);
        CREATE INDEX IF NOT EXISTS idx_access_worker_time ON statistics_access_logs(worker_id, attempted_at);
        "#,
    )?;
    Ok(())
}

/// Add any column an older database is missing.
fn add_missing_columns(conn: &Connection) -> AppResult<()> {
    const EMPLOYEE_COLUMNS: [(&str, &str); 8] = [
        ("hourly_rate", "REAL NOT NULL DEFAULT 0"),
        ("rate_saturday", "REAL NOT NULL DEFAULT 0"),
        ("rate_sunday", "REAL NOT NULL DEFAULT 0"),
        ("rate_night", "REAL NOT NULL DEFAULT 0"),
        ("rate_overtime", "REAL NOT NULL DEFAULT 0"),
        ("pin_hash", "TEXT"),
        ("password_hash", "TEXT"),
        ("is_admin", "INTEGER NOT NULL DEFAULT 0"),
    ];
    const ATTENDANCE_COLUMNS: [(&str, &str); 5] = [
        ("duration_min", "INTEGER"),
        ("is_holiday", "TEXT NOT NULL DEFAULT 'nie'"),
        ("is_sick", "TEXT NOT NULL DEFAULT 'nie'"),
        ("emergency_end", "INTEGER NOT NULL DEFAULT 0"),
        ("notes", "TEXT NOT NULL DEFAULT ''"),
    ];

    let mut added = Vec::new();

    for (col, decl) in EMPLOYEE_COLUMNS {
        if !column_exists(conn, "employees", col)? {
            conn.execute_batch(&format!("ALTER TABLE employees ADD COLUMN {col} {decl};"))?;
            added.push(format!("employees.{col}"));
        }
    }
    if !column_exists(conn, "employees", "created_at")? {
        conn.execute_batch("ALTER TABLE employees ADD COLUMN created_at TEXT;")?;
        added.push("employees.created_at".to_string());
    }
    for (col, decl) in ATTENDANCE_COLUMNS {
        if !column_exists(conn, "attendance_logs", col)? {
            conn.execute_batch(&format!(
                "ALTER TABLE attendance_logs ADD COLUMN {col} {decl};"
            ))?;
            added.push(format!("attendance_logs.{col}"));
        }
    }

    if !added.is_empty() {
        success(format!("Added columns: {}", added.join(", ")));
    }
    Ok(())
}

/// Plaintext `employees.pin` → salted hash in `pin_hash`, then drop the column.
fn migrate_hash_plaintext_pins(conn: &Connection) -> AppResult<()> {
    let version = "20250801_0002_hash_plaintext_pins";
    if migration_applied(conn, version)? {
        return Ok(());
    }
    if !column_exists(conn, "employees", "pin")? {
        return mark_applied(conn, version, "no plaintext PIN column present");
    }

    let pins: Vec<(String, String)> = {
        let mut stmt = conn.prepare(
            "SELECT id, CAST(pin AS TEXT) FROM employees WHERE pin IS NOT NULL AND TRIM(CAST(pin AS TEXT)) <> ''",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<Result<Vec<_>, _>>()?
    };

    let tx = conn.unchecked_transaction()?;
    for (id, pin) in &pins {
        let hashed = hash_secret(pin.trim(), MIGRATION_PIN_ITERATIONS);
        tx.execute(
            "UPDATE employees SET pin_hash = ?1 WHERE id = ?2",
            params![hashed, id],
        )?;
    }
    tx.execute_batch("ALTER TABLE employees DROP COLUMN pin;")?;
    tx.commit()?;

    mark_applied(
        conn,
        version,
        &format!("hashed {} plaintext PIN(s)", pins.len()),
    )
}

/// Fold the legacy `shifts` table (`"lat,lon"` text locations) into `attendance_logs`.
fn migrate_legacy_shifts(conn: &Connection) -> AppResult<()> {
    let version = "20250801_0003_fold_legacy_shifts";
    if migration_applied(conn, version)? {
        return Ok(());
    }
    if !table_exists(conn, "shifts")? {
        return mark_applied(conn, version, "no legacy shifts table");
    }

    warning("Moving legacy 'shifts' rows into attendance_logs...");

    let tx = conn.unchecked_transaction()?;
    let moved = tx.execute(
        r#"
        INSERT INTO attendance_logs
            (worker_id, start_time, start_lat, start_lon, stop_time, stop_lat, stop_lon, duration_min)
        SELECT
            CAST(employee_id AS TEXT),
            start_time,
            CASE WHEN instr(start_location, ',') > 0
                 THEN CAST(substr(start_location, 1, instr(start_location, ',') - 1) AS REAL) END,
            CASE WHEN instr(start_location, ',') > 0
                 THEN CAST(substr(start_location, instr(start_location, ',') + 1) AS REAL) END,
            stop_time,
            CASE WHEN instr(stop_location, ',') > 0
                 THEN CAST(substr(stop_location, 1, instr(stop_location, ',') - 1) AS REAL) END,
            CASE WHEN instr(stop_location, ',') > 0
                 THEN CAST(substr(stop_location, instr(stop_location, ',') + 1) AS REAL) END,
            duration_min
        FROM shifts
        WHERE start_time IS NOT NULL
        "#,
        [],
    )?;
    tx.execute_batch("DROP TABLE shifts;")?;
    tx.commit()?;

    mark_applied(conn, version, &format!("moved {moved} legacy shift(s)"))
}

/// Fold the legacy `work_sessions` table into `attendance_logs`.
fn migrate_legacy_work_sessions(conn: &Connection) -> AppResult<()> {
    let version = "20250801_0004_fold_work_sessions";
    if migration_applied(conn, version)? {
        return Ok(());
    }
    if !table_exists(conn, "work_sessions")? {
        return mark_applied(conn, version, "no legacy work_sessions table");
    }

    warning("Moving legacy 'work_sessions' rows into attendance_logs...");

    let tx = conn.unchecked_transaction()?;
    let moved = tx.execute(
        r#"
        INSERT INTO attendance_logs
            (worker_id, start_time, start_lat, start_lon, stop_time, stop_lat, stop_lon,
             duration_min, emergency_end, notes)
        SELECT
            CAST(employee_id AS TEXT), start_time, start_lat, start_lon, end_time, end_lat, end_lon,
            duration_minutes, COALESCE(emergency_end, 0), COALESCE(notes, '')
        FROM work_sessions
        WHERE start_time IS NOT NULL
        "#,
        [],
    )?;
    tx.execute_batch("DROP TABLE work_sessions;")?;
    tx.commit()?;

    mark_applied(conn, version, &format!("moved {moved} work session(s)"))
}

/// Copy weekend rates from the legacy `rates` table where the employee has none.
fn migrate_legacy_rates(conn: &Connection) -> AppResult<()> {
    let version = "20250801_0005_fold_legacy_rates";
    if migration_applied(conn, version)? {
        return Ok(());
    }
    if !table_exists(conn, "rates")? {
        return mark_applied(conn, version, "no legacy rates table");
    }

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        r#"
        UPDATE employees SET
            rate_saturday = COALESCE((SELECT saturday_rate FROM rates r WHERE CAST(r.employee_id AS TEXT) = employees.id), 0)
        WHERE rate_saturday = 0;
        UPDATE employees SET
            rate_sunday = COALESCE((SELECT sunday_rate FROM rates r WHERE CAST(r.employee_id AS TEXT) = employees.id), 0)
        WHERE rate_sunday = 0;
        DROP TABLE rates;
        "#,
    )?;
    tx.commit()?;

    mark_applied(conn, version, "weekend rates copied from legacy rates table")
}

/// Timestamps written by older clients use a `T` separator or fractional
/// seconds; range queries compare text, so normalize them once.
fn migrate_normalize_timestamps(conn: &Connection) -> AppResult<()> {
    let version = "20250801_0006_normalize_timestamps";
    if migration_applied(conn, version)? {
        return Ok(());
    }

    conn.execute_batch(
        r#"
        UPDATE attendance_logs SET start_time = substr(replace(start_time, 'T', ' '), 1, 19)
            WHERE start_time LIKE '%T%' OR length(start_time) > 19;
        UPDATE attendance_logs SET stop_time = substr(replace(stop_time, 'T', ' '), 1, 19)
            WHERE stop_time IS NOT NULL AND (stop_time LIKE '%T%' OR length(stop_time) > 19);
        UPDATE attendance_logs SET
            duration_min = CAST(ROUND((julianday(stop_time) - julianday(start_time)) * 1440) AS INTEGER)
            WHERE stop_time IS NOT NULL AND duration_min IS NULL;
        "#,
    )?;

    mark_applied(conn, version, "attendance timestamps normalized")
}

fn backup_before_migration(db_path: &str) -> AppResult<()> {
    use chrono::Local;
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::Path;
    use zip::CompressionMethod;
    use zip::ZipWriter;
    use zip::write::FileOptions;

    let backup_name = format!(
        "{}-backup_db_pre_migration.zip",
        Local::now().format("%Y%m%d_%H%M%S")
    );

    let backup_path = Path::new(db_path)
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(&backup_name);

    let file = File::create(&backup_path)?;
    let mut zip = ZipWriter::new(file);

    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("database.sqlite", options)
        .map_err(|e| AppError::Migration(format!("Backup failed (start_file): {e}")))?;

    let db_content = fs::read(db_path)?;
    zip.write_all(&db_content)?;

    zip.finish()
        .map_err(|e| AppError::Migration(format!("Backup failed (finish): {e}")))?;

    success(format!("📦 Backup created: {}", backup_path.display()));
    Ok(())
}

/// Anything that rewrites existing rows in a destructive way.
fn needs_legacy_rewrite(conn: &Connection) -> AppResult<bool> {
    let employees_pin =
        table_exists(conn, "employees")? && column_exists(conn, "employees", "pin")?;
    Ok(employees_pin
        || table_exists(conn, "shifts")?
        || table_exists(conn, "work_sessions")?
        || table_exists(conn, "rates")?)
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::init_db().
pub fn run_pending_migrations(conn: &Connection) -> AppResult<()> {
    // 1) Ensure log table
    ensure_log_table(conn)?;

    // 2) Legacy layout → safety backup first
    if needs_legacy_rewrite(conn)? {
        warning("Legacy schema detected, creating safety backup before migration...");

        let db_path: String = conn
            .query_row("PRAGMA database_list;", [], |row| row.get::<_, String>(2))
            .unwrap_or_default();

        if !db_path.is_empty() {
            backup_before_migration(&db_path)?;
        } else {
            warning("Could not determine DB path, backup skipped.");
        }
    }

    // 3) Tables and columns
    create_schema(conn)?;
    add_missing_columns(conn)?;
    create_indexes(conn)?;

    // 4) Data migrations
    migrate_hash_plaintext_pins(conn)?;
    migrate_legacy_shifts(conn)?;
    migrate_legacy_work_sessions(conn)?;
    migrate_legacy_rates(conn)?;
    migrate_normalize_timestamps(conn)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_gets_every_table_and_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        run_pending_migrations(&conn).unwrap();

        for t in [
            "employees",
            "attendance_logs",
            "device_logs",
            "statistics_access_logs",
            "device_security_alerts",
            "admin_logs",
        ] {
            assert!(table_exists(&conn, t).unwrap(), "{t}");
        }

        let applied = applied_migrations(&conn).unwrap();
        assert_eq!(applied.len(), 5);
    }

    #[test]
    fn legacy_pins_and_tables_are_folded() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE employees (id TEXT PRIMARY KEY, name TEXT, hourly_rate REAL, pin TEXT);
            INSERT INTO employees VALUES ('7', 'Jan Kowalski', 30, '1234');
            CREATE TABLE attendance_logs (
                id INTEGER PRIMARY KEY, worker_id TEXT, start_time TEXT, start_lat REAL,
                start_lon REAL, stop_time TEXT, stop_lat REAL, stop_lon REAL);
            INSERT INTO attendance_logs (worker_id, start_time, stop_time)
                VALUES ('7', '2025-03-03T08:00:00.000000', '2025-03-03 16:00:00');
            CREATE TABLE shifts (
                id INTEGER PRIMARY KEY, employee_id INTEGER, start_time TEXT, stop_time TEXT,
                start_location TEXT, stop_location TEXT, duration_min INTEGER);
            INSERT INTO shifts (employee_id, start_time, stop_time, start_location, stop_location, duration_min)
                VALUES (7, '2025-03-04 08:00:00', '2025-03-04 12:00:00', '52.1,21.0', '52.2,21.1', 240);
            "#,
        )
        .unwrap();

        run_pending_migrations(&conn).unwrap();

        assert!(!column_exists(&conn, "employees", "pin").unwrap());
        let hash: String = conn
            .query_row("SELECT pin_hash FROM employees WHERE id = '7'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert!(crate::core::auth::verify_secret("1234", &hash));

        assert!(!table_exists(&conn, "shifts").unwrap());
        let (count, lat): (i64, f64) = conn
            .query_row(
                "SELECT COUNT(*), MAX(start_lat) FROM attendance_logs",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(count, 2);
        assert!((lat - 52.1).abs() < 1e-9);

        let start: String = conn
            .query_row(
                "SELECT start_time FROM attendance_logs ORDER BY id LIMIT 1",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(start, "2025-03-03 08:00:00");
    }
}
