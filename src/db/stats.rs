use crate::db::migrate::{applied_migrations, table_exists};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

const TABLES: [&str; 7] = [
    "employees",
    "attendance_logs",
    "device_logs",
    "statistics_access_logs",
    "device_security_alerts",
    "admin_logs",
    "log",
];

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> AppResult<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) ROW COUNTS
    //
    println!("{}• Rows:{}", CYAN, RESET);
    for table in TABLES {
        if !table_exists(&pool.conn, table)? {
            println!("    {:<24} {GREY}--{RESET}", table);
            continue;
        }
        let count: i64 =
            pool.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        println!("    {:<24} {GREEN}{count}{RESET}", table);
    }

    //
    // 3) ATTENDANCE RANGE
    //
    if table_exists(&pool.conn, "attendance_logs")? {
        let range: Option<(Option<String>, Option<String>)> = pool
            .conn
            .query_row(
                "SELECT MIN(start_time), MAX(start_time) FROM attendance_logs",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (first, last) = range.unwrap_or((None, None));
        println!("{}• Attendance range:{}", CYAN, RESET);
        println!(
            "    from: {}",
            first.unwrap_or_else(|| format!("{GREY}--{RESET}"))
        );
        println!(
            "    to:   {}",
            last.unwrap_or_else(|| format!("{GREY}--{RESET}"))
        );
    }

    //
    // 4) MIGRATIONS
    //
    let applied = applied_migrations(&pool.conn)?;
    println!("{}• Migrations applied:{} {}", CYAN, RESET, applied.len());
    for (version, when) in applied {
        println!("    {GREY}{when}{RESET}  {version}");
    }

    println!();
    Ok(())
}
