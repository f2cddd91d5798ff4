use crate::db::log::{LogEntry, list_log};
use crate::errors::AppResult;
use ansi_term::Colour;
use regex::Regex;
use rusqlite::Connection;
use std::sync::OnceLock;

const OP_WIDTH: usize = 60;

fn strip_ansi(s: &str) -> String {
    static ANSI: OnceLock<Option<Regex>> = OnceLock::new();
    match ANSI.get_or_init(|| Regex::new(r"\x1B\[[0-9;]*[mK]").ok()) {
        Some(re) => re.replace_all(s, "").into_owned(),
        None => s.to_string(),
    }
}

fn color_for_operation(op: &str) -> Colour {
    match op {
        "add" | "worker_add" | "log_add" | "start" => Colour::Green,
        "del" | "worker_del" | "log_del" => Colour::Red,
        "edit" | "worker_edit" | "log_edit" | "stop" => Colour::Yellow,
        "force_stop" | "emergency_end" => Colour::RGB(255, 153, 51),
        "migration_applied" => Colour::Purple,
        "backup" | "restore" => Colour::Blue,
        "init" | "config" => Colour::Cyan,
        other if other.starts_with("migrate_to_") => Colour::Purple,
        _ => Colour::White,
    }
}

/// `op (target)` with only the operation coloured, cut to `OP_WIDTH` visible chars.
fn op_column(e: &LogEntry) -> String {
    let color = color_for_operation(&e.operation);
    let plain = if e.target.is_empty() {
        e.operation.clone()
    } else {
        format!("{} ({})", e.operation, e.target)
    };

    let visible = if plain.chars().count() > OP_WIDTH {
        let mut s: String = plain.chars().take(OP_WIDTH - 3).collect();
        s.push_str("...");
        s
    } else {
        plain
    };

    match visible.split_once(' ') {
        Some((op, rest)) => format!("{} {}", color.paint(op), rest),
        None => color.paint(visible.as_str()).to_string(),
    }
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(conn: &Connection, limit: Option<i64>) -> AppResult<()> {
        let entries = list_log(conn, limit)?;
        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let id_w = entries.iter().map(|e| e.id.to_string().len()).max().unwrap_or(1);
        let date_w = entries.iter().map(|e| e.date.len()).max().unwrap_or(10);
        let op_w = entries
            .iter()
            .map(|e| e.operation.len() + e.target.len() + 3)
            .max()
            .unwrap_or(10)
            .min(OP_WIDTH);

        println!("📜 Internal log:\n");

        for e in &entries {
            let op = op_column(e);
            let padding = " ".repeat(op_w.saturating_sub(strip_ansi(&op).chars().count()));
            println!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                e.id, e.date, op, padding, e.message
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(op: &str, target: &str) -> LogEntry {
        LogEntry {
            id: 1,
            date: "2025-01-01T10:00:00+01:00".into(),
            operation: op.into(),
            target: target.into(),
            message: "m".into(),
        }
    }

    #[test]
    fn long_targets_are_truncated_on_visible_width() {
        let col = op_column(&entry("backup", &"x".repeat(100)));
        let visible = strip_ansi(&col);
        assert_eq!(visible.chars().count(), OP_WIDTH);
        assert!(visible.ends_with("..."));
        assert!(visible.starts_with("backup ("));
    }

    #[test]
    fn bare_operation_is_coloured() {
        let col = op_column(&entry("init", ""));
        assert_ne!(col, "init");
        assert_eq!(strip_ansi(&col), "init");
    }
}
