use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::backup::BackupLogic;
use crate::errors::AppResult;
use crate::ui::messages::{header, info, success};
use crate::utils::table::Table;
use chrono::Local;
use std::path::{Path, PathBuf};

/// `--list` and `--cleanup` read `--file` as a directory when given.
fn backup_dir(file: &Option<String>) -> PathBuf {
    file.as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(Config::backup_dir)
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Backup {
        file,
        compress,
        list,
        restore,
        cleanup,
        keep_days,
        keep_count,
        force,
    } = cmd
    {
        let now = Local::now().naive_local();

        if *list {
            let dir = backup_dir(file);
            let entries = BackupLogic::list(&dir)?;
            if entries.is_empty() {
                info(format!("No backups in {}", dir.display()));
                return Ok(());
            }

            header(format!("Backups in {}", dir.display()));
            let mut table = Table::new(&["File", "Size (KB)", "Modified"]);
            for e in &entries {
                table.add_row(vec![
                    e.path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default(),
                    format!("{:.1}", e.size_bytes as f64 / 1024.0),
                    e.modified.format("%Y-%m-%d %H:%M:%S").to_string(),
                ]);
            }
            print!("{}", table.render());
            return Ok(());
        }

        if let Some(src) = restore {
            BackupLogic::restore(cfg, Path::new(src), now)?;
            return Ok(());
        }

        if *cleanup {
            let removed = BackupLogic::cleanup(&backup_dir(file), *keep_days, *keep_count, now)?;
            for p in &removed {
                info(format!("Removed {}", p.display()));
            }
            success(format!("Cleanup completed, {} backup(s) removed.", removed.len()));
            return Ok(());
        }

        let dest = file
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| BackupLogic::default_target(now));
        BackupLogic::backup(cfg, &dest, *compress, *force)?;
    }

    Ok(())
}
