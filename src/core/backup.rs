use crate::config::Config;
use crate::db::log::ttlog;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{confirm, info, success, warning};
use chrono::{DateTime, Local, NaiveDateTime};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const PREFIX: &str = "rattendance_backup_";
const META_EXT: &str = "json";

/// Sidecar written next to every backup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackupMetadata {
    pub timestamp: String,
    pub original_db: String,
    pub backup_file: String,
    pub compressed: bool,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackupEntry {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: NaiveDateTime,
}

fn is_backup_file(p: &Path) -> bool {
    p.is_file()
        && matches!(
            p.extension().and_then(|e| e.to_str()),
            Some("db" | "gz" | "sqlite")
        )
}

fn meta_path(backup: &Path) -> PathBuf {
    let mut name = backup.as_os_str().to_owned();
    name.push(".");
    name.push(META_EXT);
    PathBuf::from(name)
}

fn modified_local(p: &Path) -> AppResult<NaiveDateTime> {
    let t: SystemTime = fs::metadata(p)?.modified()?;
    Ok(DateTime::<Local>::from(t).naive_local())
}

/// Gzip `path` into `<path>.gz`.
fn gzip(path: &Path) -> AppResult<PathBuf> {
    let mut gz_name = path.as_os_str().to_owned();
    gz_name.push(".gz");
    let gz_path = PathBuf::from(gz_name);

    let mut input = fs::File::open(path)?;
    let mut encoder = GzEncoder::new(fs::File::create(&gz_path)?, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;

    Ok(gz_path)
}

pub struct BackupLogic;

impl BackupLogic {
    /// Default target: `<config dir>/backups/rattendance_backup_<ts>.db`.
    pub fn default_target(now: NaiveDateTime) -> PathBuf {
        Config::backup_dir().join(format!("{PREFIX}{}.db", now.format("%Y%m%d_%H%M%S")))
    }

    /// Copy the database, optionally gzip it, and write the metadata sidecar.
    /// Returns `None` when the user declined to overwrite an existing file.
    pub fn backup(cfg: &Config, dest: &Path, compress: bool, force: bool) -> AppResult<Option<BackupMetadata>> {
        let src = Path::new(&cfg.database);
        if !src.exists() {
            return Err(AppError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Database not found: {}", src.display()),
            )));
        }

        if let Some(parent) = dest.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        if dest.exists() && !force && !confirm(format!("The file '{}' already exists. Overwrite?", dest.display()))? {
            warning("Backup cancelled by user.");
            return Ok(None);
        }

        fs::copy(src, dest)?;
        success(format!("Backup created: {}", dest.display()));

        let final_path = if compress {
            let gz = gzip(dest)?;
            if let Err(e) = fs::remove_file(dest) {
                warning(format!("Failed to remove uncompressed backup: {e}"));
            }
            info(format!("Compressed: {}", gz.display()));
            gz
        } else {
            dest.to_path_buf()
        };

        let meta = BackupMetadata {
            timestamp: Local::now().to_rfc3339(),
            original_db: src.to_string_lossy().to_string(),
            backup_file: final_path.to_string_lossy().to_string(),
            compressed: compress,
            size_bytes: fs::metadata(&final_path)?.len(),
        };
        fs::write(meta_path(&final_path), serde_json::to_string_pretty(&meta)?)?;

        let conn = Connection::open(src)?;
        ttlog(
            &conn,
            "backup",
            &meta.backup_file,
            if compress {
                "Backup created and compressed"
            } else {
                "Backup created"
            },
        )?;

        Ok(Some(meta))
    }

    /// Backups in `dir`, newest first.
    pub fn list(dir: &Path) -> AppResult<Vec<BackupEntry>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for e in fs::read_dir(dir)? {
            let path = e?.path();
            if !is_backup_file(&path) {
                continue;
            }
            entries.push(BackupEntry {
                size_bytes: fs::metadata(&path)?.len(),
                modified: modified_local(&path)?,
                path,
            });
        }

        entries.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.path.cmp(&a.path)));
        Ok(entries)
    }

    /// Replace the database with `file`. The current database is kept as
    /// `<db>.pre_restore_<ts>`; its path is returned.
    pub fn restore(cfg: &Config, file: &Path, now: NaiveDateTime) -> AppResult<PathBuf> {
        if !file.exists() {
            return Err(AppError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Backup not found: {}", file.display()),
            )));
        }

        let db = Path::new(&cfg.database);
        let mut saved = db.as_os_str().to_owned();
        saved.push(format!(".pre_restore_{}", now.format("%Y%m%d_%H%M%S")));
        let saved = PathBuf::from(saved);

        if db.exists() {
            fs::copy(db, &saved)?;
            info(format!("Current database saved as {}", saved.display()));
        }

        if file.extension().and_then(|e| e.to_str()) == Some("gz") {
            let mut decoder = GzDecoder::new(fs::File::open(file)?);
            let mut out = fs::File::create(db)?;
            io::copy(&mut decoder, &mut out)?;
        } else {
            fs::copy(file, db)?;
        }

        let conn = Connection::open(db)?;
        ttlog(&conn, "restore", &file.to_string_lossy(), "Database restored from backup")?;
        success(format!("Database restored from {}", file.display()));

        Ok(saved)
    }

    /// Delete backups older than `keep_days`, never touching the newest
    /// `keep_count`. Returns the removed files.
    pub fn cleanup(dir: &Path, keep_days: i64, keep_count: usize, now: NaiveDateTime) -> AppResult<Vec<PathBuf>> {
        let cutoff = now - chrono::Duration::days(keep_days);
        let mut removed = Vec::new();

        for entry in Self::list(dir)?.into_iter().skip(keep_count) {
            if entry.modified >= cutoff {
                continue;
            }
            fs::remove_file(&entry.path)?;
            let meta = meta_path(&entry.path);
            if meta.exists() {
                fs::remove_file(meta)?;
            }
            removed.push(entry.path);
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;
    use std::env;

    fn workspace(name: &str) -> (PathBuf, Config) {
        let dir = env::temp_dir().join(format!("rattendance_backup_test_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();

        let db = dir.join("att.sqlite");
        let conn = Connection::open(&db).unwrap();
        init_db(&conn).unwrap();

        let cfg = Config {
            database: db.to_string_lossy().to_string(),
            ..Config::default()
        };
        (dir, cfg)
    }

    #[test]
    fn compressed_backup_restores() {
        let (dir, cfg) = workspace("gz");
        let dest = dir.join("backups").join("b1.db");

        let meta = BackupLogic::backup(&cfg, &dest, true, true).unwrap().unwrap();
        assert!(meta.compressed);
        assert!(meta.backup_file.ends_with("b1.db.gz"));
        assert!(!dest.exists());
        assert!(meta_path(Path::new(&meta.backup_file)).exists());

        let listed = BackupLogic::list(&dir.join("backups")).unwrap();
        assert_eq!(listed.len(), 1);

        let now = crate::utils::date::now();
        let saved = BackupLogic::restore(&cfg, Path::new(&meta.backup_file), now).unwrap();
        assert!(saved.exists());

        let conn = Connection::open(&cfg.database).unwrap();
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM employees", [], |r| r.get(0))
            .unwrap();
        assert_eq!(n, 0);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn cleanup_keeps_newest() {
        let (dir, cfg) = workspace("cleanup");
        let backups = dir.join("backups");
        for i in 0..3 {
            BackupLogic::backup(&cfg, &backups.join(format!("b{i}.db")), false, true).unwrap();
        }

        let future = crate::utils::date::now() + chrono::Duration::days(60);
        let removed = BackupLogic::cleanup(&backups, 30, 1, future).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(BackupLogic::list(&backups).unwrap().len(), 1);

        let nothing = BackupLogic::cleanup(&backups, 30, 0, crate::utils::date::now()).unwrap();
        assert!(nothing.is_empty());

        fs::remove_dir_all(&dir).ok();
    }
}
