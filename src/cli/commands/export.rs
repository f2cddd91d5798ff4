use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::export::range::parse_range;
use crate::export::{ExportLogic, ExportRequest};
use chrono::Local;
use std::path::PathBuf;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        report,
        format,
        file,
        range,
        worker,
        force,
    } = cmd
    {
        let (from, to) = parse_range(range.as_deref(), Local::now().date_naive())?;
        let req = ExportRequest {
            kind: *report,
            from,
            to,
            worker_id: worker.clone(),
        };

        let file = file
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(ExportLogic::filename(&req, *format)));

        let pool = DbPool::new(&cfg.database)?;
        ExportLogic::export_file(&pool.conn, &cfg.payroll, &req, *format, &file, *force)?;
    }
    Ok(())
}
