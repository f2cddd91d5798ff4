use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::workers::WorkerLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::success;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Admin { id, password, name } = cmd {
        let pool = DbPool::new(&cfg.database)?;
        WorkerLogic::upsert_admin(
            &pool.conn,
            id,
            name,
            password,
            cfg.security.password_iterations,
        )?;
        success(format!("Administrator '{id}' saved."));
    }

    Ok(())
}
