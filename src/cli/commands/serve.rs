use crate::cli::parser::Cli;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::server::{self, state::AppState};
use tracing::info;

/// Open the database, bring the schema up to date and run the HTTP API
/// until the process is stopped.
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Serve { host, port } = &cli.command {
        cfg.logging.init();

        let host = host.clone().unwrap_or_else(|| cfg.server.host.clone());
        let port = port.unwrap_or(cfg.server.port);

        let pool = DbPool::new(&cfg.database)?;
        init_db(&pool.conn)?;
        info!(database = %cfg.database, "database ready");

        // Test runs never write runtime config changes back to disk.
        let config_path = (!cli.test).then(Config::config_file);
        let state = AppState::new(pool, cfg.clone(), config_path);

        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(server::serve(state, &host, port))?;
    }

    Ok(())
}
