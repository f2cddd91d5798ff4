use crate::config::Config;
use crate::core::auth::SessionStore;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::warn;

/// Shared by every handler. The DB lock is never held across an `.await`.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<DbPool>>,
    pub config: Arc<RwLock<Config>>,
    /// Where runtime config changes are written; `None` keeps them in memory.
    pub config_path: Option<PathBuf>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            db: Arc::new(Mutex::new(pool)),
            config: Arc::new(RwLock::new(config)),
            config_path,
            sessions: Arc::new(SessionStore::default()),
        }
    }

    /// Run synchronous DB work under the connection lock. Transactions roll
    /// back on unwind, so a lock poisoned by a panicked request is reused.
    pub fn with_db<T>(&self, f: impl FnOnce(&Connection) -> AppResult<T>) -> AppResult<T> {
        let mut pool = self.db.lock().unwrap_or_else(|poisoned| {
            warn!("database lock was poisoned by a panicked request, recovering");
            PoisonError::into_inner(poisoned)
        });
        pool.with_conn(|conn| f(conn))
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> AppResult<Config> {
        self.config
            .read()
            .map(|c| c.clone())
            .map_err(|_| AppError::Other("config lock poisoned".into()))
    }

    /// Mutate the configuration and persist it when a path is set.
    /// Nothing is kept when `f` fails. Startup overrides are not written.
    pub fn update_config<T>(&self, f: impl FnOnce(&mut Config) -> AppResult<T>) -> AppResult<T> {
        let mut guard = self
            .config
            .write()
            .map_err(|_| AppError::Other("config lock poisoned".into()))?;

        let mut draft = guard.clone();
        let out = f(&mut draft)?;

        if let Some(path) = &self.config_path {
            let on_disk = Config::load_from(path)?;
            draft.for_disk(&guard, &on_disk).save(path).inspect_err(|e| {
                warn!(path = %path.display(), error = %e, "failed to persist configuration");
            })?;
        }
        *guard = draft;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;
    use std::{env, fs, thread};

    fn state(name: &str, config: Config, config_path: Option<PathBuf>) -> AppState {
        let db = env::temp_dir().join(format!("{name}_state.sqlite"));
        fs::remove_file(&db).ok();
        let pool = DbPool::new(&db.to_string_lossy()).unwrap();
        init_db(&pool.conn).unwrap();
        AppState::new(pool, config, config_path)
    }

    #[test]
    fn config_update_keeps_overrides_out_of_the_file() {
        let path = env::temp_dir().join("rattendance_state_overrides.conf");
        let file = Config {
            database: "/data/att.sqlite".into(),
            ..Config::default()
        };
        file.save(&path).unwrap();

        let mut running = Config::load_from(&path).unwrap();
        running.database = "/tmp/one-off.sqlite".into();
        running.email.smtp_username = "env-user".into();
        running.email.smtp_password = "env-only-secret".into();
        let st = state("overrides", running, Some(path.clone()));

        let version = st
            .update_config(|cfg| {
                cfg.mobile.timer_enabled = false;
                Ok(cfg.bump_version())
            })
            .unwrap();

        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.database, "/data/att.sqlite");
        assert_eq!(saved.email.smtp_password, "");
        assert_eq!(saved.email.smtp_username, "");
        assert_eq!(saved.config_version, version);
        assert!(!saved.mobile.timer_enabled);

        let live = st.config().unwrap();
        assert_eq!(live.email.smtp_password, "env-only-secret");
        assert_eq!(live.database, "/tmp/one-off.sqlite");
        assert!(!live.mobile.timer_enabled);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn db_survives_a_panicked_request() {
        let st = state("poisoned", Config::default(), None);
        let db = Arc::clone(&st.db);
        let _ = thread::spawn(move || {
            let _guard = db.lock().unwrap();
            panic!("request failed mid-query");
        })
        .join();
        assert!(st.db.is_poisoned());

        let n: i64 = st
            .with_db(|c| Ok(c.query_row("SELECT COUNT(*) FROM log", [], |r| r.get(0))?))
            .unwrap();
        assert!(n >= 0);
    }
}
