#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use rattendance::config::Config;
use rattendance::db::initialize::init_db;
use rattendance::db::pool::DbPool;
use rattendance::server::state::AppState;
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn rat() -> Command {
    cargo_bin_cmd!("rattendance")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rattendance.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Initialize the DB through the CLI and add one worker with a PIN
pub fn init_db_with_worker(db_path: &str) {
    rat()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();

    rat()
        .args([
            "--db",
            db_path,
            "--test",
            "worker",
            "--add",
            "7",
            "--name",
            "Jan Kowalski",
            "--rate",
            "30",
            "--pin",
            "1234",
        ])
        .assert()
        .success();
}

/// Fresh database and server state that never writes a config file
pub fn test_state(name: &str) -> AppState {
    let db_path = setup_test_db(name);
    let pool = DbPool::new(&db_path).expect("open db");
    init_db(&pool.conn).expect("init db");

    let cfg = Config {
        database: db_path,
        ..Config::default()
    };
    AppState::new(pool, cfg, None)
}
