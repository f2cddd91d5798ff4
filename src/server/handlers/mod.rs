pub mod auth;
pub mod devices;
pub mod email;
pub mod logs;
pub mod mobile;
pub mod reports;
pub mod shifts;
pub mod workers;

use crate::errors::AppResult;
use crate::server::state::AppState;
use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

pub async fn root() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
    }))
}

pub async fn health(State(state): State<AppState>) -> AppResult<Json<Value>> {
    state.with_db(|conn| Ok(conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))?))?;
    Ok(Json(json!({"status": "ok", "database": "ok"})))
}
