use crate::core::logs::{AttendanceLogic, BatchCreated, BatchItem, LogCreate, LogPatch};
use crate::errors::AppResult;
use crate::models::Shift;
use crate::server::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};

pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Shift>>> {
    Ok(Json(state.with_db(|conn| AttendanceLogic::list(conn, None))?))
}

pub async fn for_worker(State(state): State<AppState>, Path(worker_id): Path<String>) -> AppResult<Json<Vec<Shift>>> {
    Ok(Json(state.with_db(|conn| AttendanceLogic::list(conn, Some(&worker_id)))?))
}

pub async fn create(State(state): State<AppState>, Json(body): Json<LogCreate>) -> AppResult<Json<Shift>> {
    Ok(Json(state.with_db(|conn| AttendanceLogic::create(conn, &body))?))
}

pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<LogPatch>,
) -> AppResult<Json<Shift>> {
    Ok(Json(state.with_db(|conn| AttendanceLogic::patch(conn, id, &body))?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Value>> {
    state.with_db(|conn| AttendanceLogic::delete(conn, id))?;
    Ok(Json(json!({"msg": "Usunięto log"})))
}

pub async fn batch(State(state): State<AppState>, Json(items): Json<Vec<BatchItem>>) -> AppResult<Json<Vec<BatchCreated>>> {
    Ok(Json(state.with_db(|conn| AttendanceLogic::batch(conn, &items))?))
}
