use crate::core::auth::AdminSession;
use crate::core::shifts::{SESSION_EXPIRED_MSG, ShiftLogic, StopOutcome};
use crate::errors::AppResult;
use crate::models::Shift;
use crate::server::state::AppState;
use crate::utils::date;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Default, Deserialize)]
pub struct Location {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub employee_id: String,
    pub czas_start: String,
    #[serde(default)]
    pub lokalizacja_start: Location,
}

#[derive(Debug, Deserialize)]
pub struct StopRequest {
    pub employee_id: String,
    pub czas_stop: String,
    #[serde(default)]
    pub lokalizacja_stop: Location,
}

pub async fn start(State(state): State<AppState>, Json(body): Json<StartRequest>) -> AppResult<Json<Value>> {
    let at = date::parse_datetime(&body.czas_start)?;
    let rounding = state.config()?.time_rounding;
    let loc = &body.lokalizacja_start;

    let id = state.with_db(|conn| {
        ShiftLogic::start(conn, &rounding, body.employee_id.trim(), at, loc.lat, loc.lon)
    })?;
    Ok(Json(json!({"msg": "Shift started", "id": id})))
}

pub async fn stop(State(state): State<AppState>, Json(body): Json<StopRequest>) -> AppResult<Json<Value>> {
    let at = date::parse_datetime(&body.czas_stop)?;
    let rounding = state.config()?.time_rounding;
    let loc = &body.lokalizacja_stop;

    let outcome = state.with_db(|conn| {
        ShiftLogic::stop(conn, &rounding, body.employee_id.trim(), at, loc.lat, loc.lon)
    })?;

    Ok(Json(match outcome {
        StopOutcome::Stopped { duration_min, .. } => {
            json!({"msg": "Shift stopped", "duration_min": duration_min})
        }
        StopOutcome::SessionExpired => json!({"msg": SESSION_EXPIRED_MSG, "status": "session_expired"}),
    }))
}

pub async fn force_stop(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminSession>,
    Path(log_id): Path<i64>,
) -> AppResult<Json<Value>> {
    let shift: Shift = state.with_db(|conn| ShiftLogic::force_stop(conn, log_id, &admin.admin_id, date::now()))?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Zmiana {log_id} została zakończona"),
        "log": shift,
    })))
}

pub async fn emergency_end(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminSession>,
) -> AppResult<Json<Value>> {
    let ended = state.with_db(|conn| ShiftLogic::emergency_end(conn, &admin.admin_id, date::now()))?;

    if ended.count == 0 {
        return Ok(Json(json!({"message": "No active work sessions found", "count": 0})));
    }
    Ok(Json(json!({
        "message": format!("Emergency end applied to {} work sessions", ended.count),
        "count": ended.count,
        "end_time": date::to_db(&ended.end_time),
    })))
}
