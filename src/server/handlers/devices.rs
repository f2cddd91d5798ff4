use crate::core::devices::{DeviceCheckRequest, DeviceCheckResult, DeviceLogic};
use crate::core::statistics::{
    MSG_BAD_DATE, MSG_NOT_AUTHORIZED, StatisticsLogic, VerifyPinRequest, VerifyPinResponse,
    period_stats, period_window,
};
use crate::db::log::list_admin_logs;
use crate::db::{access, devices};
use crate::errors::{AppError, AppResult};
use crate::server::state::AppState;
use crate::utils::date;
use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

pub async fn check_device(
    State(state): State<AppState>,
    Json(body): Json<DeviceCheckRequest>,
) -> AppResult<Json<DeviceCheckResult>> {
    Ok(Json(state.with_db(|conn| DeviceLogic::check(conn, &body))?))
}

pub async fn device_logs(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let logs = state.with_db(devices::list_devices)?;
    Ok(Json(json!({"success": true, "total_count": logs.len(), "logs": logs})))
}

pub async fn verify_stats_pin(
    State(state): State<AppState>,
    Json(body): Json<VerifyPinRequest>,
) -> AppResult<Json<VerifyPinResponse>> {
    Ok(Json(state.with_db(|conn| StatisticsLogic::verify_pin(conn, &body, date::now()))?))
}

fn not_authorized() -> Json<Value> {
    Json(json!({"success": false, "message": MSG_NOT_AUTHORIZED}))
}

pub async fn worker_statistics(State(state): State<AppState>, Path(worker_id): Path<String>) -> AppResult<Json<Value>> {
    let security = state.config()?.security;
    state.with_db(|conn| {
        if !StatisticsLogic::is_authorized(conn, &security, &worker_id, date::now())? {
            return Ok(not_authorized());
        }
        let data = StatisticsLogic::recent_overview(conn, &worker_id)?;
        Ok(Json(json!({"success": true, "data": data})))
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct PeriodRequest {
    #[serde(default)]
    pub period_type: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

pub async fn worker_period(
    State(state): State<AppState>,
    Path(worker_id): Path<String>,
    Json(body): Json<PeriodRequest>,
) -> AppResult<Json<Value>> {
    let security = state.config()?.security;
    let now = date::now();

    state.with_db(|conn| {
        if !StatisticsLogic::is_authorized(conn, &security, &worker_id, now)? {
            return Ok(not_authorized());
        }
        let window = match period_window(
            body.period_type.as_deref().unwrap_or("month"),
            body.start_date.as_deref(),
            body.end_date.as_deref(),
            now,
        ) {
            Ok(w) => w,
            Err(_) => return Ok(Json(json!({"success": false, "message": MSG_BAD_DATE}))),
        };
        let data = period_stats(conn, &worker_id, &window, None)?;
        Ok(Json(json!({"success": true, "data": data})))
    })
}

pub async fn security_alerts(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let alerts = state.with_db(access::unresolved_alerts)?;
    let rows: Vec<Value> = alerts
        .iter()
        .map(|a| {
            json!({
                "id": a.id,
                "worker_id": a.worker_id,
                "alert_type": a.alert_type,
                "old_device": a.old_device_model.as_deref().or(a.old_device_id.as_deref()),
                "new_device": a.new_device_model.as_deref().or(a.new_device_id.as_deref()),
                "created_at": a.created_at,
                "is_resolved": a.is_resolved,
            })
        })
        .collect();
    Ok(Json(json!({"success": true, "count": rows.len(), "alerts": rows})))
}

pub async fn resolve_alert(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Value>> {
    if !state.with_db(|conn| access::resolve_alert(conn, id))? {
        return Err(AppError::NotFound("Alert nie istnieje".into()));
    }
    Ok(Json(json!({"success": true, "message": "Alert oznaczony jako rozwiązany"})))
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

pub async fn access_logs(State(state): State<AppState>, Query(q): Query<LimitQuery>) -> AppResult<Json<Value>> {
    let logs = state.with_db(|conn| access::list_access_logs(conn, q.limit.unwrap_or(50).max(1)))?;
    let rows: Vec<Value> = logs
        .iter()
        .map(|l| {
            json!({
                "id": l.id,
                "worker_id": l.worker_id,
                "device_model": l.device_model,
                "pin_correct": l.pin_correct,
                "access_granted": l.access_granted,
                "attempted_at": l.attempted_at,
                "location_text": l.location_text,
            })
        })
        .collect();
    Ok(Json(json!({"success": true, "count": rows.len(), "logs": rows})))
}

pub async fn admin_logs(State(state): State<AppState>, Query(q): Query<LimitQuery>) -> AppResult<Json<Value>> {
    let logs = state.with_db(|conn| list_admin_logs(conn, q.limit.unwrap_or(100).max(1)))?;
    Ok(Json(json!({"success": true, "count": logs.len(), "logs": logs})))
}
