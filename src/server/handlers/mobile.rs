use crate::core::mobile::merge_mobile;
use crate::core::rounding::merge_update;
use crate::core::versioning::check_version;
use crate::errors::{AppError, AppResult};
use crate::server::state::AppState;
use crate::utils::date;
use axum::Json;
use axum::extract::State;
use chrono::Local;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

fn timestamp() -> String {
    Local::now().to_rfc3339()
}

pub async fn mobile_config(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let cfg = state.config()?;
    Ok(Json(json!({
        "config": cfg.mobile,
        "version": cfg.config_version,
        "timestamp": timestamp(),
    })))
}

pub async fn update_mobile_config(State(state): State<AppState>, Json(body): Json<Value>) -> AppResult<Json<Value>> {
    let (mobile, version) = state.update_config(|cfg| {
        cfg.mobile = merge_mobile(&cfg.mobile, &body)?;
        let version = cfg.bump_version();
        Ok((cfg.mobile.clone(), version))
    })?;
    info!(%version, "mobile configuration updated");

    Ok(Json(json!({
        "success": true,
        "message": "Konfiguracja mobilna została zaktualizowana",
        "config": mobile,
        "version": version,
        "timestamp": timestamp(),
    })))
}

pub async fn config_version(State(state): State<AppState>) -> AppResult<Json<Value>> {
    Ok(Json(json!({
        "version": state.config()?.config_version,
        "timestamp": timestamp(),
    })))
}

pub async fn app_version(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let cfg = state.config()?;
    Ok(Json(json!({
        "version_info": cfg.app_version,
        "server_time": date::to_db(&date::now()),
        "config_version": cfg.config_version,
    })))
}

fn default_client_version() -> String {
    "0.0.0".to_string()
}

#[derive(Debug, Deserialize)]
pub struct VersionCheckRequest {
    #[serde(default = "default_client_version")]
    pub current_version: String,
}

pub async fn check_app_version(
    State(state): State<AppState>,
    Json(body): Json<VersionCheckRequest>,
) -> AppResult<Json<Value>> {
    let check = check_version(&body.current_version, &state.config()?.app_version)?;
    let mut out = serde_json::to_value(check)?;
    if let Value::Object(m) = &mut out {
        m.insert("timestamp".into(), json!(timestamp()));
    }
    Ok(Json(out))
}

pub async fn time_rounding_config(State(state): State<AppState>) -> AppResult<Json<Value>> {
    Ok(Json(json!({
        "config": state.config()?.time_rounding,
        "timestamp": timestamp(),
    })))
}

pub async fn update_time_rounding(State(state): State<AppState>, Json(body): Json<Value>) -> AppResult<Json<Value>> {
    let Value::Object(update) = body else {
        return Err(AppError::BadRequest("Konfiguracja musi być obiektem JSON".into()));
    };

    let (rounding, old_version, new_version) = state.update_config(|cfg| {
        cfg.time_rounding = merge_update(&cfg.time_rounding, &update)?;
        let old = cfg.config_version.clone();
        let new = cfg.bump_version();
        Ok((cfg.time_rounding.clone(), old, new))
    })?;
    info!(version = %new_version, enabled = rounding.enabled, "time rounding updated");

    Ok(Json(json!({
        "success": true,
        "message": "Konfiguracja zaokrąglania czasu została zaktualizowana",
        "config": rounding,
        "version": old_version,
        "new_version": new_version,
        "timestamp": timestamp(),
    })))
}
