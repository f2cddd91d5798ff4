use crate::core::auth::{AdminSession, AuthLogic, LoginResult};
use crate::errors::{AppError, AppResult};
use crate::server::auth::{SESSION_COOKIE, session_token};
use crate::server::state::AppState;
use crate::utils::date;
use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct EmployeeLogin {
    #[serde(default)]
    pub employee_id: String,
    #[serde(default)]
    pub pin: String,
}

pub async fn login(State(state): State<AppState>, Json(body): Json<EmployeeLogin>) -> AppResult<Json<LoginResult>> {
    let result = state.with_db(|conn| AuthLogic::login(conn, &body.employee_id, &body.pin))?;
    if !result.success {
        warn!(employee = %body.employee_id, "failed employee login");
    }
    Ok(Json(result))
}

pub async fn verify_pin(State(state): State<AppState>, Json(body): Json<EmployeeLogin>) -> AppResult<Json<Value>> {
    let found = state.with_db(|conn| AuthLogic::verify_pin(conn, &body.employee_id, &body.pin))?;
    Ok(Json(match found {
        Some(emp) => json!({"valid": true, "employee_id": emp.id, "name": emp.display_name()}),
        None => json!({"valid": false, "message": "Nieprawidłowy PIN"}),
    }))
}

pub async fn employee_by_pin(State(state): State<AppState>, Path(pin): Path<String>) -> AppResult<Json<Value>> {
    let emp = state
        .with_db(|conn| AuthLogic::employee_by_pin(conn, &pin))?
        .ok_or_else(|| AppError::NotFound("Pracownik nie znaleziony".into()))?;
    Ok(Json(json!({"id": emp.id, "name": emp.display_name(), "hourly_rate": emp.hourly_rate})))
}

#[derive(Debug, Deserialize)]
pub struct AdminLogin {
    pub username: String,
    pub password: String,
}

pub async fn admin_login(State(state): State<AppState>, Json(body): Json<AdminLogin>) -> AppResult<Response> {
    let ok = state.with_db(|conn| AuthLogic::verify_admin(conn, &body.username, &body.password))?;
    if !ok {
        warn!(username = %body.username, "failed admin login");
        return Err(AppError::Unauthorized);
    }

    let hours = state.config()?.security.admin_session_hours;
    let (token, session) = state.sessions.create(body.username.trim(), date::now(), hours)?;
    info!(admin = %session.admin_id, "admin logged in");

    let cookie = format!(
        "{SESSION_COOKIE}={token}; HttpOnly; Path=/; Max-Age={}",
        hours * 3600
    );
    let cookie = HeaderValue::from_str(&cookie).map_err(|e| AppError::Other(e.to_string()))?;

    let body = Json(json!({
        "success": true,
        "token": token,
        "expires_at": date::to_db(&session.expires_at),
    }));
    Ok(([(SET_COOKIE, cookie)], body).into_response())
}

pub async fn admin_logout(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    headers: HeaderMap,
) -> AppResult<Response> {
    if let Some(token) = session_token(&headers) {
        state.sessions.remove(&token)?;
    }
    info!(admin = %session.admin_id, "admin logged out");

    let expired = HeaderValue::from_static("session_id=; HttpOnly; Path=/; Max-Age=0");
    Ok(([(SET_COOKIE, expired)], Json(json!({"success": true}))).into_response())
}
