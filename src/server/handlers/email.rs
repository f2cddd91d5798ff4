use crate::core::email::{
    self, EmailConfigUpdate, EmailConfigView, ReportEmailRequest, validate_email_config,
};
use crate::errors::{AppError, AppResult};
use crate::server::state::AppState;
use crate::utils::date;
use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};
use tracing::{info, warn};

pub async fn send_report(State(state): State<AppState>, Json(body): Json<ReportEmailRequest>) -> AppResult<Json<Value>> {
    let cfg = state.config()?.email;
    let filename = email::send_report(&cfg, &body, date::now()).await?;
    info!(to = %body.to_email, %filename, "report e-mail sent");
    Ok(Json(json!({
        "success": true,
        "message": format!("Raport został wysłany na adres {}", body.to_email),
        "filename": filename,
    })))
}

pub async fn email_config(State(state): State<AppState>) -> AppResult<Json<EmailConfigView>> {
    Ok(Json(EmailConfigView::from(&state.config()?.email)))
}

pub async fn update_email_config(
    State(state): State<AppState>,
    Json(body): Json<EmailConfigUpdate>,
) -> AppResult<Json<EmailConfigView>> {
    let view = state.update_config(|cfg| {
        body.apply(&mut cfg.email);
        Ok(EmailConfigView::from(&cfg.email))
    })?;
    info!(enabled = view.enabled, "email configuration updated");
    Ok(Json(view))
}

pub async fn test_email(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let cfg = state.config()?.email;
    let check = validate_email_config(&cfg);
    if !check.valid {
        return Ok(Json(json!({"success": false, "message": check.issues.join(", ")})));
    }

    match email::test_connection(&cfg).await {
        Ok(true) => Ok(Json(json!({"success": true, "message": "Połączenie z serwerem SMTP działa"}))),
        Ok(false) => Ok(Json(json!({"success": false, "message": "Serwer SMTP odrzucił połączenie"}))),
        Err(AppError::Email(e)) => {
            warn!(error = %e, "SMTP connection test failed");
            Ok(Json(json!({"success": false, "message": e})))
        }
        Err(e) => Err(e),
    }
}
