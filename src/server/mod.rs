//! HTTP surface used by the mobile app and the web panel.

pub mod auth;
pub mod handlers;
pub mod state;

use crate::errors::{AppError, AppResult};
use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use handlers::{auth as login, devices, email, logs, mobile, reports, shifts, workers};
use state::AppState;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Routes that need an admin session.
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/logout", post(login::admin_logout))
        .route("/admin/force-stop/{log_id}", post(shifts::force_stop))
        .route("/admin/emergency-end", post(shifts::emergency_end))
        .route("/api/work/emergency_end", post(shifts::emergency_end))
        .route("/admin/security-alerts", get(devices::security_alerts))
        .route("/admin/security-alerts/{id}/resolve", post(devices::resolve_alert))
        .route("/admin/access-logs", get(devices::access_logs))
        .route("/admin/logs", get(devices::admin_logs))
        .route("/device_logs", get(devices::device_logs))
        .route("/mobile-config", post(mobile::update_mobile_config))
        .route("/time-rounding-config", post(mobile::update_time_rounding))
        .route("/email-config", post(email::update_email_config))
        .route("/email-config/test", post(email::test_email))
        .route_layer(middleware::from_fn_with_state(state, auth::require_admin))
}

pub fn router(state: AppState) -> Router {
    let open = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // employees
        .route("/workers", get(workers::list).post(workers::create_worker))
        .route("/lista_pracownikow", get(workers::list))
        .route("/dodaj_pracownika", post(workers::create_worker))
        .route("/workers/{id}", axum::routing::delete(workers::delete))
        .route("/worker/{id}", get(workers::detail).put(workers::update_worker))
        .route("/worker/{id}/stats", get(workers::stats))
        .route("/employees", get(workers::list).post(workers::create_employee))
        .route("/employees/{id}", get(workers::get_employee).put(workers::update_employee))
        // credentials
        .route("/login", post(login::login))
        .route("/verify-pin", post(login::verify_pin))
        .route("/employee/by-pin/{pin}", get(login::employee_by_pin))
        .route("/admin/login", post(login::admin_login))
        // clock in / out
        .route("/start", post(shifts::start))
        .route("/start_shift", post(shifts::start))
        .route("/api/start", post(shifts::start))
        .route("/stop", post(shifts::stop))
        .route("/stop_shift", post(shifts::stop))
        .route("/api/stop", post(shifts::stop))
        // attendance logs
        .route("/logs", get(logs::list).post(logs::create))
        .route("/logs/batch", post(logs::batch))
        .route("/logs/{id}", get(logs::for_worker).patch(logs::patch).delete(logs::delete))
        .route("/shifts/{id}", get(logs::for_worker))
        // reports
        .route("/attendance_details", get(reports::attendance_details))
        .route("/api/attendance_details", get(reports::attendance_details))
        .route("/work_summary", get(reports::work_summary))
        .route("/attendance_summary", get(reports::attendance_summary))
        .route("/api/attendance_summary", get(reports::attendance_summary))
        .route("/attendance_by_date", get(reports::attendance_by_date))
        .route("/active_workers", get(reports::active_workers))
        .route("/api/active_workers", get(reports::active_workers))
        .route("/employees_without_logs", get(reports::employees_without_logs))
        .route("/api/employees_without_logs", get(reports::employees_without_logs))
        .route("/reports/export", get(reports::export))
        // mobile app
        .route("/mobile-config", get(mobile::mobile_config))
        .route("/api/mobile-config", get(mobile::mobile_config))
        .route("/config-version", get(mobile::config_version))
        .route("/app-version", get(mobile::app_version))
        .route("/app-version/check", post(mobile::check_app_version))
        .route("/time-rounding-config", get(mobile::time_rounding_config))
        // devices and statistics
        .route("/check_device", post(devices::check_device))
        .route("/statistics/verify-pin", post(devices::verify_stats_pin))
        .route("/statistics/worker/{id}", get(devices::worker_statistics))
        .route("/statistics/worker/{id}/period", post(devices::worker_period))
        // e-mail
        .route("/send-report-email", post(email::send_report))
        .route("/email-config", get(email::email_config));

    open.merge(admin_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, host: &str, port: u16) -> AppResult<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, router(state))
        .await
        .map_err(|e| AppError::Other(format!("server error: {e}")))
}
