use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use rattendance::core::workers::WorkerLogic;
use rattendance::server::router;
use serde_json::{Value, json};
use tower::ServiceExt;

mod common;
use common::test_state;

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>, axum::http::HeaderMap) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec(), headers)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let (status, bytes, _) = send(app, req).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn add_worker(app: &Router, id: &str, rate: f64, sunday: f64) {
    let (status, _) = call(
        app,
        "POST",
        "/workers",
        Some(json!({
            "id": id,
            "first_name": "Jan",
            "last_name": "Kowalski",
            "hourly_rate": rate,
            "rate_sunday": sunday,
            "pin": "1234",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

async fn admin_token(app: &Router) -> String {
    let (status, body) = call(
        app,
        "POST",
        "/admin/login",
        Some(json!({"username": "admin", "password": "s3cret"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_root_and_health() {
    let app = router(test_state("api_health"));

    let (status, body) = call(&app, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, _) = call(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_report_range_at_calendar_limit_is_rejected() {
    let app = router(test_state("api_date_limit"));
    add_worker(&app, "7", 30.0, 0.0).await;

    for uri in [
        "/attendance_summary?date_from=2025-01-01&date_to=%2B262142-12-31",
        "/work_summary?start_date=2025-01-01&end_date=%2B262142-12-31",
        "/attendance_by_date?date=%2B262142-12-31",
    ] {
        let (status, body) = call(&app, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["detail"].as_str().unwrap().contains("262142"), "{uri}");
    }

    // the database is still usable afterwards
    let (status, _) = call(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = call(&app, "GET", "/workers", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.to_string().contains("Kowalski"));
}

#[tokio::test]
async fn test_start_stop_shift() {
    let app = router(test_state("api_start_stop"));
    add_worker(&app, "7", 30.0, 0.0).await;

    let (status, body) = call(
        &app,
        "POST",
        "/start",
        Some(json!({
            "employee_id": "7",
            "czas_start": "2025-03-03 08:00:00",
            "lokalizacja_start": {"lat": 52.1, "lon": 21.0},
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "Shift started");

    // one open shift per worker
    let (status, body) = call(
        &app,
        "POST",
        "/api/start",
        Some(json!({"employee_id": "7", "czas_start": "2025-03-03 08:05:00"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("08:00"));

    let (status, body) = call(
        &app,
        "POST",
        "/stop",
        Some(json!({"employee_id": "7", "czas_stop": "2025-03-03 16:00:00"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "Shift stopped");
    assert_eq!(body["duration_min"], 480);

    let (status, body) = call(&app, "GET", "/logs/7", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_start_unknown_worker() {
    let app = router(test_state("api_unknown_worker"));

    let (status, body) = call(
        &app,
        "POST",
        "/start",
        Some(json!({"employee_id": "999", "czas_start": "2025-03-03 08:00:00"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Worker not found");
}

#[tokio::test]
async fn test_stop_without_open_shift_reports_expired_session() {
    let app = router(test_state("api_session_expired"));
    add_worker(&app, "7", 30.0, 0.0).await;

    let (status, body) = call(
        &app,
        "POST",
        "/stop_shift",
        Some(json!({"employee_id": "7", "czas_stop": "2025-03-03 16:00:00"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "session_expired");
}

#[tokio::test]
async fn test_sunday_shift_uses_sunday_rate() {
    let app = router(test_state("api_sunday"));
    add_worker(&app, "7", 30.0, 45.0).await;

    // 2025-03-09 is a Sunday
    let (status, _) = call(
        &app,
        "POST",
        "/logs",
        Some(json!({
            "worker_id": "7",
            "start_time": "2025-03-09 08:00:00",
            "stop_time": "2025-03-09 16:00:00",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &app,
        "GET",
        "/attendance_details?worker_id=7&date_from=2025-03-01&date_to=2025-03-31",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["logs"][0]["kwota"], 360.0);
    assert_eq!(body["summary"]["niedziele"], 1);
}

#[tokio::test]
async fn test_vacation_day_paid_at_average_rate() {
    let app = router(test_state("api_vacation"));
    add_worker(&app, "7", 30.0, 0.0).await;

    for (start, stop, holiday) in [
        ("2025-03-03 08:00:00", "2025-03-03 16:00:00", "nie"),
        ("2025-03-04 08:00:00", "2025-03-04 16:00:00", "tak"),
    ] {
        let (status, _) = call(
            &app,
            "POST",
            "/logs",
            Some(json!({
                "worker_id": "7",
                "start_time": start,
                "stop_time": stop,
                "is_holiday": holiday,
            })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = call(
        &app,
        "GET",
        "/attendance_details?worker_id=7&date_from=2025-03-01&date_to=2025-03-31",
        None,
        None,
    )
    .await;
    assert_eq!(body["summary"]["urlop_dni"], 1);
    assert_eq!(body["summary"]["urlop_kwota"], 240.0);
}

#[tokio::test]
async fn test_login_with_pin() {
    let app = router(test_state("api_login"));
    add_worker(&app, "7", 30.0, 0.0).await;

    let (status, body) = call(
        &app,
        "POST",
        "/login",
        Some(json!({"employee_id": "7", "pin": "1234"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["name"], "Jan Kowalski");

    let (_, body) = call(
        &app,
        "POST",
        "/login",
        Some(json!({"employee_id": "7", "pin": "9999"})),
        None,
    )
    .await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_mobile_config_and_version_check() {
    let app = router(test_state("api_mobile"));

    let (status, body) = call(&app, "GET", "/mobile-config", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["config"]["timer_enabled"], true);

    let (status, body) = call(
        &app,
        "POST",
        "/app-version/check",
        Some(json!({"current_version": "0.9.0"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["update_available"], true);
    assert_eq!(body["update_required"], true);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_admin_routes_require_session() {
    let state = test_state("api_admin");
    state
        .with_db(|conn| WorkerLogic::upsert_admin(conn, "admin", "Administrator", "s3cret", 1))
        .unwrap();
    let app = router(state);

    let (status, _) = call(&app, "GET", "/admin/security-alerts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(
        &app,
        "POST",
        "/admin/login",
        Some(json!({"username": "admin", "password": "wrong"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = admin_token(&app).await;
    let (status, body) = call(&app, "GET", "/admin/security-alerts", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    // GET /mobile-config is public, POST is not
    let (status, _) = call(
        &app,
        "POST",
        "/mobile-config",
        Some(json!({"daily_stats": true})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(
        &app,
        "POST",
        "/mobile-config",
        Some(json!({"daily_stats": true})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["config"]["daily_stats"], true);

    let (status, _) = call(&app, "POST", "/admin/logout", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, "GET", "/admin/access-logs", None, Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_force_stop_closes_open_shift() {
    let state = test_state("api_force_stop");
    state
        .with_db(|conn| WorkerLogic::upsert_admin(conn, "admin", "Administrator", "s3cret", 1))
        .unwrap();
    let app = router(state);
    add_worker(&app, "7", 30.0, 0.0).await;

    let (_, body) = call(
        &app,
        "POST",
        "/start",
        Some(json!({"employee_id": "7", "czas_start": "2025-03-03 08:00:00"})),
        None,
    )
    .await;
    let id = body["id"].as_i64().unwrap();

    let token = admin_token(&app).await;
    let (status, body) = call(&app, "POST", &format!("/admin/force-stop/{id}"), None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(!body["log"]["stop_time"].is_null());

    let (status, _) = call(&app, "POST", &format!("/admin/force-stop/{id}"), None, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_report_export_download() {
    let app = router(test_state("api_export"));
    add_worker(&app, "7", 30.0, 0.0).await;
    call(
        &app,
        "POST",
        "/logs",
        Some(json!({
            "worker_id": "7",
            "start_time": "2025-03-03 08:00:00",
            "stop_time": "2025-03-03 16:00:00",
        })),
        None,
    )
    .await;

    let req = Request::builder()
        .uri("/reports/export?report=summary&format=csv&date_from=2025-03-01&date_to=2025-03-31")
        .body(Body::empty())
        .unwrap();
    let (status, bytes, headers) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[CONTENT_TYPE].to_str().unwrap().starts_with("text/csv"));
    assert!(
        headers[CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("Raport_summary_2025-03-01_2025-03-31.csv")
    );
    assert!(String::from_utf8_lossy(&bytes).contains("Jan Kowalski"));

    let req = Request::builder()
        .uri("/reports/export?report=summary&format=docx&date_from=2025-03-01&date_to=2025-03-31")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
