use crate::core::statistics::worker_stats;
use crate::core::workers::{WorkerDetail, WorkerLogic, WorkerUpdate, WorkerView};
use crate::models::{NewEmployee, Rates};
use crate::errors::AppResult;
use crate::server::state::AppState;
use crate::utils::date;
use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Value, json};

pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<WorkerView>>> {
    Ok(Json(state.with_db(WorkerLogic::list)?))
}

#[derive(Debug, Deserialize)]
pub struct WorkerCreate {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(flatten)]
    pub rates: Rates,
    #[serde(default)]
    pub pin: Option<String>,
}

pub async fn create_worker(State(state): State<AppState>, Json(body): Json<WorkerCreate>) -> AppResult<Json<WorkerView>> {
    let iterations = state.config()?.security.password_iterations;
    let new = NewEmployee {
        id: body.id,
        name: format!("{} {}", body.first_name.trim(), body.last_name.trim()).trim().to_string(),
        rates: body.rates,
        pin: body.pin,
    };
    Ok(Json(state.with_db(|conn| WorkerLogic::create(conn, &new, iterations))?))
}

#[derive(Debug, Deserialize)]
pub struct EmployeeCreate {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub rates: Rates,
    #[serde(default)]
    pub pin: Option<String>,
}

pub async fn create_employee(State(state): State<AppState>, Json(body): Json<EmployeeCreate>) -> AppResult<Json<WorkerView>> {
    let iterations = state.config()?.security.password_iterations;
    let new = NewEmployee {
        id: body.id,
        name: body.name.trim().to_string(),
        rates: body.rates,
        pin: body.pin,
    };
    Ok(Json(state.with_db(|conn| WorkerLogic::create(conn, &new, iterations))?))
}

pub async fn detail(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<WorkerDetail>> {
    Ok(Json(state.with_db(|conn| WorkerLogic::detail(conn, &id))?))
}

pub async fn get_employee(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<WorkerView>> {
    Ok(Json(state.with_db(|conn| WorkerLogic::get(conn, &id))?))
}

#[derive(Debug, Deserialize)]
pub struct WorkerPut {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub rate: f64,
    pub rate_saturday: Option<f64>,
    pub rate_sunday: Option<f64>,
    pub rate_night: Option<f64>,
    pub rate_overtime: Option<f64>,
    pub pin: Option<String>,
    pub new_id: Option<String>,
}

pub async fn update_worker(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<WorkerPut>,
) -> AppResult<Json<Value>> {
    let iterations = state.config()?.security.password_iterations;
    let upd = WorkerUpdate {
        first_name: body.first_name,
        last_name: body.last_name,
        rate: body.rate,
        rate_saturday: body.rate_saturday,
        rate_sunday: body.rate_sunday,
        rate_night: body.rate_night,
        rate_overtime: body.rate_overtime,
        pin: body.pin.filter(|p| !p.trim().is_empty()),
        new_id: body.new_id.filter(|n| !n.trim().is_empty()),
    };
    state.with_db(|conn| WorkerLogic::update(conn, &id, &upd, iterations))?;
    Ok(Json(json!({"msg": "Worker updated"})))
}

#[derive(Debug, Deserialize)]
pub struct EmployeePut {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub rate: f64,
}

pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<EmployeePut>,
) -> AppResult<Json<Value>> {
    state.with_db(|conn| WorkerLogic::update_basic(conn, &id, &body.first_name, &body.last_name, body.rate))?;
    Ok(Json(json!({"msg": "Employee updated"})))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<Value>> {
    state.with_db(|conn| WorkerLogic::delete(conn, &id))?;
    Ok(Json(json!({"msg": "Usunięto pracownika"})))
}

pub async fn stats(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<Value>> {
    let data = state.with_db(|conn| worker_stats(conn, &id, date::today()))?;
    Ok(Json(json!({"success": true, "data": data})))
}
