use crate::core::calculator::AttendanceDetails;
use crate::core::reports::{
    self, ActiveWorker, DailyRow, EmployeeRef, SummaryRow, WorkSummaryRow,
};
use crate::errors::{AppError, AppResult};
use crate::export::{ExportFormat, ExportLogic, ExportRequest, ReportKind};
use crate::server::state::AppState;
use crate::utils::date::{self, parse_date};
use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderValue;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct DateRange {
    pub date_from: String,
    pub date_to: String,
}

impl DateRange {
    fn parse(&self) -> AppResult<(NaiveDate, NaiveDate)> {
        Ok((parse_date(&self.date_from)?, parse_date(&self.date_to)?))
    }
}

#[derive(Debug, Deserialize)]
pub struct DetailsQuery {
    pub worker_id: String,
    pub date_from: String,
    pub date_to: String,
}

pub async fn attendance_details(
    State(state): State<AppState>,
    Query(q): Query<DetailsQuery>,
) -> AppResult<Json<AttendanceDetails>> {
    let (from, to) = (parse_date(&q.date_from)?, parse_date(&q.date_to)?);
    let payroll = state.config()?.payroll;
    Ok(Json(state.with_db(|conn| {
        reports::attendance_details(conn, &payroll, q.worker_id.trim(), from, to)
    })?))
}

#[derive(Debug, Deserialize)]
pub struct WorkSummaryQuery {
    pub start_date: String,
    pub end_date: String,
}

pub async fn work_summary(
    State(state): State<AppState>,
    Query(q): Query<WorkSummaryQuery>,
) -> AppResult<Json<Vec<WorkSummaryRow>>> {
    let (from, to) = (parse_date(&q.start_date)?, parse_date(&q.end_date)?);
    let payroll = state.config()?.payroll;
    Ok(Json(state.with_db(|conn| reports::work_summary(conn, &payroll, from, to))?))
}

pub async fn attendance_summary(
    State(state): State<AppState>,
    Query(q): Query<DateRange>,
) -> AppResult<Json<Vec<SummaryRow>>> {
    let (from, to) = q.parse()?;
    Ok(Json(state.with_db(|conn| reports::attendance_summary(conn, from, to))?))
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: String,
}

pub async fn attendance_by_date(
    State(state): State<AppState>,
    Query(q): Query<DayQuery>,
) -> AppResult<Json<Vec<DailyRow>>> {
    let day = parse_date(&q.date)?;
    Ok(Json(state.with_db(|conn| reports::attendance_by_date(conn, day))?))
}

pub async fn active_workers(State(state): State<AppState>) -> AppResult<Json<Vec<ActiveWorker>>> {
    Ok(Json(state.with_db(|conn| reports::active_workers(conn, date::now()))?))
}

pub async fn employees_without_logs(
    State(state): State<AppState>,
    Query(q): Query<DateRange>,
) -> AppResult<Json<Vec<EmployeeRef>>> {
    let (from, to) = q.parse()?;
    Ok(Json(state.with_db(|conn| reports::employees_without_logs(conn, from, to))?))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub report: String,
    #[serde(default)]
    pub format: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub date: Option<String>,
    pub worker_id: Option<String>,
}

/// Report download. `daily` takes `date`; the others a `date_from`/`date_to`
/// pair, defaulting to the current month.
pub async fn export(State(state): State<AppState>, Query(q): Query<ExportQuery>) -> AppResult<Response> {
    let kind: ReportKind = q.report.parse()?;
    let format: ExportFormat = q.format.as_deref().unwrap_or("csv").parse()?;

    let (from, to) = match (kind, &q.date, &q.date_from, &q.date_to) {
        (ReportKind::Daily, Some(d), _, _) => {
            let d = parse_date(d)?;
            (d, d)
        }
        (ReportKind::Daily, None, _, _) => {
            return Err(AppError::BadRequest("date is required for the daily report".into()));
        }
        (_, _, Some(f), Some(t)) => (parse_date(f)?, parse_date(t)?),
        _ => crate::export::range::parse_range(None, date::today())?,
    };

    let req = ExportRequest {
        kind,
        from,
        to,
        worker_id: q.worker_id,
    };
    let payroll = state.config()?.payroll;
    let (bytes, filename) = state.with_db(|conn| ExportLogic::export_bytes(conn, &payroll, &req, format))?;

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(|e| AppError::Export(e.to_string()))?;
    Ok((
        [
            (CONTENT_TYPE, HeaderValue::from_static(format.content_type())),
            (CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
