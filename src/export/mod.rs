//! Report files: attendance reports rendered as CSV, JSON, XLSX or PDF,
//! either as bytes for an HTTP download or written to a file by the CLI.

mod delimited;
mod excel_date;
mod fs_utils;
pub mod logic;
mod model;
mod pdf;
pub mod range;
mod xlsx;

pub use logic::{ExportLogic, ExportRequest};
pub use model::ReportTable;

use crate::errors::AppError;
use crate::ui::messages::success;
use clap::ValueEnum;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

pub(crate) fn notify_export_success(label: &str, path: &Path) {
    success(format!("{label} export completed: {}", path.display()));
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(AppError::InvalidExportFormat(other.to_string())),
        }
    }
}

/// Which report to export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Presence per employee
    Summary,
    /// Priced shifts of one worker
    Details,
    /// Every shift of one day
    Daily,
    /// Payroll totals per employee
    Payroll,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Summary => "summary",
            ReportKind::Details => "details",
            ReportKind::Daily => "daily",
            ReportKind::Payroll => "payroll",
        }
    }
}

impl FromStr for ReportKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summary" => Ok(ReportKind::Summary),
            "details" => Ok(ReportKind::Details),
            "daily" => Ok(ReportKind::Daily),
            "payroll" => Ok(ReportKind::Payroll),
            other => Err(AppError::BadRequest(format!("Unknown report type: {other}"))),
        }
    }
}
