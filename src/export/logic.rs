use crate::config::PayrollConfig;
use crate::core::reports;
use crate::errors::{AppError, AppResult};
use crate::export::fs_utils::{ensure_writable, write_bytes};
use crate::export::model::{ReportTable, daily_table, details_table, payroll_table, summary_table};
use crate::export::range::period_label;
use crate::export::{ExportFormat, ReportKind, delimited, notify_export_success, pdf, xlsx};
use crate::ui::messages::{info, warning};
use chrono::NaiveDate;
use rusqlite::Connection;
use std::path::Path;
use tracing::info as trace_info;

/// What to export. `daily` reads `from` as its day; `details` needs a worker.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub kind: ReportKind,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub worker_id: Option<String>,
}

pub struct ExportLogic;

impl ExportLogic {
    /// Run the report query and flatten it into a table.
    pub fn build(conn: &Connection, payroll: &PayrollConfig, req: &ExportRequest) -> AppResult<ReportTable> {
        let period = period_label(req.from, req.to);

        match req.kind {
            ReportKind::Summary => {
                let rows = reports::attendance_summary(conn, req.from, req.to)?;
                summary_table(format!("Lista obecności - {period}"), &rows)
            }
            ReportKind::Details => {
                let worker = req
                    .worker_id
                    .as_deref()
                    .filter(|w| !w.trim().is_empty())
                    .ok_or_else(|| AppError::BadRequest("worker_id is required for details".into()))?;
                let details = reports::attendance_details(conn, payroll, worker, req.from, req.to)?;
                details_table(format!("Obecności pracownika {worker} - {period}"), &details)
            }
            ReportKind::Daily => {
                let rows = reports::attendance_by_date(conn, req.from)?;
                daily_table(format!("Obecności w dniu {}", req.from), &rows)
            }
            ReportKind::Payroll => {
                let rows = reports::work_summary(conn, payroll, req.from, req.to)?;
                payroll_table(format!("Zestawienie płac - {period}"), &rows)
            }
        }
    }

    pub fn render(table: &ReportTable, format: ExportFormat) -> AppResult<Vec<u8>> {
        match format {
            ExportFormat::Csv => delimited::to_csv(table),
            ExportFormat::Json => delimited::to_json(table),
            ExportFormat::Xlsx => xlsx::to_xlsx(table),
            ExportFormat::Pdf => Ok(pdf::to_pdf(table)),
        }
    }

    /// `Raport_<kind>_<from>_<to>.<ext>` for downloads.
    pub fn filename(req: &ExportRequest, format: ExportFormat) -> String {
        let span = if req.from == req.to {
            req.from.to_string()
        } else {
            format!("{}_{}", req.from, req.to)
        };
        match &req.worker_id {
            Some(w) if req.kind == ReportKind::Details => {
                format!("Raport_{}_{w}_{span}.{}", req.kind.as_str(), format.as_str())
            }
            _ => format!("Raport_{}_{span}.{}", req.kind.as_str(), format.as_str()),
        }
    }

    /// Render to bytes for an HTTP response.
    pub fn export_bytes(
        conn: &Connection,
        payroll: &PayrollConfig,
        req: &ExportRequest,
        format: ExportFormat,
    ) -> AppResult<(Vec<u8>, String)> {
        let table = Self::build(conn, payroll, req)?;
        let bytes = Self::render(&table, format)?;
        trace_info!(
            report = req.kind.as_str(),
            format = format.as_str(),
            rows = table.rows.len(),
            "report exported"
        );
        Ok((bytes, Self::filename(req, format)))
    }

    /// Render to `file`, asking before overwriting unless `force`.
    /// Returns false when the report had no rows and nothing was written.
    pub fn export_file(
        conn: &Connection,
        payroll: &PayrollConfig,
        req: &ExportRequest,
        format: ExportFormat,
        file: &Path,
        force: bool,
    ) -> AppResult<bool> {
        let table = Self::build(conn, payroll, req)?;
        if table.is_empty() {
            warning("No data found for the selected range.");
            return Ok(false);
        }

        ensure_writable(file, force)?;
        info(format!(
            "Exporting {} report to {}: {}",
            req.kind.as_str(),
            format.as_str().to_uppercase(),
            file.display()
        ));

        write_bytes(file, &Self::render(&table, format)?)?;
        notify_export_success(&format.as_str().to_uppercase(), file);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;
    use crate::db::log::ttlog;
    use crate::utils::date::parse_datetime;

    fn seeded() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        conn.execute(
            "INSERT INTO employees (id, name, hourly_rate) VALUES ('7', 'Jan Kowalski', 30.0)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO attendance_logs (worker_id, start_time, stop_time, duration_min)
             VALUES ('7', '2025-03-03 08:00:00', '2025-03-03 16:00:00', 480)",
            [],
        )
        .unwrap();
        ttlog(&conn, "test", "", "seeded").unwrap();
        conn
    }

    fn req(kind: ReportKind, worker: Option<&str>) -> ExportRequest {
        let d = |s: &str| parse_datetime(&format!("{s} 00:00:00")).unwrap().date();
        ExportRequest {
            kind,
            from: d("2025-03-01"),
            to: d("2025-03-31"),
            worker_id: worker.map(str::to_string),
        }
    }

    #[test]
    fn summary_csv_has_polish_headers() {
        let conn = seeded();
        let (bytes, name) = ExportLogic::export_bytes(
            &conn,
            &PayrollConfig::default(),
            &req(ReportKind::Summary, None),
            ExportFormat::Csv,
        )
        .unwrap();

        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("ID;Imię i nazwisko;Stawka"));
        assert!(text.contains("7;Jan Kowalski;30.00;1;8h 0min;8.00;0;0;0"));
        assert_eq!(name, "Raport_summary_2025-03-01_2025-03-31.csv");
    }

    #[test]
    fn details_needs_a_worker_and_totals_the_period() {
        let conn = seeded();
        let payroll = PayrollConfig::default();
        assert!(ExportLogic::build(&conn, &payroll, &req(ReportKind::Details, None)).is_err());

        let table = ExportLogic::build(&conn, &payroll, &req(ReportKind::Details, Some("7"))).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][0], "RAZEM");
        assert_eq!(table.rows[1][8], "240.00");
    }

    #[test]
    fn payroll_json_keeps_typed_fields() {
        let conn = seeded();
        let (bytes, _) = ExportLogic::export_bytes(
            &conn,
            &PayrollConfig::default(),
            &req(ReportKind::Payroll, None),
            ExportFormat::Json,
        )
        .unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v[0]["imie"], "Jan");
        assert_eq!(v[0]["kwota_zwykle"], 240.0);
    }
}
