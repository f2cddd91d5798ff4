use crate::core::calculator::{AttendanceDetails, DetailItem};
use crate::core::reports::{DailyRow, SummaryRow, WorkSummaryRow};
use crate::errors::AppResult;
use serde_json::Value;

/// Flat table every exporter renders: one title, one header row, string cells.
/// `json` keeps the typed rows for the JSON format.
#[derive(Debug, Clone)]
pub struct ReportTable {
    pub title: String,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
    pub json: Value,
}

impl ReportTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn money(v: f64) -> String {
    format!("{v:.2}")
}

fn coord(v: Option<f64>) -> String {
    v.map(|c| format!("{c:.6}")).unwrap_or_default()
}

pub(crate) const SUMMARY_HEADERS: [&str; 9] = [
    "ID",
    "Imię i nazwisko",
    "Stawka",
    "Dni obecności",
    "Czas pracy",
    "Godziny",
    "Soboty",
    "Niedziele",
    "Święta",
];

pub(crate) fn summary_table(title: String, rows: &[SummaryRow]) -> AppResult<ReportTable> {
    Ok(ReportTable {
        title,
        headers: SUMMARY_HEADERS.to_vec(),
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    r.id.clone(),
                    r.name.clone(),
                    money(r.rate),
                    r.days_present.to_string(),
                    r.total_time.clone(),
                    money(r.total_hours),
                    r.saturdays.to_string(),
                    r.sundays.to_string(),
                    r.holidays.to_string(),
                ]
            })
            .collect(),
        json: serde_json::to_value(rows)?,
    })
}

pub(crate) const DETAILS_HEADERS: [&str; 9] = [
    "Data",
    "Pracownik",
    "Start",
    "Stop",
    "Czas",
    "Typ",
    "Godziny nocne",
    "Nadgodziny",
    "Kwota",
];

fn detail_row(d: &DetailItem) -> Vec<String> {
    vec![
        d.date.clone(),
        d.name.clone(),
        d.start.clone(),
        d.stop.clone(),
        d.duration.clone(),
        d.typ.code().to_string(),
        money(d.night_hours),
        money(d.overtime_hours),
        money(d.kwota),
    ]
}

/// Shift rows followed by one total line.
pub(crate) fn details_table(title: String, details: &AttendanceDetails) -> AppResult<ReportTable> {
    let mut rows: Vec<Vec<String>> = details.logs.iter().map(detail_row).collect();
    if !rows.is_empty() {
        let s = &details.summary;
        rows.push(vec![
            "RAZEM".into(),
            format!("{} dni", s.dni),
            String::new(),
            String::new(),
            format!("{:.2} h", s.godziny),
            String::new(),
            money(s.godziny_nocne),
            money(s.godziny_nadliczbowe),
            money(s.kwota + s.urlop_kwota + s.chorobowe_kwota),
        ]);
    }

    Ok(ReportTable {
        title,
        headers: DETAILS_HEADERS.to_vec(),
        rows,
        json: serde_json::to_value(details)?,
    })
}

pub(crate) const DAILY_HEADERS: [&str; 8] = [
    "ID",
    "Pracownik",
    "Imię i nazwisko",
    "Start",
    "Stop",
    "Czas",
    "Lokalizacja start",
    "Lokalizacja stop",
];

pub(crate) fn daily_table(title: String, rows: &[DailyRow]) -> AppResult<ReportTable> {
    let place = |lat: Option<f64>, lon: Option<f64>| match (lat, lon) {
        (Some(_), Some(_)) => format!("{}, {}", coord(lat), coord(lon)),
        _ => String::new(),
    };

    Ok(ReportTable {
        title,
        headers: DAILY_HEADERS.to_vec(),
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    r.log_id.to_string(),
                    r.worker_id.clone(),
                    r.name.clone(),
                    r.start.clone(),
                    r.stop.clone(),
                    r.duration.clone(),
                    place(r.start_lat, r.start_lon),
                    place(r.stop_lat, r.stop_lon),
                ]
            })
            .collect(),
        json: serde_json::to_value(rows)?,
    })
}

pub(crate) const PAYROLL_HEADERS: [&str; 13] = [
    "ID",
    "Imię",
    "Nazwisko",
    "Dni",
    "Godziny",
    "Kwota zwykłe",
    "Kwota soboty",
    "Kwota niedziele",
    "Kwota święta",
    "Urlop",
    "Chorobowe",
    "Nadgodziny",
    "Razem",
];

pub(crate) fn payroll_table(title: String, rows: &[WorkSummaryRow]) -> AppResult<ReportTable> {
    Ok(ReportTable {
        title,
        headers: PAYROLL_HEADERS.to_vec(),
        rows: rows
            .iter()
            .map(|r| {
                let s = &r.summary;
                vec![
                    r.id.clone(),
                    r.imie.clone(),
                    r.nazwisko.clone(),
                    s.dni.to_string(),
                    money(s.godziny),
                    money(s.kwota_zwykle),
                    money(s.kwota_soboty),
                    money(s.kwota_niedziele),
                    money(s.kwota_swieta),
                    money(s.urlop_kwota),
                    money(s.chorobowe_kwota),
                    money(s.godziny_nadliczbowe),
                    money(s.kwota + s.urlop_kwota + s.chorobowe_kwota),
                ]
            })
            .collect(),
        json: serde_json::to_value(rows)?,
    })
}
