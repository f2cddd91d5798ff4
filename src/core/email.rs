//! Report delivery over SMTP (STARTTLS).

use crate::config::EmailConfig;
use crate::errors::{AppError, AppResult};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDateTime;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmailValidation {
    pub valid: bool,
    pub issues: Vec<String>,
}

pub fn validate_email_config(cfg: &EmailConfig) -> EmailValidation {
    if !cfg.enabled {
        return EmailValidation {
            valid: false,
            issues: vec!["Email service is disabled".into()],
        };
    }

    let mut issues = Vec::new();
    if cfg.smtp_username.trim().is_empty() {
        issues.push("SMTP username is not configured".to_string());
    }
    if cfg.smtp_password.is_empty() {
        issues.push("SMTP password is not configured".to_string());
    }
    if cfg.sender_email.trim().is_empty() {
        issues.push("Sender email is not configured".to_string());
    }
    if cfg.smtp_server.trim().is_empty() {
        issues.push("SMTP server is not configured".to_string());
    }

    EmailValidation {
        valid: issues.is_empty(),
        issues,
    }
}

fn ensure_valid(cfg: &EmailConfig) -> AppResult<()> {
    if !cfg.enabled {
        return Err(AppError::EmailDisabled);
    }
    let v = validate_email_config(cfg);
    if !v.valid {
        return Err(AppError::EmailConfig(v.issues.join(", ")));
    }
    Ok(())
}

/// Public part of the e-mail settings.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmailConfigView {
    pub enabled: bool,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender_name: String,
    pub sender_email: String,
    pub configured: bool,
}

impl From<&EmailConfig> for EmailConfigView {
    fn from(c: &EmailConfig) -> Self {
        Self {
            enabled: c.enabled,
            smtp_server: c.smtp_server.clone(),
            smtp_port: c.smtp_port,
            sender_name: c.sender_name.clone(),
            sender_email: c.sender_email.clone(),
            configured: !c.smtp_username.is_empty() && !c.smtp_password.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailConfigUpdate {
    pub enabled: Option<bool>,
    pub sender_name: Option<String>,
    pub sender_email: Option<String>,
    pub smtp_server: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfigUpdate {
    pub fn apply(self, cfg: &mut EmailConfig) {
        if let Some(v) = self.enabled {
            cfg.enabled = v;
        }
        if let Some(v) = self.sender_name {
            cfg.sender_name = v;
        }
        if let Some(v) = self.sender_email {
            cfg.sender_email = v;
        }
        if let Some(v) = self.smtp_server {
            cfg.smtp_server = v;
        }
        if let Some(v) = self.smtp_port {
            cfg.smtp_port = v;
        }
        if let Some(v) = self.smtp_username {
            cfg.smtp_username = v;
        }
        if let Some(v) = self.smtp_password {
            cfg.smtp_password = v;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportEmailRequest {
    pub to_email: String,
    pub subject: String,
    pub report_type: String,
    /// Base64 encoded file.
    pub report_data: String,
    #[serde(default)]
    pub employee_name: Option<String>,
    #[serde(default)]
    pub date_range: Option<String>,
}

fn extension(report_type: &str) -> &'static str {
    if report_type.eq_ignore_ascii_case("pdf") {
        "pdf"
    } else {
        "csv"
    }
}

/// `Raport_<employee>_<YYYY-MM-DD_HH-MM>.<ext>`
pub fn attachment_filename(employee_name: Option<&str>, report_type: &str, now: NaiveDateTime) -> String {
    let ts = now.format("%Y-%m-%d_%H-%M");
    let ext = extension(report_type);
    match employee_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("Raport_{name}_{ts}.{ext}"),
        None => format!("Raport_obecnosci_{ts}.{ext}"),
    }
}

pub fn report_body_html(req: &ReportEmailRequest, filename: &str, now: NaiveDateTime) -> String {
    let mut items = format!(
        "<li><strong>Typ raportu:</strong> {}</li>",
        req.report_type.to_uppercase()
    );
    if let Some(name) = req.employee_name.as_deref().filter(|s| !s.is_empty()) {
        items.push_str(&format!("<li><strong>Pracownik:</strong> {name}</li>"));
    }
    if let Some(range) = req.date_range.as_deref().filter(|s| !s.is_empty()) {
        items.push_str(&format!("<li><strong>Okres:</strong> {range}</li>"));
    }
    items.push_str(&format!(
        "<li><strong>Data wygenerowania:</strong> {}</li>",
        now.format("%d.%m.%Y %H:%M")
    ));

    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Raport Lista Obecności</title></head>\
         <body style=\"font-family: Arial, sans-serif; color: #333;\">\
         <h2>Raport Lista Obecności</h2>\
         <p>W załączeniu przesyłamy raport wygenerowany z systemu Lista Obecności.</p>\
         <h3>Szczegóły raportu:</h3><ul>{items}</ul>\
         <p><strong>Załącznik:</strong> {filename}</p>\
         <p style=\"font-size: 12px; color: #666;\">Wiadomość została wygenerowana automatycznie. \
         Nie odpowiadaj na ten email.</p></body></html>"
    )
}

fn sender(cfg: &EmailConfig) -> AppResult<Mailbox> {
    let address = cfg
        .sender_email
        .parse()
        .map_err(|e| AppError::EmailConfig(format!("sender_email: {e}")))?;
    Ok(Mailbox::new(Some(cfg.sender_name.clone()), address))
}

/// Build the report message. Returns it with the attachment name.
pub fn build_report_message(
    cfg: &EmailConfig,
    req: &ReportEmailRequest,
    now: NaiveDateTime,
) -> AppResult<(Message, String)> {
    let bytes = STANDARD.decode(req.report_data.trim())?;
    let filename = attachment_filename(req.employee_name.as_deref(), &req.report_type, now);

    let mime = if extension(&req.report_type) == "pdf" {
        "application/pdf"
    } else {
        "text/csv; charset=utf-8"
    };
    let content_type = ContentType::parse(mime).map_err(|e| AppError::Email(e.to_string()))?;

    let to: Mailbox = req
        .to_email
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Niepoprawny adres email: {}", req.to_email)))?;

    let message = Message::builder()
        .from(sender(cfg)?)
        .to(to)
        .subject(req.subject.clone())
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::html(report_body_html(req, &filename, now)))
                .singlepart(Attachment::new(filename.clone()).body(bytes, content_type)),
        )
        .map_err(|e| AppError::Email(format!("Failed to build email: {e}")))?;

    Ok((message, filename))
}

fn transport(cfg: &EmailConfig) -> AppResult<AsyncSmtpTransport<Tokio1Executor>> {
    let creds = Credentials::new(cfg.smtp_username.clone(), cfg.smtp_password.clone());
    Ok(
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.smtp_server)
            .map_err(|e| AppError::Email(format!("SMTP relay error: {e}")))?
            .port(cfg.smtp_port)
            .credentials(creds)
            .build(),
    )
}

/// Send a report. Returns the attachment name.
pub async fn send_report(cfg: &EmailConfig, req: &ReportEmailRequest, now: NaiveDateTime) -> AppResult<String> {
    ensure_valid(cfg)?;
    let (message, filename) = build_report_message(cfg, req, now)?;

    transport(cfg)?.send(message).await.map_err(|e| {
        error!(to = %req.to_email, "email delivery failed: {e}");
        AppError::Email(e.to_string())
    })?;

    info!(to = %req.to_email, file = %filename, "report email sent");
    Ok(filename)
}

/// Connect and authenticate without sending anything.
pub async fn test_connection(cfg: &EmailConfig) -> AppResult<bool> {
    ensure_valid(cfg)?;
    transport(cfg)?
        .test_connection()
        .await
        .map_err(|e| AppError::Email(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::date::parse_datetime;

    fn enabled() -> EmailConfig {
        EmailConfig {
            enabled: true,
            smtp_username: "user".into(),
            smtp_password: "secret".into(),
            sender_email: "biuro@example.com".into(),
            ..EmailConfig::default()
        }
    }

    fn request(data: &str) -> ReportEmailRequest {
        ReportEmailRequest {
            to_email: "szef@example.com".into(),
            subject: "Raport".into(),
            report_type: "pdf".into(),
            report_data: data.into(),
            employee_name: Some("Jan Kowalski".into()),
            date_range: Some("2025-03-01 - 2025-03-31".into()),
        }
    }

    #[test]
    fn disabled_config_reports_single_issue() {
        let v = validate_email_config(&EmailConfig::default());
        assert!(!v.valid);
        assert_eq!(v.issues, vec!["Email service is disabled".to_string()]);
    }

    #[test]
    fn missing_fields_are_listed() {
        let cfg = EmailConfig {
            enabled: true,
            ..EmailConfig::default()
        };
        let v = validate_email_config(&cfg);
        assert_eq!(v.issues.len(), 3);
        assert!(validate_email_config(&enabled()).valid);
    }

    #[test]
    fn filename_follows_employee_and_type() {
        let now = parse_datetime("2025-03-31 17:45").unwrap();
        assert_eq!(
            attachment_filename(Some("Jan Kowalski"), "PDF", now),
            "Raport_Jan Kowalski_2025-03-31_17-45.pdf"
        );
        assert_eq!(
            attachment_filename(None, "excel", now),
            "Raport_obecnosci_2025-03-31_17-45.csv"
        );
    }

    #[test]
    fn message_carries_attachment() {
        let now = parse_datetime("2025-03-31 17:45").unwrap();
        let data = STANDARD.encode(b"%PDF-1.7 test");
        let (msg, name) = build_report_message(&enabled(), &request(&data), now).unwrap();
        assert!(name.ends_with(".pdf"));

        let raw = String::from_utf8_lossy(&msg.formatted()).to_string();
        assert!(raw.contains("application/pdf"));
        assert!(raw.contains("szef@example.com"));
    }

    #[test]
    fn bad_base64_is_rejected() {
        let now = parse_datetime("2025-03-31 17:45").unwrap();
        assert!(matches!(
            build_report_message(&enabled(), &request("***"), now),
            Err(AppError::Base64(_))
        ));
    }

    #[test]
    fn public_view_hides_secrets() {
        let view = EmailConfigView::from(&enabled());
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("secret"));
        assert!(view.configured);
    }
}
