//! Typed sections of the YAML configuration file.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing_subscriber::{EnvFilter, fmt};

// ---------------------------
// server
// ---------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ---------------------------
// logging
// ---------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_level() -> String {
    "info".to_string()
}
fn default_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

impl LoggingConfig {
    /// Install the global tracing subscriber. `RUST_LOG` wins over `level`.
    /// A second call is a no-op.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let _ = match self.format.as_str() {
            "json" => fmt().json().with_env_filter(filter).try_init(),
            _ => fmt().with_env_filter(filter).try_init(),
        };
    }
}

// ---------------------------
// mobile
// ---------------------------

/// Feature switches fetched by the mobile app at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MobileConfig {
    #[serde(default = "yes")]
    pub timer_enabled: bool,
    #[serde(default)]
    pub daily_stats: bool,
    #[serde(default)]
    pub monthly_stats: bool,
    #[serde(default = "yes")]
    pub field_blocking: bool,
    #[serde(default = "yes")]
    pub gps_verification: bool,
    #[serde(default)]
    pub widget_support: bool,
    #[serde(default)]
    pub notifications: bool,
    #[serde(default = "yes")]
    pub offline_mode: bool,
    #[serde(default = "yes")]
    pub debug_mode: bool,
    #[serde(default)]
    pub auto_updates: bool,
    #[serde(default, rename = "forceUpdate")]
    pub force_update: bool,

    /// Keys added by newer admin panels are kept as-is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn yes() -> bool {
    true
}

impl Default for MobileConfig {
    fn default() -> Self {
        Self {
            timer_enabled: true,
            daily_stats: false,
            monthly_stats: false,
            field_blocking: true,
            gps_verification: true,
            widget_support: false,
            notifications: false,
            offline_mode: true,
            debug_mode: true,
            auto_updates: false,
            force_update: false,
            extra: BTreeMap::new(),
        }
    }
}

// ---------------------------
// app_version
// ---------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppVersionInfo {
    #[serde(default = "default_version")]
    pub current_version: String,
    #[serde(default = "default_version")]
    pub minimum_version: String,
    #[serde(default)]
    pub update_required: bool,
    #[serde(default = "default_update_message")]
    pub update_message: String,
    #[serde(default = "default_play_store_url")]
    pub play_store_url: String,
    #[serde(default = "default_update_features")]
    pub update_features: Vec<String>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}
fn default_update_message() -> String {
    "Dostępna nowa wersja aplikacji z ulepszeniami!".to_string()
}
fn default_play_store_url() -> String {
    "https://play.google.com/store/apps/details?id=com.example.lista_obecnosci".to_string()
}
fn default_update_features() -> Vec<String> {
    vec![
        "Nowy system konfiguracji zdalnej".to_string(),
        "Ulepszony timer pracy".to_string(),
        "Poprawki błędów i optymalizacja".to_string(),
    ]
}

impl Default for AppVersionInfo {
    fn default() -> Self {
        Self {
            current_version: default_version(),
            minimum_version: default_version(),
            update_required: false,
            update_message: default_update_message(),
            play_store_url: default_play_store_url(),
            update_features: default_update_features(),
        }
    }
}

// ---------------------------
// time_rounding
// ---------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoundingDirection {
    Up,
    Down,
    Nearest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeRoundingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_rounding_minutes")]
    pub rounding_minutes: u32,
    #[serde(default = "default_direction")]
    pub rounding_direction: RoundingDirection,
    #[serde(default = "yes")]
    pub start_time_rounding: bool,
    #[serde(default = "yes")]
    pub end_time_rounding: bool,
    #[serde(default = "default_tolerance")]
    pub max_early_minutes: u32,
    #[serde(default = "default_tolerance")]
    pub max_late_minutes: u32,
    #[serde(default)]
    pub apply_to_breaks: bool,
}

fn default_rounding_minutes() -> u32 {
    15
}
fn default_direction() -> RoundingDirection {
    RoundingDirection::Nearest
}
fn default_tolerance() -> u32 {
    30
}

impl Default for TimeRoundingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rounding_minutes: default_rounding_minutes(),
            rounding_direction: default_direction(),
            start_time_rounding: true,
            end_time_rounding: true,
            max_early_minutes: default_tolerance(),
            max_late_minutes: default_tolerance(),
            apply_to_breaks: false,
        }
    }
}

// ---------------------------
// email
// ---------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailConfig {
    #[serde(default = "default_smtp_server")]
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_username: String,
    #[serde(default)]
    pub smtp_password: String,
    #[serde(default)]
    pub sender_email: String,
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    #[serde(default)]
    pub enabled: bool,
}

fn default_smtp_server() -> String {
    "smtp.gmail.com".to_string()
}
fn default_smtp_port() -> u16 {
    587
}
fn default_sender_name() -> String {
    "System Lista Obecności".to_string()
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_server: default_smtp_server(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            sender_email: String::new(),
            sender_name: default_sender_name(),
            enabled: false,
        }
    }
}

// ---------------------------
// payroll
// ---------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayrollConfig {
    #[serde(default = "default_vacation_window")]
    pub vacation_window_days: i64,
    #[serde(default = "default_sick_window")]
    pub sick_window_days: i64,
    #[serde(default = "default_sick_ratio")]
    pub sick_pay_ratio: f64,
    #[serde(default = "default_leave_hours")]
    pub paid_leave_hours: f64,
    #[serde(default = "default_night_start")]
    pub night_start: String,
    #[serde(default = "default_night_end")]
    pub night_end: String,
    #[serde(default = "default_overtime_after")]
    pub overtime_after_hours: f64,
}

fn default_vacation_window() -> i64 {
    90
}
fn default_sick_window() -> i64 {
    180
}
fn default_sick_ratio() -> f64 {
    0.8
}
fn default_leave_hours() -> f64 {
    8.0
}
fn default_night_start() -> String {
    "22:00".to_string()
}
fn default_night_end() -> String {
    "06:00".to_string()
}
fn default_overtime_after() -> f64 {
    8.0
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            vacation_window_days: default_vacation_window(),
            sick_window_days: default_sick_window(),
            sick_pay_ratio: default_sick_ratio(),
            paid_leave_hours: default_leave_hours(),
            night_start: default_night_start(),
            night_end: default_night_end(),
            overtime_after_hours: default_overtime_after(),
        }
    }
}

// ---------------------------
// security
// ---------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecurityConfig {
    #[serde(default = "default_stats_minutes")]
    pub stats_access_minutes: i64,
    #[serde(default = "default_session_hours")]
    pub admin_session_hours: i64,
    #[serde(default = "default_iterations")]
    pub password_iterations: u32,
}

fn default_stats_minutes() -> i64 {
    30
}
fn default_session_hours() -> i64 {
    8
}
fn default_iterations() -> u32 {
    10_000
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            stats_access_minutes: default_stats_minutes(),
            admin_session_hours: default_session_hours(),
            password_iterations: default_iterations(),
        }
    }
}
