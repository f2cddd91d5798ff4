use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fingerprint sent by the mobile app.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceInfo {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub device_model: String,
    #[serde(default)]
    pub os_version: String,
    #[serde(default)]
    pub app_version: String,
    #[serde(default)]
    pub location: Option<Value>,
}

impl DeviceInfo {
    /// Location as stored: strings verbatim, objects as compact JSON.
    pub fn location_text(&self) -> Option<String> {
        match &self.location {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

/// Row of `device_logs`.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceLog {
    pub id: i64,
    pub worker_id: String,
    pub device_id: String,
    pub device_model: String,
    pub os_version: String,
    pub app_version: String,
    pub location: Option<String>,
    pub is_approved: bool,
    pub is_suspicious: bool,
    pub user_rejected: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}
