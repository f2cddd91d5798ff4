use serde::Serialize;

/// Row of `statistics_access_logs`: one PIN attempt on the statistics screen.
#[derive(Debug, Clone, Serialize)]
pub struct AccessLog {
    pub id: i64,
    pub worker_id: String,
    pub device_id: Option<String>,
    pub device_model: Option<String>,
    pub pin_correct: bool,
    pub access_granted: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_text: Option<String>,
    pub attempted_at: String,
}

/// Insert payload for an access attempt.
#[derive(Debug, Clone, Default)]
pub struct NewAccessLog {
    pub worker_id: String,
    pub device_id: Option<String>,
    pub device_model: Option<String>,
    pub pin_correct: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_text: Option<String>,
}

pub const ALERT_DEVICE_CHANGE: &str = "DEVICE_CHANGE";

/// Row of `device_security_alerts`.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityAlert {
    pub id: i64,
    pub worker_id: String,
    pub old_device_id: Option<String>,
    pub new_device_id: Option<String>,
    pub old_device_model: Option<String>,
    pub new_device_model: Option<String>,
    pub alert_type: String,
    pub is_resolved: bool,
    pub created_at: String,
    pub resolved_at: Option<String>,
}
