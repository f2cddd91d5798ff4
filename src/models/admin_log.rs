use serde::Serialize;

pub const ACTION_FORCE_STOP: &str = "FORCE_STOP";

/// Row of `admin_logs`.
#[derive(Debug, Clone, Serialize)]
pub struct AdminLog {
    pub id: i64,
    pub action_type: String,
    pub admin_id: String,
    pub target_id: Option<String>,
    pub action_time: String,
    pub notes: Option<String>,
}
