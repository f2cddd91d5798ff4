//! Device registration for the mobile app.

use crate::db::devices;
use crate::errors::{AppError, AppResult};
use crate::models::DeviceInfo;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

fn default_action() -> String {
    "check".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceCheckRequest {
    pub worker_id: String,
    #[serde(default)]
    pub device_info: DeviceInfo,
    #[serde(default = "default_action")]
    pub user_action: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DeviceCheckResult {
    pub is_new_device: bool,
    pub requires_confirmation: bool,
    pub device_registered: bool,
    pub message: String,
    pub status: String,
}

pub struct DeviceLogic;

impl DeviceLogic {
    /// `check` only looks; any other action records the device.
    pub fn check(conn: &Connection, req: &DeviceCheckRequest) -> AppResult<DeviceCheckResult> {
        let worker = req.worker_id.trim();
        let device_id = req.device_info.device_id.trim();
        if worker.is_empty() || device_id.is_empty() {
            return Err(AppError::BadRequest(
                "Wymagane są worker_id i device_info.device_id".into(),
            ));
        }

        let known = devices::find_device(conn, worker, device_id)?;
        let action = req.user_action.trim();

        if action == "check" {
            return Ok(match known {
                Some(_) => DeviceCheckResult {
                    is_new_device: false,
                    requires_confirmation: false,
                    device_registered: true,
                    message: "Urządzenie znane".into(),
                    status: "approved".into(),
                },
                None => DeviceCheckResult {
                    is_new_device: true,
                    requires_confirmation: devices::count_devices(conn, worker)? > 0,
                    device_registered: false,
                    message: "Nowe urządzenie wymaga potwierdzenia".into(),
                    status: "pending".into(),
                },
            });
        }

        if let Some(dev) = known {
            devices::touch_device(conn, dev.id)?;
            return Ok(DeviceCheckResult {
                is_new_device: false,
                requires_confirmation: false,
                device_registered: true,
                message: "Urządzenie znane".into(),
                status: "approved".into(),
            });
        }

        let suspicious = devices::count_devices(conn, worker)? > 0;
        devices::insert_device(
            conn,
            worker,
            &req.device_info,
            action == "approved",
            suspicious,
            action == "rejected",
        )?;

        if suspicious {
            warn!(worker, device = device_id, action, "additional device registered");
        } else {
            info!(worker, device = device_id, action, "device registered");
        }

        Ok(DeviceCheckResult {
            is_new_device: true,
            requires_confirmation: suspicious,
            device_registered: true,
            message: "Nowe urządzenie zarejestrowane".into(),
            status: action.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;

    fn req(device: &str, action: &str) -> DeviceCheckRequest {
        DeviceCheckRequest {
            worker_id: "5".into(),
            device_info: DeviceInfo {
                device_id: device.into(),
                device_model: "Pixel 8".into(),
                ..DeviceInfo::default()
            },
            user_action: action.into(),
        }
    }

    #[test]
    fn first_device_then_second_is_suspicious() {
        let c = Connection::open_in_memory().unwrap();
        init_db(&c).unwrap();

        let r = DeviceLogic::check(&c, &req("A", "check")).unwrap();
        assert_eq!(r.status, "pending");
        assert!(!r.requires_confirmation);
        assert!(!r.device_registered);

        let r = DeviceLogic::check(&c, &req("A", "approved")).unwrap();
        assert!(r.device_registered);
        assert_eq!(r.status, "approved");

        let r = DeviceLogic::check(&c, &req("A", "check")).unwrap();
        assert_eq!(r.message, "Urządzenie znane");

        let r = DeviceLogic::check(&c, &req("B", "check")).unwrap();
        assert!(r.requires_confirmation);

        let r = DeviceLogic::check(&c, &req("B", "rejected")).unwrap();
        assert!(r.requires_confirmation);
        assert_eq!(r.status, "rejected");

        let all = devices::list_devices(&c).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|d| d.device_id == "B" && d.user_rejected && d.is_suspicious));
    }
}
