//! Mobile app version comparison.

use crate::config::AppVersionInfo;
use crate::errors::{AppError, AppResult};
use serde::Serialize;
use std::cmp::Ordering;

/// Parse `"1.2.3"` into its numeric components.
fn components(v: &str) -> AppResult<Vec<u64>> {
    v.trim()
        .split('.')
        .map(|p| {
            p.trim()
                .parse::<u64>()
                .map_err(|_| AppError::InvalidVersion(v.to_string()))
        })
        .collect()
}

/// Component-wise comparison, missing components count as 0.
pub fn compare_versions(a: &str, b: &str) -> AppResult<Ordering> {
    let (a, b) = (components(a)?, components(b)?);
    let len = a.len().max(b.len());

    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return Ok(other),
        }
    }
    Ok(Ordering::Equal)
}

#[derive(Debug, Serialize, PartialEq)]
pub struct VersionCheck {
    pub client_version: String,
    pub latest_version: String,
    pub update_available: bool,
    pub update_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_store_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

pub fn check_version(client: &str, info: &AppVersionInfo) -> AppResult<VersionCheck> {
    let update_available = compare_versions(&info.current_version, client)? == Ordering::Greater;
    let update_required = compare_versions(client, &info.minimum_version)? == Ordering::Less;

    let extra = |v: &String| update_available.then(|| v.clone());

    Ok(VersionCheck {
        client_version: client.to_string(),
        latest_version: info.current_version.clone(),
        update_available,
        update_required,
        update_message: extra(&info.update_message),
        play_store_url: extra(&info.play_store_url),
        features: update_available.then(|| info.update_features.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_components_are_zero() {
        assert_eq!(compare_versions("1.0", "1.0.0").unwrap(), Ordering::Equal);
        assert_eq!(compare_versions("1.10.0", "1.9.9").unwrap(), Ordering::Greater);
        assert_eq!(compare_versions("0.9", "1").unwrap(), Ordering::Less);
    }

    #[test]
    fn non_numeric_is_rejected() {
        assert!(matches!(
            compare_versions("1.0-beta", "1.0"),
            Err(AppError::InvalidVersion(_))
        ));
    }

    #[test]
    fn old_client_must_update() {
        let info = AppVersionInfo {
            current_version: "1.3.0".into(),
            minimum_version: "1.2.0".into(),
            ..AppVersionInfo::default()
        };

        let r = check_version("1.1.5", &info).unwrap();
        assert!(r.update_available);
        assert!(r.update_required);
        assert!(r.features.is_some());

        let r = check_version("1.3.0", &info).unwrap();
        assert!(!r.update_available);
        assert!(!r.update_required);
        assert!(r.update_message.is_none());
    }
}
