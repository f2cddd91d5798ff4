//! Runtime settings blob fetched by the mobile app.

use crate::config::MobileConfig;
use crate::errors::{AppError, AppResult};
use serde_json::{Map, Value};

/// Merge the keys of an admin-panel update into `current`. Known switches
/// must stay booleans; unknown keys are stored as sent.
pub fn merge_mobile(current: &MobileConfig, update: &Value) -> AppResult<MobileConfig> {
    let Value::Object(update) = update else {
        return Err(AppError::BadRequest(
            "Konfiguracja musi być obiektem JSON".into(),
        ));
    };

    let mut doc = match serde_json::to_value(current)? {
        Value::Object(m) => m,
        _ => Map::new(),
    };
    for (k, v) in update {
        doc.insert(k.clone(), v.clone());
    }

    serde_json::from_value(Value::Object(doc))
        .map_err(|e| AppError::BadRequest(format!("Niepoprawna konfiguracja: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_and_unknown_keys_merge() {
        let merged = merge_mobile(
            &MobileConfig::default(),
            &json!({"daily_stats": true, "forceUpdate": true, "dark_mode": "auto"}),
        )
        .unwrap();

        assert!(merged.daily_stats);
        assert!(merged.force_update);
        assert!(merged.timer_enabled);
        assert_eq!(merged.extra.get("dark_mode"), Some(&json!("auto")));
    }

    #[test]
    fn non_object_and_wrong_types_are_rejected() {
        let base = MobileConfig::default();
        assert!(merge_mobile(&base, &json!([1, 2])).is_err());
        assert!(merge_mobile(&base, &json!({"timer_enabled": "yes"})).is_err());
    }
}
