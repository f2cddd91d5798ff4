//! Configuration file upgrades: add sections and keys introduced after the
//! file was written, never touching values the operator already set.

use super::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// Read the YAML file as an untyped mapping.
fn read_mapping(path: &Path) -> AppResult<Mapping> {
    let content = fs::read_to_string(path)?;
    let yaml: Value = serde_yaml::from_str(&content)?;

    match yaml {
        Value::Mapping(m) => Ok(m),
        Value::Null => Ok(Mapping::new()),
        _ => Err(AppError::Config(format!(
            "{} is not a YAML mapping",
            path.display()
        ))),
    }
}

/// Default document as an untyped mapping.
fn default_mapping() -> AppResult<Mapping> {
    match serde_yaml::to_value(Config::default())? {
        Value::Mapping(m) => Ok(m),
        _ => Err(AppError::Config("default configuration is not a mapping".into())),
    }
}

/// Walk `defaults` and copy into `current` everything it lacks.
/// Returns dotted paths of the keys that were added.
fn merge_missing(current: &mut Mapping, defaults: &Mapping, prefix: &str) -> Vec<String> {
    let mut added = Vec::new();

    for (key, default_val) in defaults {
        let name = key.as_str().unwrap_or_default();
        let dotted = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        };

        match current.get_mut(key) {
            None => {
                current.insert(key.clone(), default_val.clone());
                added.push(dotted);
            }
            Some(Value::Mapping(inner)) => {
                if let Value::Mapping(def_inner) = default_val {
                    added.extend(merge_missing(inner, def_inner, &dotted));
                }
            }
            Some(_) => {}
        }
    }

    added
}

/// List keys missing from the file at `path`.
pub fn check_config(path: &Path) -> AppResult<Vec<String>> {
    if !path.exists() {
        return Err(AppError::Config(format!(
            "configuration file not found: {}",
            path.display()
        )));
    }

    let mut current = read_mapping(path)?;
    Ok(merge_missing(&mut current, &default_mapping()?, ""))
}

/// Add missing keys with their defaults and rewrite the file.
pub fn migrate_config(path: &Path) -> AppResult<Vec<String>> {
    if !path.exists() {
        return Err(AppError::Config(format!(
            "configuration file not found: {}",
            path.display()
        )));
    }

    let mut current = read_mapping(path)?;
    let added = merge_missing(&mut current, &default_mapping()?, "");

    if added.is_empty() {
        info("Configuration already up to date.");
        return Ok(added);
    }

    let serialized = serde_yaml::to_string(&Value::Mapping(current))?;
    fs::write(path, serialized)?;

    success(format!(
        "Configuration migrated, added: {}",
        added.join(", ")
    ));

    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn migrate_keeps_existing_values_and_adds_sections() {
        let path = env::temp_dir().join("rattendance_cfg_migrate_test.conf");
        fs::write(
            &path,
            "database: /data/att.sqlite\nemail:\n  enabled: true\n  smtp_port: 2525\n",
        )
        .unwrap();

        let missing = check_config(&path).unwrap();
        assert!(missing.contains(&"time_rounding".to_string()));
        assert!(missing.contains(&"email.smtp_server".to_string()));

        migrate_config(&path).unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.database, "/data/att.sqlite");
        assert_eq!(cfg.email.smtp_port, 2525);
        assert!(cfg.email.enabled);
        assert!(check_config(&path).unwrap().is_empty());

        fs::remove_file(&path).ok();
    }
}
