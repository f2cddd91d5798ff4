use crate::errors::{AppError, AppResult};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub mod migrate;
pub mod sections;

pub use sections::{
    AppVersionInfo, EmailConfig, LoggingConfig, MobileConfig, PayrollConfig, RoundingDirection,
    SecurityConfig, ServerConfig, TimeRoundingConfig,
};

pub const DEFAULT_CONFIG_VERSION: &str = "1.1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub mobile: MobileConfig,
    #[serde(default = "default_config_version")]
    pub config_version: String,
    #[serde(default)]
    pub app_version: AppVersionInfo,
    #[serde(default)]
    pub time_rounding: TimeRoundingConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub payroll: PayrollConfig,
    #[serde(default)]
    pub security: SecurityConfig,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_config_version() -> String {
    DEFAULT_CONFIG_VERSION.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            mobile: MobileConfig::default(),
            config_version: default_config_version(),
            app_version: AppVersionInfo::default(),
            time_rounding: TimeRoundingConfig::default(),
            email: EmailConfig::default(),
            payroll: PayrollConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("rattendance")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".rattendance")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rattendance.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rattendance.sqlite")
    }

    /// Default directory for `backup` when no explicit file is given.
    pub fn backup_dir() -> PathBuf {
        Self::config_dir().join("backups")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Write the whole document back as YAML.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)?;
        let mut file = fs::File::create(path).map_err(|_| AppError::ConfigSave)?;
        file.write_all(yaml.as_bytes())
            .map_err(|_| AppError::ConfigSave)?;
        Ok(())
    }

    /// Environment overrides (`.env` is loaded by the caller).
    pub fn apply_env(&mut self) {
        if let Ok(db) = env::var("RATTENDANCE_DB")
            && !db.trim().is_empty()
        {
            self.database = db;
        }
        if let Ok(user) = env::var("RATTENDANCE_SMTP_USERNAME") {
            self.email.smtp_username = user;
        }
        if let Ok(pass) = env::var("RATTENDANCE_SMTP_PASSWORD") {
            self.email.smtp_password = pass;
        }
    }

    /// Copy of `self` to write back to the config file. `before` is the
    /// running configuration prior to the change: wherever it differs from
    /// `on_disk` a startup override (`--db`, environment) is in effect and
    /// the file keeps its own value.
    pub fn for_disk(&self, before: &Config, on_disk: &Config) -> Config {
        let mut out = self.clone();
        if before.database != on_disk.database {
            out.database = on_disk.database.clone();
        }
        if before.email.smtp_username != on_disk.email.smtp_username {
            out.email.smtp_username = on_disk.email.smtp_username.clone();
        }
        if before.email.smtp_password != on_disk.email.smtp_password {
            out.email.smtp_password = on_disk.email.smtp_password.clone();
        }
        out
    }

    /// Stamp a new configuration version after a runtime change.
    pub fn bump_version(&mut self) -> String {
        self.config_version = Local::now().format("%Y%m%d-%H%M%S").to_string();
        self.config_version.clone()
    }

    /// Initialize configuration and database files.
    /// Returns the database path that was set up.
    pub fn init_all(custom_name: Option<String>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();

        // DB name: user provided or default
        let db_path = if let Some(name) = custom_name {
            let p = Path::new(&name);
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                dir.join(p)
            }
        } else {
            Self::database_file()
        };

        if !is_test {
            fs::create_dir_all(&dir)?;

            // An existing file keeps its values, only the database path moves.
            let mut config = Self::load()?;
            config.database = db_path.to_string_lossy().to_string();
            config.save(&Self::config_file())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Create empty DB file if not exists
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        println!("✅ Database:    {:?}", db_path);

        Ok(db_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_takes_section_defaults() {
        let yaml = "database: /tmp/x.sqlite\nemail:\n  enabled: true\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(cfg.database, "/tmp/x.sqlite");
        assert!(cfg.email.enabled);
        assert_eq!(cfg.email.smtp_port, 587);
        assert_eq!(cfg.config_version, DEFAULT_CONFIG_VERSION);
        assert_eq!(cfg.time_rounding.rounding_minutes, 15);
        assert!(cfg.mobile.timer_enabled);
        assert!(!cfg.mobile.force_update);
    }

    #[test]
    fn overridden_values_stay_out_of_the_file() {
        let on_disk = Config {
            database: "/data/att.sqlite".into(),
            ..Config::default()
        };
        let mut running = on_disk.clone();
        running.database = "/tmp/one-off.sqlite".into();
        running.email.smtp_password = "from-env".into();

        let mut changed = running.clone();
        changed.email.smtp_server = "smtp.example.com".into();
        changed.mobile.timer_enabled = false;

        let out = changed.for_disk(&running, &on_disk);
        assert_eq!(out.database, "/data/att.sqlite");
        assert_eq!(out.email.smtp_password, "");
        assert_eq!(out.email.smtp_server, "smtp.example.com");
        assert!(!out.mobile.timer_enabled);

        // a value set at runtime without an override is written
        let mut plain = on_disk.clone();
        plain.email.smtp_password = "typed-in".into();
        assert_eq!(plain.for_disk(&on_disk, &on_disk).email.smtp_password, "typed-in");
    }

    #[test]
    fn unknown_mobile_keys_survive_a_round_trip() {
        let yaml = "mobile:\n  timer_enabled: false\n  dark_mode: true\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(!cfg.mobile.timer_enabled);

        let back = serde_yaml::to_string(&cfg).unwrap();
        assert!(back.contains("dark_mode: true"));
        assert!(back.contains("forceUpdate: false"));
    }

    #[test]
    fn bump_version_uses_timestamp_format() {
        let mut cfg = Config::default();
        let v = cfg.bump_version();
        assert_eq!(v.len(), "20250101-120000".len());
        assert_eq!(&v[8..9], "-");
    }
}
