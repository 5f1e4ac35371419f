//! Application configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables (a `.env` file is loaded by the binary first), then
//! command-line flags applied by the caller.

use crate::application::ServiceOptions;
use crate::domain::fees::FeeRounding;
use crate::error::{AdminError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Config file read when no explicit path is given and it exists.
pub const DEFAULT_CONFIG_FILE: &str = "consorcio.toml";
pub const ENV_DATA_DIR: &str = "CONSORCIO_DATA_DIR";
pub const ENV_BACKEND: &str = "CONSORCIO_BACKEND";
/// Upper bound for the `vencimiento` lookahead, ten years.
pub const MAX_DUE_SOON_DAYS: i64 = 3650;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    Json,
    Rocksdb,
}

impl FromStr for StorageBackend {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "json" => Ok(StorageBackend::Json),
            "rocksdb" => Ok(StorageBackend::Rocksdb),
            other => Err(AdminError::ConfigError(format!(
                "Unknown storage backend '{other}' (expected memory, json or rocksdb)"
            ))),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Json => "json",
            StorageBackend::Rocksdb => "rocksdb",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Directory for the JSON files or the RocksDB database.
    pub data_dir: PathBuf,
    pub backend: StorageBackend,
    pub fee_rounding: FeeRounding,
    pub due_soon_days: i64,
    pub delinquency_alert_threshold: Decimal,
}

impl Default for AppConfig {
    fn default() -> Self {
        let options = ServiceOptions::default();
        Self {
            data_dir: PathBuf::from("consorcio-data"),
            backend: StorageBackend::default(),
            fee_rounding: options.fee_rounding,
            due_soon_days: options.due_soon_days,
            delinquency_alert_threshold: options.delinquency_alert_threshold,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| AdminError::ConfigError(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`, or `DEFAULT_CONFIG_FILE` if present, or falls back to defaults.
    /// Environment overrides are applied afterwards.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
        };

        let mut config = match file {
            Some(p) => {
                let contents = std::fs::read_to_string(&p).map_err(|e| {
                    AdminError::ConfigError(format!(
                        "Failed to read config file {}: {e}",
                        p.display()
                    ))
                })?;
                Self::from_toml_str(&contents)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies `CONSORCIO_*` overrides looked up through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(backend) = lookup(ENV_BACKEND).filter(|v| !v.is_empty()) {
            self.backend = backend.parse()?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.due_soon_days < 0 {
            return Err(AdminError::ConfigError(
                "due_soon_days must not be negative".to_string(),
            ));
        }
        if self.due_soon_days > MAX_DUE_SOON_DAYS {
            return Err(AdminError::ConfigError(format!(
                "due_soon_days must be at most {MAX_DUE_SOON_DAYS}"
            )));
        }
        if self.delinquency_alert_threshold < Decimal::ZERO {
            return Err(AdminError::ConfigError(
                "delinquency_alert_threshold must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn service_options(&self) -> ServiceOptions {
        ServiceOptions {
            fee_rounding: self.fee_rounding,
            due_soon_days: self.due_soon_days,
            delinquency_alert_threshold: self.delinquency_alert_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            data_dir = "/var/lib/consorcio"
            backend = "memory"
            fee_rounding = "nearest"
            due_soon_days = 10
            delinquency_alert_threshold = 35.5
        "#;
        let config = AppConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/consorcio"));
        assert_eq!(config.backend, StorageBackend::Memory);
        assert_eq!(config.fee_rounding, FeeRounding::Nearest);
        assert_eq!(config.due_soon_days, 10);
        assert_eq!(config.delinquency_alert_threshold, dec!(35.5));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = AppConfig::from_toml_str("due_soon_days = 3").unwrap();
        assert_eq!(config.due_soon_days, 3);
        assert_eq!(config.backend, StorageBackend::Json);
        assert_eq!(config.fee_rounding, FeeRounding::Down);
        assert_eq!(config.delinquency_alert_threshold, dec!(20));
    }

    #[test]
    fn test_invalid_config() {
        assert!(AppConfig::from_toml_str("backend = \"postgres\"").is_err());
        assert!(AppConfig::from_toml_str("due_soon_days = -1").is_err());
        assert!(AppConfig::from_toml_str("due_soon_days = 1000000000").is_err());
        assert!(AppConfig::from_toml_str("due_soon_days = 3651").is_err());
        assert_eq!(
            AppConfig::from_toml_str("due_soon_days = 3650")
                .unwrap()
                .due_soon_days,
            MAX_DUE_SOON_DAYS
        );
        assert!(AppConfig::from_toml_str("colour = \"red\"").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_DATA_DIR, "/tmp/datos"), (ENV_BACKEND, "rocksdb")]);
        let mut config = AppConfig::default();
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/datos"));
        assert_eq!(config.backend, StorageBackend::Rocksdb);

        let mut config = AppConfig::default();
        assert!(
            config
                .apply_env(|k| (k == ENV_BACKEND).then(|| "sqlite".to_string()))
                .is_err()
        );
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "fee_rounding = \"nearest\"").unwrap();
        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.fee_rounding, FeeRounding::Nearest);

        assert!(matches!(
            AppConfig::load(Some(&dir.path().join("missing.toml"))),
            Err(AdminError::ConfigError(_))
        ));
    }
}
