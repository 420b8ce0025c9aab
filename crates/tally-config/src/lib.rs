//! # tally-config
//!
//! Layered configuration loading for Tally using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`TALLY_*` prefix, `__` as separator)
//! 2. Project-level `.tally/config.toml`
//! 3. User-level `~/.config/tally/config.toml`
//! 4. Built-in defaults
//!
//! Figment maps `TALLY_AUDIT__PAYLOAD_FORMAT` -> `audit.payload_format`,
//! `TALLY_DATABASE__PATH` -> `database.path`, etc.
//!
//! ```no_run
//! use tally_config::TallyConfig;
//!
//! let config = TallyConfig::load_with_dotenv().expect("config");
//! println!("audit enabled: {}", config.audit.enabled);
//! ```

mod audit;
mod database;
mod error;

pub use audit::AuditConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// Project directory holding the local config and default database.
pub const PROJECT_DIR: &str = ".tally";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TallyConfig {
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl TallyConfig {
    /// Load configuration from TOML files and environment variables, rooted
    /// at the current directory.
    ///
    /// Does NOT call `dotenvy`; use [`TallyConfig::load_with_dotenv`] for that.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// As [`TallyConfig::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Extract and validate from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Provider chain rooted at the current directory.
    #[must_use]
    pub fn figment() -> Figment {
        Self::figment_in(Path::new("."))
    }

    /// Provider chain with the project layer read from `root/.tally/config.toml`.
    #[must_use]
    pub fn figment_in(root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = root.join(PROJECT_DIR).join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("TALLY_").split("__"))
    }

    /// # Errors
    ///
    /// Returns the first `ConfigError::InvalidValue` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.audit.validate()?;
        self.database.validate()
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tally").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use tally_core::enums::{MissingIdentityPolicy, PayloadFormat};

    fn load_in(jail: &Jail) -> Result<TallyConfig, ConfigError> {
        TallyConfig::from_figment(&TallyConfig::figment_in(jail.directory()))
    }

    #[test]
    fn figment_builds_without_files() {
        Jail::expect_with(|jail| {
            let config = load_in(jail).map_err(|e| e.to_string())?;
            assert_eq!(config, TallyConfig::default());
            Ok(())
        });
    }

    #[test]
    fn project_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_dir(PROJECT_DIR)?;
            jail.create_file(
                ".tally/config.toml",
                r#"
                [audit]
                payload_format = "compact"
                missing_identity = "fallback"
                fallback_user_id = "batch"

                [database]
                path = "data/audit.db"
                "#,
            )?;
            let config = load_in(jail).map_err(|e| e.to_string())?;
            assert_eq!(config.audit.payload_format, PayloadFormat::Compact);
            assert_eq!(config.audit.missing_identity, MissingIdentityPolicy::Fallback);
            assert_eq!(config.audit.fallback_user_id, "batch");
            assert!(config.audit.enabled);
            assert_eq!(config.database.path, PathBuf::from("data/audit.db"));
            assert_eq!(config.database.retry_max_attempts, 4);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_project_file() {
        Jail::expect_with(|jail| {
            jail.create_dir(PROJECT_DIR)?;
            jail.create_file(
                ".tally/config.toml",
                "[audit]\npayload_format = \"compact\"\n",
            )?;
            jail.set_env("TALLY_AUDIT__PAYLOAD_FORMAT", "pretty");
            jail.set_env("TALLY_AUDIT__ENABLED", "false");
            jail.set_env("TALLY_DATABASE__RETRY_MAX_ATTEMPTS", "7");
            let config = load_in(jail).map_err(|e| e.to_string())?;
            assert_eq!(config.audit.payload_format, PayloadFormat::Pretty);
            assert!(!config.audit.enabled);
            assert_eq!(config.database.retry_max_attempts, 7);
            Ok(())
        });
    }

    #[test]
    fn unknown_enum_value_is_an_error() {
        Jail::expect_with(|jail| {
            jail.set_env("TALLY_AUDIT__MISSING_IDENTITY", "ignore");
            assert!(matches!(load_in(jail), Err(ConfigError::Figment(_))));
            Ok(())
        });
    }

    #[test]
    fn out_of_range_value_fails_validation() {
        Jail::expect_with(|jail| {
            jail.set_env("TALLY_DATABASE__RETRY_MAX_ATTEMPTS", "0");
            assert!(matches!(
                load_in(jail),
                Err(ConfigError::InvalidValue { .. })
            ));
            Ok(())
        });
    }

    #[test]
    fn log_filter_variable_does_not_break_extraction() {
        Jail::expect_with(|jail| {
            jail.set_env("TALLY_LOG", "debug");
            load_in(jail).map_err(|e| e.to_string())?;
            Ok(())
        });
    }
}
