//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for sandboxed env var and file manipulation.

use std::path::PathBuf;

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use tally_config::TallyConfig;
use tally_core::enums::{MissingIdentityPolicy, PayloadFormat};

fn from_toml(file: &str) -> Figment {
    Figment::from(Serialized::defaults(TallyConfig::default())).merge(Toml::file(file))
}

#[test]
fn loads_audit_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[audit]
enabled = false
payload_format = "compact"
missing_identity = "fallback"
fallback_user_id = "scheduler"
"#,
        )?;

        let config: TallyConfig = from_toml("config.toml").extract()?;

        assert!(!config.audit.enabled);
        assert_eq!(config.audit.payload_format, PayloadFormat::Compact);
        assert_eq!(config.audit.missing_identity, MissingIdentityPolicy::Fallback);
        assert_eq!(config.audit.fallback_user_id, "scheduler");
        Ok(())
    });
}

#[test]
fn loads_database_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[database]
path = "/var/lib/tally/audit.db"
retry_max_attempts = 6
retry_base_delay_ms = 25
retry_max_delay_ms = 400
"#,
        )?;

        let config: TallyConfig = from_toml("config.toml").extract()?;

        assert_eq!(config.database.path, PathBuf::from("/var/lib/tally/audit.db"));
        assert_eq!(config.database.retry_max_attempts, 6);
        assert_eq!(config.database.retry_base_delay().as_millis(), 25);
        assert_eq!(config.database.retry_max_delay().as_millis(), 400);
        Ok(())
    });
}

#[test]
fn partial_section_keeps_other_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[audit]\npayload_format = \"compact\"\n")?;

        let config: TallyConfig = from_toml("config.toml").extract()?;

        assert!(config.audit.enabled);
        assert_eq!(config.audit.missing_identity, MissingIdentityPolicy::Reject);
        assert_eq!(config.audit.fallback_user_id, "system");
        assert_eq!(config.database, TallyConfig::default().database);
        Ok(())
    });
}

#[test]
fn env_var_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.set_env("TALLY_DATABASE__PATH", "from-env.db");

        jail.create_file(
            "config.toml",
            r#"
[database]
path = "from-toml.db"
retry_max_attempts = 2
"#,
        )?;

        let config: TallyConfig = from_toml("config.toml")
            .merge(Env::prefixed("TALLY_").split("__"))
            .extract()?;

        assert_eq!(config.database.path, PathBuf::from("from-env.db"));
        assert_eq!(config.database.retry_max_attempts, 2);
        Ok(())
    });
}

/// Typo'd env var keys are silently ignored by figment.
#[test]
fn typo_env_var_silently_ignored() {
    Jail::expect_with(|jail| {
        jail.set_env("TALLY_AUDIT__PAYLOAD_FORMATT", "compact");

        let config: TallyConfig = Figment::from(Serialized::defaults(TallyConfig::default()))
            .merge(Env::prefixed("TALLY_").split("__"))
            .extract()?;

        assert_eq!(config.audit.payload_format, PayloadFormat::Pretty);
        Ok(())
    });
}

#[test]
fn blank_fallback_user_is_rejected_on_load() {
    Jail::expect_with(|jail| {
        jail.create_dir(".tally")?;
        jail.create_file(
            ".tally/config.toml",
            "[audit]\nmissing_identity = \"fallback\"\nfallback_user_id = \"  \"\n",
        )?;

        let result = TallyConfig::from_figment(&TallyConfig::figment_in(jail.directory()));

        assert!(result.is_err());
        Ok(())
    });
}
