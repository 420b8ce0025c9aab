//! Audit capture configuration.

use serde::{Deserialize, Serialize};
use tally_core::enums::{MissingIdentityPolicy, PayloadFormat};

use crate::ConfigError;

const fn default_enabled() -> bool {
    true
}

fn default_fallback_user_id() -> String {
    "system".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuditConfig {
    /// Register the audit hook on new units of work.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub payload_format: PayloadFormat,

    /// What to do when a commit carries an empty user id.
    #[serde(default)]
    pub missing_identity: MissingIdentityPolicy,

    /// User id recorded under the `fallback` policy.
    #[serde(default = "default_fallback_user_id")]
    pub fallback_user_id: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            payload_format: PayloadFormat::default(),
            missing_identity: MissingIdentityPolicy::default(),
            fallback_user_id: default_fallback_user_id(),
        }
    }
}

impl AuditConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the fallback policy is selected
    /// without a usable fallback user id.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.missing_identity == MissingIdentityPolicy::Fallback
            && self.fallback_user_id.trim().is_empty()
        {
            return Err(ConfigError::InvalidValue {
                field: "audit.fallback_user_id".into(),
                reason: "must be non-empty when missing_identity = \"fallback\"".into(),
            });
        }
        Ok(())
    }
}
