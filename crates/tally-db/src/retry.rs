//! Transient lock error retry.
//!
//! A commit that loses a write lock to another connection fails with
//! `SQLITE_BUSY` ("database is locked"). Those resolve once the other writer
//! finishes, so the whole commit attempt is retried with capped exponential
//! backoff. Nothing else is retried.

use std::time::Duration;

use tally_config::DatabaseConfig;

use crate::error::DatabaseError;

/// Retry policy for commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl From<&DatabaseConfig> for RetryConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_attempts: config.retry_max_attempts.max(1),
            base_delay: config.retry_base_delay(),
            max_delay: config.retry_max_delay(),
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `retry` (1-based): `base * 2^(retry-1)`, capped.
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Detect lock contention errors worth retrying.
///
/// Narrow on purpose: constraint violations, conflicts and hook failures are
/// never transient.
#[must_use]
pub fn is_transient_lock_error(e: &DatabaseError) -> bool {
    match e {
        DatabaseError::LibSql(inner) => {
            let msg = inner.to_string();
            msg.contains("database is locked") || msg.contains("database is busy")
        }
        _ => false,
    }
}
