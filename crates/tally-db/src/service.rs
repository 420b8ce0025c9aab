//! Service layer wiring configuration into the store.
//!
//! `TallyService` owns the database handle, the shared audit interceptor and
//! the commit retry policy. Every unit of work it hands out has the
//! interceptor registered when auditing is enabled.

use std::path::Path;
use std::sync::Arc;

use tally_capture::{AuditInterceptor, AuditScope, CaptureSettings};
use tally_config::{AuditConfig, TallyConfig};

use crate::TallyDb;
use crate::error::DatabaseError;
use crate::retry::RetryConfig;
use crate::unit_of_work::UnitOfWork;

/// Map the `[audit]` config section onto interceptor settings.
#[must_use]
pub fn capture_settings(audit: &AuditConfig) -> CaptureSettings {
    CaptureSettings {
        payload_format: audit.payload_format,
        missing_identity: audit.missing_identity,
        fallback_user_id: audit.fallback_user_id.clone(),
    }
}

pub struct TallyService {
    db: TallyDb,
    interceptor: Option<Arc<AuditInterceptor>>,
    retry: RetryConfig,
}

impl TallyService {
    /// Open the database named by `config.database.path`, creating its parent
    /// directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the directory cannot be created or the
    /// database cannot be opened.
    pub async fn open(config: &TallyConfig, scope: AuditScope) -> Result<Self, DatabaseError> {
        let path = config.database.path.as_path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::Other(e.into()))?;
        }
        let db = TallyDb::open_local(&path_str(path)?).await?;
        Ok(Self::from_db(db, config, scope))
    }

    /// Wrap an already open database.
    #[must_use]
    pub fn from_db(db: TallyDb, config: &TallyConfig, scope: AuditScope) -> Self {
        let interceptor = if config.audit.enabled {
            Some(Arc::new(AuditInterceptor::new(
                scope,
                capture_settings(&config.audit),
            )))
        } else {
            tracing::warn!("audit capture disabled by configuration");
            None
        };
        Self {
            db,
            interceptor,
            retry: RetryConfig::from(&config.database),
        }
    }

    #[must_use]
    pub const fn db(&self) -> &TallyDb {
        &self.db
    }

    #[must_use]
    pub const fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    #[must_use]
    pub fn audit_enabled(&self) -> bool {
        self.interceptor.is_some()
    }

    /// New unit of work with the audit hook registered (when enabled).
    #[must_use]
    pub fn unit_of_work(&self) -> UnitOfWork<'_> {
        let uow = UnitOfWork::new(&self.db);
        match &self.interceptor {
            Some(interceptor) => uow.with_hook(interceptor.clone()),
            None => uow,
        }
    }
}

fn path_str(path: &Path) -> Result<String, DatabaseError> {
    path.to_str().map(ToString::to_string).ok_or_else(|| {
        DatabaseError::InvalidState(format!("database path is not UTF-8: {}", path.display()))
    })
}
