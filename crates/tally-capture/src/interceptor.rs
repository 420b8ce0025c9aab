//! The commit interceptor.
//!
//! Runs once per commit attempt:
//! 1. No unit-of-work context → pass through.
//! 2. Enumerate pending mutations.
//! 3. Keep auditable entities with an insert, update or delete pending.
//! 4. Drop updates that changed no field.
//! 5. Diff and assemble each survivor.
//! 6. Add every entry to the attempt's pending-write set.
//!
//! Entries are only added once all of them assembled, so a failure leaves the
//! attempt untouched. The interceptor keeps no state between attempts.

use std::borrow::Cow;
use std::sync::Arc;

use tally_core::enums::{MissingIdentityPolicy, MutationKind, PayloadFormat};
use tally_core::identity::IdentityContext;

use crate::assemble::assemble;
use crate::clock::{Clock, SystemClock};
use crate::context::{CommitEvent, PreCommitHook, UnitOfWorkContext};
use crate::diff::build_diff;
use crate::error::CaptureError;
use crate::scope::AuditScope;

/// Default user id substituted under [`MissingIdentityPolicy::Fallback`].
pub const DEFAULT_FALLBACK_USER_ID: &str = "system";

/// Knobs for payload layout and identity handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSettings {
    pub payload_format: PayloadFormat,
    pub missing_identity: MissingIdentityPolicy,
    pub fallback_user_id: String,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            payload_format: PayloadFormat::default(),
            missing_identity: MissingIdentityPolicy::default(),
            fallback_user_id: DEFAULT_FALLBACK_USER_ID.to_string(),
        }
    }
}

/// Pre-commit hook producing one `AuditEntry` per qualifying mutation.
pub struct AuditInterceptor {
    scope: AuditScope,
    settings: CaptureSettings,
    clock: Arc<dyn Clock>,
}

impl AuditInterceptor {
    #[must_use]
    pub fn new(scope: AuditScope, settings: CaptureSettings) -> Self {
        Self {
            scope,
            settings,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source (tests pin it with `FixedClock`).
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn scope(&self) -> &AuditScope {
        &self.scope
    }

    #[must_use]
    pub const fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// Capture audit entries for one commit attempt.
    ///
    /// Returns the number of entries added to the context.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError` if the identity is unusable, a mutation kind is
    /// unsupported, or a payload cannot be serialized. Nothing is added to the
    /// context in that case.
    pub fn capture<'c>(
        &self,
        context: Option<&mut (dyn UnitOfWorkContext + 'c)>,
        identity: &IdentityContext,
    ) -> Result<usize, CaptureError> {
        let Some(context) = context else {
            tracing::debug!("no unit of work context; audit capture skipped");
            return Ok(0);
        };

        let qualifying: Vec<_> = context
            .pending_mutations()
            .iter()
            .filter(|m| self.scope.contains(&m.entity) && m.kind.is_write())
            .filter(|m| {
                let noop = m.kind == MutationKind::Update && m.changed_count() == 0;
                if noop {
                    tracing::debug!(
                        entity = m.entity.name,
                        "skipping update with no changed fields"
                    );
                }
                !noop
            })
            .collect();

        if qualifying.is_empty() {
            return Ok(0);
        }

        let identity = self.resolve_identity(identity)?;

        let mut entries = Vec::with_capacity(qualifying.len());
        for mutation in qualifying {
            let diff = build_diff(mutation)?;
            let key = context.resolve_primary_key(mutation);
            let entry = assemble(
                mutation,
                diff,
                key.as_ref(),
                identity.as_ref(),
                self.clock.as_ref(),
                self.settings.payload_format,
            )?;
            tracing::debug!(
                entity = %entry.entity_name,
                entity_id = %entry.entity_id,
                event = %entry.event_type,
                "audit entry assembled"
            );
            entries.push(entry);
        }

        let count = entries.len();
        for entry in entries {
            context.add_pending_record(entry);
        }

        tracing::debug!(
            count,
            correlation_id = %identity.correlation_id,
            "audit entries attached to commit"
        );
        Ok(count)
    }

    fn resolve_identity<'a>(
        &self,
        identity: &'a IdentityContext,
    ) -> Result<Cow<'a, IdentityContext>, CaptureError> {
        if identity.correlation_id.trim().is_empty() {
            return Err(CaptureError::MissingIdentity(
                "correlation id is empty".into(),
            ));
        }
        if !identity.user_id.trim().is_empty() {
            return Ok(Cow::Borrowed(identity));
        }
        match self.settings.missing_identity {
            MissingIdentityPolicy::Reject => {
                Err(CaptureError::MissingIdentity("user id is empty".into()))
            }
            MissingIdentityPolicy::Fallback => {
                tracing::warn!(
                    fallback = %self.settings.fallback_user_id,
                    correlation_id = %identity.correlation_id,
                    "commit has no user id; recording fallback user"
                );
                Ok(Cow::Owned(identity.with_user(&self.settings.fallback_user_id)))
            }
        }
    }
}

impl PreCommitHook for AuditInterceptor {
    fn name(&self) -> &'static str {
        "audit"
    }

    fn before_commit(&self, event: &mut CommitEvent<'_>) -> Result<(), CaptureError> {
        let identity = event.identity;
        self.capture(event.context.as_deref_mut(), identity).map(|_| ())
    }
}
