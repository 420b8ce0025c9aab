//! Contracts between the capture engine and a unit of work.

use tally_core::entities::AuditEntry;
use tally_core::entity::KeyValue;
use tally_core::identity::IdentityContext;
use tally_core::mutation::PendingMutation;

use crate::error::CaptureError;

/// Pre-commit view of one commit attempt.
///
/// Valid only while the attempt is in its pre-commit phase. Records added here
/// join the same atomic write as the pending mutations.
pub trait UnitOfWorkContext {
    /// Every tracked entity of this attempt, including unchanged ones.
    fn pending_mutations(&self) -> &[PendingMutation];

    /// Primary key of the mutated entity, if one can be resolved.
    fn resolve_primary_key(&self, mutation: &PendingMutation) -> Option<KeyValue>;

    /// Add an audit record to this attempt's pending-write set.
    fn add_pending_record(&mut self, record: AuditEntry);
}

/// What a pre-commit hook receives.
pub struct CommitEvent<'a> {
    /// `None` when the host cannot expose a unit of work for this commit.
    pub context: Option<&'a mut (dyn UnitOfWorkContext + 'a)>,
    pub identity: &'a IdentityContext,
}

/// Extension point run exactly once per commit attempt, before any write.
///
/// Hooks may annotate the attempt but must not change its outcome. An error
/// aborts the attempt.
pub trait PreCommitHook: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// # Errors
    ///
    /// Returns `CaptureError` to abort the commit attempt.
    fn before_commit(&self, event: &mut CommitEvent<'_>) -> Result<(), CaptureError>;
}
