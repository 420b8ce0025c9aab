//! Unit of work: tracked changes committed in one transaction.
//!
//! Commit protocol, per attempt:
//! 1. Snapshot the tracker into a fresh `CommitAttempt`.
//! 2. Run every pre-commit hook against the attempt (no transaction open yet).
//! 3. Begin a transaction, apply entity writes, insert the attempt's audit
//!    entries, commit.
//! 4. On any failure roll back; the attempt and its entries are discarded and
//!    the tracker is left as it was, so the commit can be retried.

use std::collections::BTreeSet;
use std::sync::Arc;

use tally_capture::{CommitEvent, PreCommitHook, UnitOfWorkContext};
use tally_core::entities::AuditEntry;
use tally_core::entity::{Entity, KeyValue};
use tally_core::enums::MutationKind;
use tally_core::identity::IdentityContext;
use tally_core::mutation::PendingMutation;

use crate::TallyDb;
use crate::audit::insert_audit_entry;
use crate::error::DatabaseError;
use crate::helpers::is_unique_violation;
use crate::migrations::entity_table_ddl;
use crate::retry::{RetryConfig, is_transient_lock_error};
use crate::tracker::{ChangeTracker, TrackedChange, WriteTarget, summarize};

/// Result of a successful commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Entity rows inserted, updated or deleted.
    pub written: usize,
    /// Audit entries persisted with the writes, in tracking order.
    pub audit_entries: Vec<AuditEntry>,
    /// Attempts taken, including the successful one.
    pub attempts: u32,
}

/// The pre-commit view of one attempt.
struct CommitAttempt {
    mutations: Vec<PendingMutation>,
    targets: Vec<WriteTarget>,
    records: Vec<AuditEntry>,
}

impl CommitAttempt {
    fn new(changes: Vec<TrackedChange>) -> Self {
        let (mutations, targets) = changes
            .into_iter()
            .map(|change| (change.mutation, change.target))
            .unzip();
        Self {
            mutations,
            targets,
            records: Vec::new(),
        }
    }

    fn has_writes(&self) -> bool {
        self.mutations.iter().any(|m| m.kind.is_write())
    }
}

impl UnitOfWorkContext for CommitAttempt {
    fn pending_mutations(&self) -> &[PendingMutation] {
        &self.mutations
    }

    fn resolve_primary_key(&self, mutation: &PendingMutation) -> Option<KeyValue> {
        self.mutations
            .iter()
            .position(|m| std::ptr::eq(m, mutation))
            .and_then(|idx| self.targets[idx].key.clone())
    }

    fn add_pending_record(&mut self, record: AuditEntry) {
        self.records.push(record);
    }
}

/// Tracks entity changes and commits them atomically with whatever records
/// the registered hooks attach.
pub struct UnitOfWork<'db> {
    db: &'db TallyDb,
    tracker: ChangeTracker,
    hooks: Vec<Arc<dyn PreCommitHook>>,
}

impl<'db> UnitOfWork<'db> {
    #[must_use]
    pub fn new(db: &'db TallyDb) -> Self {
        Self {
            db,
            tracker: ChangeTracker::new(),
            hooks: Vec::new(),
        }
    }

    /// Register a pre-commit hook. Hooks run in registration order.
    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn PreCommitHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    #[must_use]
    pub const fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    /// Track a new entity for insertion.
    ///
    /// # Errors
    ///
    /// See [`ChangeTracker::add`].
    pub fn add<E: Entity>(&mut self, entity: &E) -> Result<(), DatabaseError> {
        self.tracker.add(entity)
    }

    /// Track an entity as currently stored.
    ///
    /// # Errors
    ///
    /// See [`ChangeTracker::attach`].
    pub fn attach<E: Entity>(&mut self, entity: &E) -> Result<(), DatabaseError> {
        self.tracker.attach(entity)
    }

    /// Mark a tracked entity modified with new values.
    ///
    /// # Errors
    ///
    /// See [`ChangeTracker::update`].
    pub fn update<E: Entity>(&mut self, entity: &E) -> Result<(), DatabaseError> {
        self.tracker.update(entity)
    }

    /// Mark a tracked entity for deletion.
    ///
    /// # Errors
    ///
    /// See [`ChangeTracker::remove`].
    pub fn remove<E: Entity>(&mut self, entity: &E) -> Result<(), DatabaseError> {
        self.tracker.remove(entity)
    }

    /// Read an entity from storage and start tracking it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the read fails or the stored document does
    /// not deserialize.
    pub async fn load<E: Entity>(&mut self, key: &KeyValue) -> Result<Option<E>, DatabaseError> {
        let found = self.db.find::<E>(key).await?;
        if let Some(entity) = &found {
            self.tracker.attach(entity)?;
        }
        Ok(found)
    }

    /// Commit once.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Capture` if a hook aborts the attempt,
    /// `DatabaseError::Conflict` if a target row is missing or a key collides,
    /// or the underlying libSQL error. Nothing is persisted on error.
    pub async fn commit(
        &mut self,
        identity: &IdentityContext,
    ) -> Result<CommitOutcome, DatabaseError> {
        let outcome = self.attempt(identity).await?;
        self.tracker.accept_changes();
        Ok(CommitOutcome {
            attempts: 1,
            ..outcome
        })
    }

    /// Commit, retrying transient lock errors per `retry`.
    ///
    /// Each retry is a complete new attempt: hooks run again and produce a
    /// fresh set of records.
    ///
    /// # Errors
    ///
    /// As [`UnitOfWork::commit`], after the last attempt.
    pub async fn commit_with_retry(
        &mut self,
        identity: &IdentityContext,
        retry: &RetryConfig,
    ) -> Result<CommitOutcome, DatabaseError> {
        let mut attempt = 1;
        loop {
            match self.attempt(identity).await {
                Ok(outcome) => {
                    self.tracker.accept_changes();
                    return Ok(CommitOutcome {
                        attempts: attempt,
                        ..outcome
                    });
                }
                Err(e) if attempt < retry.max_attempts && is_transient_lock_error(&e) => {
                    let delay = retry.delay_for(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts = retry.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "commit: transient lock error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn attempt(&self, identity: &IdentityContext) -> Result<CommitOutcome, DatabaseError> {
        let mut attempt = CommitAttempt::new(self.tracker.snapshot());

        for hook in &self.hooks {
            let mut event = CommitEvent {
                context: Some(&mut attempt),
                identity,
            };
            if let Err(e) = hook.before_commit(&mut event) {
                tracing::warn!(hook = hook.name(), error = %e, "commit: pre-commit hook failed");
                return Err(e.into());
            }
        }

        if !attempt.has_writes() && attempt.records.is_empty() {
            return Ok(CommitOutcome::default());
        }

        for record in &attempt.records {
            if let Err(e) = self.db.schema().validate_entry(record) {
                tracing::warn!(
                    entity = %record.entity_name,
                    error = %e,
                    "commit: audit entry failed schema validation"
                );
            }
        }

        let tx = self.db.conn().transaction().await?;
        match apply(&tx, &attempt).await {
            Ok(written) => {
                tx.commit().await?;
                let (inserted, updated, deleted) = summarize(&attempt.mutations);
                tracing::info!(
                    inserted,
                    updated,
                    deleted,
                    audit_entries = attempt.records.len(),
                    correlation_id = %identity.correlation_id,
                    "commit: transaction committed"
                );
                Ok(CommitOutcome {
                    written,
                    audit_entries: attempt.records,
                    attempts: 1,
                })
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(error = %rollback, "commit: rollback failed");
                }
                tracing::warn!(error = %e, "commit: rolled back, audit entries discarded");
                Err(e)
            }
        }
    }
}

/// Apply entity writes then audit inserts. Returns the number of entity rows written.
async fn apply(conn: &libsql::Connection, attempt: &CommitAttempt) -> Result<usize, DatabaseError> {
    let tables: BTreeSet<&str> = attempt
        .mutations
        .iter()
        .zip(&attempt.targets)
        .filter(|(m, _)| m.kind.is_write())
        .map(|(_, t)| t.table)
        .collect();
    for table in tables {
        conn.execute(&entity_table_ddl(table), ()).await?;
    }

    let mut written = 0;
    for (mutation, target) in attempt.mutations.iter().zip(&attempt.targets) {
        if write_entity(conn, mutation, target).await? {
            written += 1;
        }
    }

    for record in &attempt.records {
        insert_audit_entry(conn, record).await?;
    }
    Ok(written)
}

async fn write_entity(
    conn: &libsql::Connection,
    mutation: &PendingMutation,
    target: &WriteTarget,
) -> Result<bool, DatabaseError> {
    let table = target.table;
    let key = target.key.as_ref().map(ToString::to_string);
    let conflict = |reason: &str| DatabaseError::Conflict {
        entity: mutation.entity.name.to_string(),
        key: key.clone().unwrap_or_default(),
        reason: reason.to_string(),
    };

    match mutation.kind {
        MutationKind::Unchanged => Ok(false),
        MutationKind::Insert => {
            let body = serde_json::to_string(&mutation.current_values())?;
            conn.execute(
                &format!("INSERT INTO {table} (entity_key, body) VALUES (?1, ?2)"),
                libsql::params![key.as_deref(), body.as_str()],
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    conflict("an entity with this key already exists")
                } else {
                    e.into()
                }
            })?;
            Ok(true)
        }
        MutationKind::Update => {
            let body = serde_json::to_string(&mutation.current_values())?;
            let stored = stored_key(mutation, target)?;
            let rows = conn
                .execute(
                    &format!("UPDATE {table} SET entity_key = ?1, body = ?2 WHERE entity_key = ?3"),
                    libsql::params![key.as_deref(), body.as_str(), stored.as_str()],
                )
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        conflict("the new key is taken by another entity")
                    } else {
                        e.into()
                    }
                })?;
            if rows == 0 {
                return Err(conflict("row no longer exists"));
            }
            Ok(true)
        }
        MutationKind::Delete => {
            let stored = stored_key(mutation, target)?;
            let rows = conn
                .execute(
                    &format!("DELETE FROM {table} WHERE entity_key = ?1"),
                    [stored.as_str()],
                )
                .await?;
            if rows == 0 {
                return Err(conflict("row no longer exists"));
            }
            Ok(true)
        }
    }
}

fn stored_key(mutation: &PendingMutation, target: &WriteTarget) -> Result<String, DatabaseError> {
    target
        .stored_key
        .as_ref()
        .map(ToString::to_string)
        .ok_or_else(|| {
            DatabaseError::InvalidState(format!(
                "{} {} has no stored key",
                mutation.kind, mutation.entity
            ))
        })
}
