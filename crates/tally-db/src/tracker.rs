//! Change tracker: the snapshot provider behind a unit of work.
//!
//! Entities are tracked by type and key in the order they were first seen.
//! Tracking records the original field document at attach time, so an update
//! snapshot can flag exactly the fields that differ.

use tally_core::entity::{Entity, EntityRef, Fields, KeyValue};
use tally_core::enums::MutationKind;
use tally_core::mutation::PendingMutation;

use crate::error::DatabaseError;

/// Tracking state of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryState {
    Added,
    Unchanged,
    Modified,
    Deleted,
}

#[derive(Debug, Clone)]
struct TrackedEntry {
    entity: EntityRef,
    table: &'static str,
    key_fields: &'static [&'static str],
    /// Key the stored row is known under. `None` until the entity is persisted.
    stored_key: Option<KeyValue>,
    original: Fields,
    current: Fields,
    state: EntryState,
}

impl TrackedEntry {
    fn current_key(&self) -> Option<KeyValue> {
        KeyValue::from_fields(self.key_fields, &self.current)
    }

    fn matches(&self, entity: &EntityRef, key: &KeyValue) -> bool {
        self.entity == *entity
            && match self.state {
                EntryState::Added => self.current_key().as_ref() == Some(key),
                _ => self.stored_key.as_ref() == Some(key),
            }
    }
}

/// Where a commit writes one tracked entity. The document written is the
/// mutation's current values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteTarget {
    pub table: &'static str,
    /// Key of the existing row (update/delete).
    pub stored_key: Option<KeyValue>,
    /// Key after the write; the audit entity id.
    pub key: Option<KeyValue>,
}

/// One snapshot line: the mutation as the audit engine sees it, plus where
/// the store writes it.
#[derive(Debug, Clone)]
pub struct TrackedChange {
    pub mutation: PendingMutation,
    pub target: WriteTarget,
}

/// Tracks entity instances for one unit of work.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    entries: Vec<TrackedEntry>,
}

impl ChangeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new entity to be inserted.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if an entity of the same type and
    /// key is already tracked.
    pub fn add<E: Entity>(&mut self, entity: &E) -> Result<(), DatabaseError> {
        let fields = entity.fields()?;
        let entity_ref = EntityRef::of::<E>();
        if let Some(key) = KeyValue::from_fields(E::KEY, &fields) {
            if self.position(&entity_ref, &key).is_some() {
                return Err(DatabaseError::InvalidState(format!(
                    "{} '{key}' is already tracked",
                    E::NAME
                )));
            }
        }
        self.entries.push(TrackedEntry {
            entity: entity_ref,
            table: E::TABLE,
            key_fields: E::KEY,
            stored_key: None,
            original: Fields::new(),
            current: fields,
            state: EntryState::Added,
        });
        Ok(())
    }

    /// Track an entity as it currently exists in storage.
    ///
    /// Re-attaching an already tracked entity is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the entity has no key.
    pub fn attach<E: Entity>(&mut self, entity: &E) -> Result<(), DatabaseError> {
        let fields = entity.fields()?;
        let key = Self::require_key::<E>(&fields, "attach")?;
        let entity_ref = EntityRef::of::<E>();
        if self.position(&entity_ref, &key).is_some() {
            return Ok(());
        }
        self.entries.push(TrackedEntry {
            entity: entity_ref,
            table: E::TABLE,
            key_fields: E::KEY,
            stored_key: Some(key),
            original: fields.clone(),
            current: fields,
            state: EntryState::Unchanged,
        });
        Ok(())
    }

    /// Replace the current values of a tracked entity and mark it modified.
    ///
    /// The entity is located by its key. An added entity stays added.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the entity is keyless, not
    /// tracked, or already marked for deletion.
    pub fn update<E: Entity>(&mut self, entity: &E) -> Result<(), DatabaseError> {
        let fields = entity.fields()?;
        let key = Self::require_key::<E>(&fields, "update")?;
        let idx = self.require_tracked::<E>(&key)?;
        let entry = &mut self.entries[idx];
        match entry.state {
            EntryState::Deleted => {
                return Err(DatabaseError::InvalidState(format!(
                    "{} '{key}' is marked for deletion",
                    E::NAME
                )));
            }
            EntryState::Unchanged => entry.state = EntryState::Modified,
            EntryState::Added | EntryState::Modified => {}
        }
        entry.current = fields;
        Ok(())
    }

    /// Mark a tracked entity for deletion. Removing an added entity forgets it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the entity is keyless or not
    /// tracked.
    pub fn remove<E: Entity>(&mut self, entity: &E) -> Result<(), DatabaseError> {
        let fields = entity.fields()?;
        let key = Self::require_key::<E>(&fields, "remove")?;
        let idx = self.require_tracked::<E>(&key)?;
        if self.entries[idx].state == EntryState::Added {
            self.entries.remove(idx);
        } else {
            self.entries[idx].state = EntryState::Deleted;
        }
        Ok(())
    }

    /// Build a fresh snapshot for one commit attempt.
    ///
    /// Tracker state is not touched, so a failed attempt can snapshot again.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TrackedChange> {
        self.entries
            .iter()
            .map(|entry| {
                let mutation = match entry.state {
                    EntryState::Added => PendingMutation::insert(entry.entity, &entry.current),
                    EntryState::Modified => {
                        PendingMutation::update(entry.entity, &entry.original, &entry.current)
                    }
                    EntryState::Deleted => PendingMutation::delete(entry.entity, &entry.original),
                    EntryState::Unchanged => {
                        PendingMutation::unchanged(entry.entity, &entry.current)
                    }
                };
                let key = if entry.state == EntryState::Deleted {
                    entry.stored_key.clone()
                } else {
                    entry.current_key()
                };
                TrackedChange {
                    mutation,
                    target: WriteTarget {
                        table: entry.table,
                        stored_key: entry.stored_key.clone(),
                        key,
                    },
                }
            })
            .collect()
    }

    /// Whether a commit would write anything.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.entries.iter().any(|e| e.state != EntryState::Unchanged)
    }

    /// Fold a successful commit into tracking state.
    ///
    /// Added and modified entities become unchanged with their committed
    /// values as the new original; deleted entities are forgotten.
    pub fn accept_changes(&mut self) {
        self.entries.retain(|e| e.state != EntryState::Deleted);
        for entry in &mut self.entries {
            if entry.state == EntryState::Unchanged {
                continue;
            }
            entry.stored_key = entry.current_key();
            entry.original = entry.current.clone();
            entry.state = EntryState::Unchanged;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, entity: &EntityRef, key: &KeyValue) -> Option<usize> {
        self.entries.iter().position(|e| e.matches(entity, key))
    }

    fn require_key<E: Entity>(fields: &Fields, op: &str) -> Result<KeyValue, DatabaseError> {
        KeyValue::from_fields(E::KEY, fields).ok_or_else(|| {
            DatabaseError::InvalidState(format!(
                "cannot {op} {}: entity has no primary key value",
                E::NAME
            ))
        })
    }

    fn require_tracked<E: Entity>(&self, key: &KeyValue) -> Result<usize, DatabaseError> {
        self.position(&EntityRef::of::<E>(), key).ok_or_else(|| {
            DatabaseError::InvalidState(format!(
                "{} '{key}' is not tracked; load or attach it first",
                E::NAME
            ))
        })
    }
}

/// Insert, update and delete counts, for logging.
pub fn summarize<'a>(
    mutations: impl IntoIterator<Item = &'a PendingMutation>,
) -> (usize, usize, usize) {
    mutations
        .into_iter()
        .fold((0, 0, 0), |(i, u, d), m| match m.kind {
            MutationKind::Insert => (i + 1, u, d),
            MutationKind::Update => (i, u + 1, d),
            MutationKind::Delete => (i, u, d + 1),
            MutationKind::Unchanged => (i, u, d),
        })
}
