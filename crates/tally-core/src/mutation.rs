//! Pending mutation snapshots handed to the audit engine.
//!
//! A snapshot is built fresh by the unit of work for every commit attempt and
//! is read-only to everything downstream of it.

use serde_json::Value;

use crate::entity::{EntityRef, Fields};
use crate::enums::MutationKind;

/// One field of a pending mutation: its value before and after, and whether it changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingField {
    pub name: String,
    pub original: Value,
    pub current: Value,
    pub is_modified: bool,
}

/// A tracked entity about to be written (or left alone) by a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMutation {
    pub entity: EntityRef,
    pub kind: MutationKind,
    /// Fields in declaration order.
    pub fields: Vec<PendingField>,
}

impl PendingMutation {
    /// Snapshot of a newly added entity. Every field is new.
    #[must_use]
    pub fn insert(entity: EntityRef, current: &Fields) -> Self {
        let fields = current
            .iter()
            .map(|(name, value)| PendingField {
                name: name.clone(),
                original: Value::Null,
                current: value.clone(),
                is_modified: true,
            })
            .collect();
        Self {
            entity,
            kind: MutationKind::Insert,
            fields,
        }
    }

    /// Snapshot of a modified entity, flagging each field whose value differs.
    ///
    /// Field order follows `current`; fields only present in `original` are
    /// appended after it with a null current value.
    #[must_use]
    pub fn update(entity: EntityRef, original: &Fields, current: &Fields) -> Self {
        let mut fields: Vec<PendingField> = current
            .iter()
            .map(|(name, value)| {
                let before = original.get(name).cloned().unwrap_or(Value::Null);
                PendingField {
                    name: name.clone(),
                    is_modified: before != *value,
                    original: before,
                    current: value.clone(),
                }
            })
            .collect();
        for (name, value) in original {
            if !current.contains_key(name) {
                fields.push(PendingField {
                    name: name.clone(),
                    original: value.clone(),
                    current: Value::Null,
                    is_modified: !value.is_null(),
                });
            }
        }
        Self {
            entity,
            kind: MutationKind::Update,
            fields,
        }
    }

    /// Snapshot of an entity marked for deletion.
    #[must_use]
    pub fn delete(entity: EntityRef, original: &Fields) -> Self {
        Self::with_values(entity, MutationKind::Delete, original)
    }

    /// Snapshot of a tracked entity with no pending write.
    #[must_use]
    pub fn unchanged(entity: EntityRef, fields: &Fields) -> Self {
        Self::with_values(entity, MutationKind::Unchanged, fields)
    }

    fn with_values(entity: EntityRef, kind: MutationKind, values: &Fields) -> Self {
        let fields = values
            .iter()
            .map(|(name, value)| PendingField {
                name: name.clone(),
                original: value.clone(),
                current: value.clone(),
                is_modified: false,
            })
            .collect();
        Self {
            entity,
            kind,
            fields,
        }
    }

    /// Number of fields flagged as changed.
    #[must_use]
    pub fn changed_count(&self) -> usize {
        self.fields.iter().filter(|f| f.is_modified).count()
    }

    /// Current-value document (what the row looks like after the commit).
    #[must_use]
    pub fn current_values(&self) -> Fields {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.current.clone()))
            .collect()
    }
}
