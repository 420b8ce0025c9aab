//! Capability registry deciding which entity types are audited.

use std::any::TypeId;
use std::collections::HashMap;

use tally_core::entity::{Auditable, EntityRef};

/// Set of entity types in audit scope.
///
/// Only types implementing [`Auditable`] can be included, so the capability is
/// checked at compile time and membership at runtime by `TypeId`.
#[derive(Debug, Clone, Default)]
pub struct AuditScope {
    types: HashMap<TypeId, &'static str>,
}

impl AuditScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn include<E: Auditable>(mut self) -> Self {
        self.insert::<E>();
        self
    }

    pub fn insert<E: Auditable>(&mut self) {
        let entity = EntityRef::of::<E>();
        self.types.insert(entity.type_id, entity.name);
    }

    #[must_use]
    pub fn contains(&self, entity: &EntityRef) -> bool {
        self.types.contains_key(&entity.type_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Names of the included entity types, sorted.
    #[must_use]
    pub fn entity_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.types.values().copied().collect();
        names.sort_unstable();
        names
    }
}
