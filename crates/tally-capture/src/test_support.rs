//! Shared test fixtures: extra entity types and an in-memory unit of work.

use serde::{Deserialize, Serialize};
use tally_core::entities::AuditEntry;
use tally_core::entity::{Auditable, Entity, EntityRef, KeyValue};
use tally_core::mutation::PendingMutation;

use crate::context::UnitOfWorkContext;

/// Auditable, string-keyed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
}

impl Entity for Author {
    const NAME: &'static str = "Author";
    const TABLE: &'static str = "authors";
    const KEY: &'static [&'static str] = &["id"];
}

impl Auditable for Author {}

/// Not auditable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub book_id: i64,
    pub number: i64,
    pub text: String,
}

impl Entity for Page {
    const NAME: &'static str = "Page";
    const TABLE: &'static str = "pages";
    const KEY: &'static [&'static str] = &["book_id", "number"];
}

/// Auditable and keyless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memo {
    pub text: String,
}

impl Entity for Memo {
    const NAME: &'static str = "Memo";
    const TABLE: &'static str = "memos";
    const KEY: &'static [&'static str] = &[];
}

impl Auditable for Memo {}

/// Unit of work backed by plain vectors.
#[derive(Debug, Default)]
pub struct InMemoryContext {
    mutations: Vec<PendingMutation>,
    keys: Vec<Option<KeyValue>>,
    pub added: Vec<AuditEntry>,
}

impl InMemoryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, mutation: PendingMutation, key: Option<KeyValue>) -> Self {
        self.mutations.push(mutation);
        self.keys.push(key);
        self
    }

    pub fn insert<E: Entity>(self, entity: &E) -> Self {
        let fields = entity.fields().unwrap();
        let key = KeyValue::from_fields(E::KEY, &fields);
        self.push(PendingMutation::insert(EntityRef::of::<E>(), &fields), key)
    }

    pub fn update<E: Entity>(self, before: &E, after: &E) -> Self {
        let original = before.fields().unwrap();
        let current = after.fields().unwrap();
        let key = KeyValue::from_fields(E::KEY, &current);
        self.push(
            PendingMutation::update(EntityRef::of::<E>(), &original, &current),
            key,
        )
    }

    pub fn delete<E: Entity>(self, entity: &E) -> Self {
        let fields = entity.fields().unwrap();
        let key = KeyValue::from_fields(E::KEY, &fields);
        self.push(PendingMutation::delete(EntityRef::of::<E>(), &fields), key)
    }

    pub fn unchanged<E: Entity>(self, entity: &E) -> Self {
        let fields = entity.fields().unwrap();
        let key = KeyValue::from_fields(E::KEY, &fields);
        self.push(PendingMutation::unchanged(EntityRef::of::<E>(), &fields), key)
    }
}

impl UnitOfWorkContext for InMemoryContext {
    fn pending_mutations(&self) -> &[PendingMutation] {
        &self.mutations
    }

    fn resolve_primary_key(&self, mutation: &PendingMutation) -> Option<KeyValue> {
        self.mutations
            .iter()
            .position(|m| std::ptr::eq(m, mutation))
            .and_then(|i| self.keys[i].clone())
    }

    fn add_pending_record(&mut self, record: AuditEntry) {
        self.added.push(record);
    }
}
