//! Shared fixtures for tally-db unit tests.

use serde::{Deserialize, Serialize};
use tally_capture::{AuditInterceptor, AuditScope, CaptureSettings};
use tally_core::entities::{AuditEntry, Book};
use tally_core::entity::{Auditable, Entity};
use tally_core::identity::IdentityContext;

use crate::TallyDb;
use crate::helpers::{AUDIT_COLUMNS, row_to_audit_entry};

/// Auditable and keyless.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    pub text: String,
}

impl Entity for Note {
    const NAME: &'static str = "Note";
    const TABLE: &'static str = "notes";
    const KEY: &'static [&'static str] = &[];
}

impl Auditable for Note {}

/// Not auditable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Shelf {
    pub code: String,
    pub label: String,
}

impl Entity for Shelf {
    const NAME: &'static str = "Shelf";
    const TABLE: &'static str = "shelves";
    const KEY: &'static [&'static str] = &["code"];
}

pub async fn test_db() -> TallyDb {
    TallyDb::open_local(":memory:").await.unwrap()
}

pub fn audit_interceptor() -> AuditInterceptor {
    AuditInterceptor::new(
        AuditScope::new().include::<Book>().include::<Note>(),
        CaptureSettings::default(),
    )
}

pub fn identity() -> IdentityContext {
    IdentityContext::new("alice", "cor-test")
}

pub async fn audit_rows(db: &TallyDb) -> Vec<AuditEntry> {
    let mut rows = db
        .conn()
        .query(
            &format!("SELECT {AUDIT_COLUMNS} FROM audit_entries ORDER BY id"),
            (),
        )
        .await
        .unwrap();
    let mut entries = Vec::new();
    while let Some(row) = rows.next().await.unwrap() {
        entries.push(row_to_audit_entry(&row).unwrap());
    }
    entries
}

pub async fn count_rows(db: &TallyDb, table: &str) -> i64 {
    let mut rows = db
        .conn()
        .query(&format!("SELECT COUNT(*) FROM {table}"), ())
        .await
        .unwrap();
    rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
}
