use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entity::{Auditable, Entity};

/// A catalogued book. Audited.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
}

impl Book {
    #[must_use]
    pub fn new(id: i64, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
        }
    }
}

impl Entity for Book {
    const NAME: &'static str = "Book";
    const TABLE: &'static str = "books";
    const KEY: &'static [&'static str] = &["id"];
}

impl Auditable for Book {}
