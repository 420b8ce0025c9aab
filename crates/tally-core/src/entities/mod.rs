//! Entity structs for Tally.
//!
//! `AuditEntry` is the record the capture engine produces. `Book` is the
//! reference auditable domain entity used by the CLI and end-to-end tests.
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema`.

mod audit;
mod book;

pub use audit::AuditEntry;
pub use book::Book;
