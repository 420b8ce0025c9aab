//! # tally-schema
//!
//! JSON Schemas for the durable artifacts Tally produces.
//!
//! Types are defined in `tally-core` with `#[derive(JsonSchema)]`; this crate
//! builds their schemas once and validates values against them. The store uses
//! it to check every audit entry before insert (warn-only).

pub mod error;
pub mod registry;

pub use error::SchemaError;
pub use registry::SchemaRegistry;
