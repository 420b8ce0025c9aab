//! # tally-core
//!
//! Core types shared across all Tally crates.
//!
//! This crate carries no I/O. It provides:
//! - The `Entity` and `Auditable` capability traits
//! - Mutation snapshot types handed to the audit engine by a unit of work
//! - The `AuditEntry` record and its `EventType`
//! - The changed-field map and the self-describing changes payload
//! - The explicit identity context threaded into every commit
//! - Cross-cutting error types

pub mod audit_detail;
pub mod entities;
pub mod entity;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod mutation;
