//! # tally-capture
//!
//! Change-diff and audit-record construction engine.
//!
//! A unit of work exposes its pending mutations through [`UnitOfWorkContext`]
//! and runs every registered [`PreCommitHook`] once per commit attempt, before
//! it issues any write. [`AuditInterceptor`] is that hook: it filters the
//! snapshot down to auditable writes, builds a field diff for each
//! ([`diff::build_diff`]), assembles an `AuditEntry` ([`assemble::assemble`])
//! and adds the entries back into the same pending-write set so they commit,
//! or roll back, together with the mutations they describe.
//!
//! Everything in this crate is synchronous and performs no I/O.

pub mod assemble;
pub mod clock;
pub mod context;
pub mod diff;
pub mod error;
pub mod interceptor;
pub mod scope;

#[cfg(test)]
mod test_support;

pub use clock::{Clock, FixedClock, SystemClock};
pub use context::{CommitEvent, PreCommitHook, UnitOfWorkContext};
pub use error::CaptureError;
pub use interceptor::{AuditInterceptor, CaptureSettings};
pub use scope::AuditScope;
