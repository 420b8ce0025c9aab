//! Field-level diff construction.

use serde_json::Value;
use tally_core::audit_detail::ChangedFieldMap;
use tally_core::enums::MutationKind;
use tally_core::mutation::PendingMutation;

use crate::error::CaptureError;

/// Build the changed-field map for one pending mutation.
///
/// - Insert: every field, `old` null.
/// - Update: only fields flagged as modified.
/// - Delete: every field, `new` null.
///
/// Callers filter out updates with no modified field before calling this.
/// Field order follows the mutation's field order.
///
/// # Errors
///
/// Returns `CaptureError::UnsupportedMutation` for any other mutation kind.
pub fn build_diff(mutation: &PendingMutation) -> Result<ChangedFieldMap, CaptureError> {
    let mut diff = ChangedFieldMap::new();
    match mutation.kind {
        MutationKind::Insert => {
            for field in &mutation.fields {
                diff.insert(&field.name, Value::Null, field.current.clone());
            }
        }
        MutationKind::Update => {
            for field in mutation.fields.iter().filter(|f| f.is_modified) {
                diff.insert(&field.name, field.original.clone(), field.current.clone());
            }
        }
        MutationKind::Delete => {
            for field in &mutation.fields {
                diff.insert(&field.name, field.original.clone(), Value::Null);
            }
        }
        kind @ MutationKind::Unchanged => {
            return Err(CaptureError::UnsupportedMutation {
                entity: mutation.entity.name.to_string(),
                kind,
            });
        }
    }
    Ok(diff)
}
