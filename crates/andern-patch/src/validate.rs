//! Structural validation of a patch against a document.

use serde_json::Value;

use crate::apply::apply_operation;
use crate::types::{Operation, PatchError};

/// Checks that `patch` would apply cleanly to `doc`.
///
/// Operations are checked in order against a scratch copy, so an operation
/// may rely on the effects of the ones before it. Empty batches are invalid.
///
/// ```
/// use andern_patch::{validate, Operation, PatchError};
/// use serde_json::json;
///
/// let doc = json!({"foo": "bar"});
/// assert!(validate(&[Operation::replace("/foo", json!("qux"))], &doc).is_ok());
/// assert_eq!(
///     validate(&[Operation::remove("/foo/x/3")], &doc),
///     Err(PatchError::NotFound),
/// );
/// ```
pub fn validate(patch: &[Operation], doc: &Value) -> Result<(), PatchError> {
    if patch.is_empty() {
        return Err(PatchError::EmptyPatch);
    }
    let mut scratch = doc.clone();
    for op in patch {
        apply_operation(&mut scratch, op)?;
    }
    Ok(())
}

/// Boolean form of [`validate`].
pub fn is_valid(patch: &[Operation], doc: &Value) -> bool {
    validate(patch, doc).is_ok()
}
