//! Re-scoping patches between a document and one of its sub-paths.
//!
//! A sub-document mounted at `mount` sees the operations whose path lies at
//! or below `mount`, rewritten relative to it, and a whole-document replace
//! when something above the mount is rewritten. Writes made relative
//! to the mount are lifted back by prefixing every location with `mount`.

use serde_json::Value;

use crate::pointer::{get, join, lookup, starts_with, strip_prefix};
use crate::types::{Operation, Patch};

/// The part of `patch` visible below `mount`, relative to `mount`.
///
/// `after` is the full document once `patch` has been applied; it supplies
/// the value for a `move`/`copy` whose source lies outside the mount, which
/// is re-expressed as an `add`. A `move` leaving the mount becomes a
/// `remove` of its source. The result may be empty.
///
/// A batch that writes above the mount (at a proper prefix of it) scopes to
/// a single `replace` of the whole sub-document with its value in `after`,
/// `null` if the mount no longer resolves.
///
/// ```
/// use andern_patch::{scope_patch, Operation};
/// use serde_json::json;
///
/// let patch = vec![
///     Operation::replace("/foo", json!("qux")),
///     Operation::replace("/baz/0/fluff", json!(43)),
/// ];
/// let scoped = scope_patch(&patch, &["baz".to_string()], &json!({}));
/// assert_eq!(scoped, vec![Operation::replace("/0/fluff", json!(43))]);
/// ```
pub fn scope_patch(patch: &[Operation], mount: &[String], after: &Value) -> Patch {
    if patch.iter().any(|op| writes_above(op, mount)) {
        return vec![Operation::Replace {
            path: Vec::new(),
            value: lookup(after, mount),
        }];
    }
    patch
        .iter()
        .filter_map(|op| scope_operation(op, mount, after))
        .collect()
}

fn writes_above(op: &Operation, mount: &[String]) -> bool {
    let above = |p: &[String]| p.len() < mount.len() && starts_with(mount, p);
    match op {
        Operation::Test { .. } => false,
        Operation::Move { from, path } => above(from) || above(path),
        _ => above(op.path()),
    }
}

fn scope_operation(op: &Operation, mount: &[String], after: &Value) -> Option<Operation> {
    let inner = |p: &[String]| strip_prefix(p, mount).map(<[String]>::to_vec);
    match op {
        Operation::Move { from, path } => match (inner(from), inner(path)) {
            (Some(from), Some(path)) => Some(Operation::Move { from, path }),
            (None, Some(rel)) => Some(Operation::Add {
                value: destination_value(after, path),
                path: rel,
            }),
            (Some(from), None) => Some(Operation::Remove { path: from }),
            (None, None) => None,
        },
        Operation::Copy { from, path } => match (inner(from), inner(path)) {
            (Some(from), Some(path)) => Some(Operation::Copy { from, path }),
            (None, Some(rel)) => Some(Operation::Add {
                value: destination_value(after, path),
                path: rel,
            }),
            _ => None,
        },
        _ => {
            let rel = inner(op.path())?;
            Some(op.map_paths(|_| rel.clone()))
        }
    }
}

/// Value written at `path`, resolving a trailing `-` to the appended element.
fn destination_value(after: &Value, path: &[String]) -> Value {
    let resolved = match path.split_last() {
        Some((last, parent)) if last == "-" => get(after, parent)
            .and_then(Value::as_array)
            .and_then(|arr| arr.last()),
        _ => get(after, path),
    };
    resolved.cloned().unwrap_or(Value::Null)
}

/// Lifts a patch written relative to `mount` into the enclosing document.
pub fn prefix_patch(patch: &[Operation], mount: &[String]) -> Patch {
    patch
        .iter()
        .map(|op| op.map_paths(|p| join(mount, p)))
        .collect()
}
