//! Operation vocabulary and errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::pointer::{parse_pointer_relaxed, serde_pointer, Path};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    #[error("NOT_FOUND")]
    NotFound,
    #[error("TEST")]
    Test,
    #[error("INVALID_INDEX")]
    InvalidIndex,
    #[error("INVALID_TARGET")]
    InvalidTarget,
    #[error("EMPTY_PATCH")]
    EmptyPatch,
    #[error("INVALID_OP: {0}")]
    InvalidOp(String),
}

/// A single RFC 6902 operation.
///
/// Serializes to the standard JSON Patch object shape, e.g.
/// `{"op": "replace", "path": "/foo", "value": "qux"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Operation {
    Add {
        #[serde(with = "serde_pointer")]
        path: Path,
        value: Value,
    },
    Remove {
        #[serde(with = "serde_pointer")]
        path: Path,
    },
    Replace {
        #[serde(with = "serde_pointer")]
        path: Path,
        value: Value,
    },
    Move {
        #[serde(with = "serde_pointer")]
        from: Path,
        #[serde(with = "serde_pointer")]
        path: Path,
    },
    Copy {
        #[serde(with = "serde_pointer")]
        from: Path,
        #[serde(with = "serde_pointer")]
        path: Path,
    },
    Test {
        #[serde(with = "serde_pointer")]
        path: Path,
        value: Value,
    },
}

/// An ordered batch of operations applied atomically.
pub type Patch = Vec<Operation>;

impl Operation {
    pub fn add(path: &str, value: Value) -> Self {
        Operation::Add { path: parse_pointer_relaxed(path), value }
    }

    pub fn remove(path: &str) -> Self {
        Operation::Remove { path: parse_pointer_relaxed(path) }
    }

    pub fn replace(path: &str, value: Value) -> Self {
        Operation::Replace { path: parse_pointer_relaxed(path), value }
    }

    pub fn move_(from: &str, path: &str) -> Self {
        Operation::Move {
            from: parse_pointer_relaxed(from),
            path: parse_pointer_relaxed(path),
        }
    }

    pub fn copy(from: &str, path: &str) -> Self {
        Operation::Copy {
            from: parse_pointer_relaxed(from),
            path: parse_pointer_relaxed(path),
        }
    }

    pub fn test(path: &str, value: Value) -> Self {
        Operation::Test { path: parse_pointer_relaxed(path), value }
    }

    pub fn op_name(&self) -> &'static str {
        match self {
            Operation::Add { .. } => "add",
            Operation::Remove { .. } => "remove",
            Operation::Replace { .. } => "replace",
            Operation::Move { .. } => "move",
            Operation::Copy { .. } => "copy",
            Operation::Test { .. } => "test",
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Operation::Add { path, .. }
            | Operation::Remove { path }
            | Operation::Replace { path, .. }
            | Operation::Move { path, .. }
            | Operation::Copy { path, .. }
            | Operation::Test { path, .. } => path,
        }
    }

    /// Source location of `move` and `copy`.
    pub fn from(&self) -> Option<&Path> {
        match self {
            Operation::Move { from, .. } | Operation::Copy { from, .. } => Some(from),
            _ => None,
        }
    }

    /// Returns a copy of this operation with every location mapped by `f`.
    pub fn map_paths(&self, mut f: impl FnMut(&Path) -> Path) -> Self {
        match self {
            Operation::Add { path, value } => Operation::Add { path: f(path), value: value.clone() },
            Operation::Remove { path } => Operation::Remove { path: f(path) },
            Operation::Replace { path, value } => {
                Operation::Replace { path: f(path), value: value.clone() }
            }
            Operation::Move { from, path } => Operation::Move { from: f(from), path: f(path) },
            Operation::Copy { from, path } => Operation::Copy { from: f(from), path: f(path) },
            Operation::Test { path, value } => Operation::Test { path: f(path), value: value.clone() },
        }
    }
}

/// Anything that normalizes to a [`Patch`]: a single operation or a batch.
pub trait IntoPatch {
    fn into_patch(self) -> Patch;
}

impl IntoPatch for Operation {
    fn into_patch(self) -> Patch {
        vec![self]
    }
}

impl IntoPatch for Vec<Operation> {
    fn into_patch(self) -> Patch {
        self
    }
}

impl IntoPatch for &[Operation] {
    fn into_patch(self) -> Patch {
        self.to_vec()
    }
}

impl<const N: usize> IntoPatch for [Operation; N] {
    fn into_patch(self) -> Patch {
        self.into_iter().collect()
    }
}

/// Decodes a JSON Patch document.
pub fn from_json(value: &Value) -> Result<Patch, PatchError> {
    if !value.is_array() {
        return Err(PatchError::InvalidOp("patch must be an array".into()));
    }
    serde_json::from_value(value.clone()).map_err(|e| PatchError::InvalidOp(e.to_string()))
}

/// Encodes a patch as a JSON Patch document.
pub fn to_json(patch: &[Operation]) -> Value {
    Value::Array(
        patch
            .iter()
            .map(|op| serde_json::to_value(op).unwrap_or(Value::Null))
            .collect(),
    )
}
