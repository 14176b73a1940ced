//! JSON Patch routines backing andern document nodes.
//!
//! - [`pointer`]: JSON Pointer (RFC 6901) paths and lookup.
//! - [`Operation`] / [`Patch`]: the RFC 6902 wire vocabulary.
//! - [`apply_patch`], [`validate`], [`diff`]: apply, check and derive patches.
//! - [`scope_patch`] / [`prefix_patch`]: move patches between a document and
//!   a sub-document mounted at some path.
//!
//! # Example
//!
//! ```
//! use andern_patch::{apply_patch, diff, Operation};
//! use serde_json::json;
//!
//! let doc = json!({"foo": "bar", "baz": [{"fluff": 42}]});
//! let doc = apply_patch(doc, &[Operation::replace("/baz/0/fluff", json!(43))]).unwrap();
//! assert_eq!(doc["baz"][0]["fluff"], json!(43));
//!
//! let back = diff(&doc, &json!({"foo": "bar", "baz": [{"fluff": 42}]}));
//! assert_eq!(back, vec![Operation::replace("/baz/0/fluff", json!(42))]);
//! ```

pub mod apply;
pub mod diff;
pub mod pointer;
pub mod scope;
pub mod types;
pub mod validate;

pub use apply::{apply_operation, apply_patch};
pub use diff::diff;
pub use pointer::{format_pointer, lookup, parse_pointer, parse_pointer_relaxed, Path, PointerError};
pub use scope::{prefix_patch, scope_patch};
pub use types::{from_json, to_json, IntoPatch, Operation, Patch, PatchError};
pub use validate::{is_valid, validate};
