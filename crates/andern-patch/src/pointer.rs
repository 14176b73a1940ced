//! JSON Pointer (RFC 6901) paths.
//!
//! Operations hold parsed [`Path`]s in memory and JSON Pointer strings on the
//! wire. Node mount points are parsed leniently (see
//! [`parse_pointer_relaxed`]) so `"foo"` and `"/foo"` address the same member.

use serde_json::Value;
use thiserror::Error;

/// A parsed JSON Pointer: one unescaped segment per reference token.
pub type Path = Vec<String>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("POINTER_INVALID: {0:?}")]
    Invalid(String),
}

/// Unescapes a single reference token (`~1` → `/`, then `~0` → `~`).
///
/// ```
/// use andern_patch::pointer::unescape;
///
/// assert_eq!(unescape("a~0b"), "a~b");
/// assert_eq!(unescape("c~1d"), "c/d");
/// ```
pub fn unescape(segment: &str) -> String {
    if !segment.contains('~') {
        return segment.to_string();
    }
    segment.replace("~1", "/").replace("~0", "~")
}

/// Escapes a single reference token (`~` → `~0`, then `/` → `~1`).
pub fn escape(segment: &str) -> String {
    if !segment.contains('/') && !segment.contains('~') {
        return segment.to_string();
    }
    segment.replace('~', "~0").replace('/', "~1")
}

/// Parses a JSON Pointer string.
///
/// The empty string is the document root. Any other pointer must start
/// with `/`.
///
/// ```
/// use andern_patch::pointer::parse_pointer;
///
/// assert_eq!(parse_pointer("").unwrap(), Vec::<String>::new());
/// assert_eq!(parse_pointer("/baz/0/fluff").unwrap(), vec!["baz", "0", "fluff"]);
/// assert!(parse_pointer("baz").is_err());
/// ```
pub fn parse_pointer(pointer: &str) -> Result<Path, PointerError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    if !pointer.starts_with('/') {
        return Err(PointerError::Invalid(pointer.to_string()));
    }
    Ok(pointer[1..].split('/').map(unescape).collect())
}

/// Parses a pointer that may omit its leading `/`.
pub fn parse_pointer_relaxed(pointer: &str) -> Path {
    if pointer.is_empty() {
        return Vec::new();
    }
    let body = pointer.strip_prefix('/').unwrap_or(pointer);
    body.split('/').map(unescape).collect()
}

/// Formats path segments as a JSON Pointer string; the root formats as `""`.
pub fn format_pointer(path: &[String]) -> String {
    let mut out = String::new();
    for segment in path {
        out.push('/');
        out.push_str(&escape(segment));
    }
    out
}

/// Resolves `path` inside `doc`.
pub fn get<'a>(doc: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(arr) => arr.get(parse_index(segment)?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable counterpart of [`get`].
pub fn get_mut<'a>(doc: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    let mut current = doc;
    for segment in path {
        current = match current {
            Value::Object(map) => map.get_mut(segment)?,
            Value::Array(arr) => arr.get_mut(parse_index(segment)?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Owned lookup: the value at `path`, or `null` when nothing is there.
pub fn lookup(doc: &Value, path: &[String]) -> Value {
    get(doc, path).cloned().unwrap_or(Value::Null)
}

/// Parses an array index token. Leading zeros and `-` are rejected.
pub fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || (segment.len() > 1 && segment.starts_with('0')) {
        return None;
    }
    if !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Whether `prefix` is a whole-segment prefix of `path` (or equal to it).
pub fn starts_with(path: &[String], prefix: &[String]) -> bool {
    path.len() >= prefix.len() && path[..prefix.len()] == *prefix
}

/// Strips `prefix` from `path` if it is a whole-segment prefix.
pub fn strip_prefix<'a>(path: &'a [String], prefix: &[String]) -> Option<&'a [String]> {
    if starts_with(path, prefix) {
        Some(&path[prefix.len()..])
    } else {
        None
    }
}

/// Concatenates `prefix` and `path`.
pub fn join(prefix: &[String], path: &[String]) -> Path {
    let mut out = Vec::with_capacity(prefix.len() + path.len());
    out.extend_from_slice(prefix);
    out.extend_from_slice(path);
    out
}

/// Serde adapter storing a [`Path`] as its JSON Pointer string.
pub mod serde_pointer {
    use super::{format_pointer, parse_pointer, Path};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_pointer(path))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Path, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_pointer(&raw).map_err(D::Error::custom)
    }
}
