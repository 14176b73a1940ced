//! Patch application (RFC 6902).

use serde_json::Value;

use crate::pointer::{get, get_mut, parse_index, starts_with};
use crate::types::{Operation, PatchError};

// ── Individual operations ─────────────────────────────────────────────────

fn split_last(path: &[String]) -> Option<(&[String], &String)> {
    let (last, parent) = path.split_last()?;
    Some((parent, last))
}

fn parent_mut<'a>(doc: &'a mut Value, parent: &[String]) -> Result<&'a mut Value, PatchError> {
    get_mut(doc, parent).ok_or(PatchError::NotFound)
}

fn apply_add(doc: &mut Value, path: &[String], value: Value) -> Result<(), PatchError> {
    let Some((parent, key)) = split_last(path) else {
        *doc = value;
        return Ok(());
    };
    match parent_mut(doc, parent)? {
        Value::Object(map) => {
            map.insert(key.clone(), value);
            Ok(())
        }
        Value::Array(arr) => {
            if key == "-" {
                arr.push(value);
                return Ok(());
            }
            let idx = parse_index(key).ok_or(PatchError::InvalidIndex)?;
            if idx > arr.len() {
                return Err(PatchError::InvalidIndex);
            }
            arr.insert(idx, value);
            Ok(())
        }
        _ => Err(PatchError::InvalidTarget),
    }
}

fn apply_remove(doc: &mut Value, path: &[String]) -> Result<Value, PatchError> {
    // Removing the whole document leaves nothing behind: observed as null.
    let Some((parent, key)) = split_last(path) else {
        return Ok(std::mem::take(doc));
    };
    match parent_mut(doc, parent)? {
        Value::Object(map) => map.remove(key).ok_or(PatchError::NotFound),
        Value::Array(arr) => {
            let idx = parse_index(key).ok_or(PatchError::InvalidIndex)?;
            if idx >= arr.len() {
                return Err(PatchError::NotFound);
            }
            Ok(arr.remove(idx))
        }
        _ => Err(PatchError::InvalidTarget),
    }
}

fn apply_replace(doc: &mut Value, path: &[String], value: Value) -> Result<(), PatchError> {
    let target = get_mut(doc, path).ok_or(PatchError::NotFound)?;
    *target = value;
    Ok(())
}

fn apply_copy(doc: &mut Value, path: &[String], from: &[String]) -> Result<(), PatchError> {
    let value = get(doc, from).ok_or(PatchError::NotFound)?.clone();
    apply_add(doc, path, value)
}

fn apply_move(doc: &mut Value, path: &[String], from: &[String]) -> Result<(), PatchError> {
    if path == from {
        return get(doc, from).map(|_| ()).ok_or(PatchError::NotFound);
    }
    if starts_with(path, from) {
        return Err(PatchError::InvalidTarget);
    }
    let value = apply_remove(doc, from)?;
    apply_add(doc, path, value)
}

fn apply_test(doc: &Value, path: &[String], value: &Value) -> Result<(), PatchError> {
    let actual = get(doc, path).ok_or(PatchError::NotFound)?;
    if json_equal(actual, value) {
        Ok(())
    } else {
        Err(PatchError::Test)
    }
}

/// JSON equality: numbers compare by value, so `1` equals `1.0`.
fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => match (x.as_u64(), y.as_u64()) {
                (Some(x), Some(y)) => x == y,
                _ => x.as_f64() == y.as_f64(),
            },
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, v)| y.get(k).is_some_and(|w| json_equal(v, w)))
        }
        _ => a == b,
    }
}

// ── Public API ────────────────────────────────────────────────────────────

/// Applies a single operation in place.
///
/// On error `doc` may be partially modified; use [`apply_patch`] for
/// all-or-nothing semantics.
pub fn apply_operation(doc: &mut Value, op: &Operation) -> Result<(), PatchError> {
    match op {
        Operation::Add { path, value } => apply_add(doc, path, value.clone()),
        Operation::Remove { path } => apply_remove(doc, path).map(|_| ()),
        Operation::Replace { path, value } => apply_replace(doc, path, value.clone()),
        Operation::Copy { from, path } => apply_copy(doc, path, from),
        Operation::Move { from, path } => apply_move(doc, path, from),
        Operation::Test { path, value } => apply_test(doc, path, value),
    }
}

/// Applies a batch to `doc`, returning the new document.
///
/// The batch is atomic: either every operation applies and the new
/// document is returned, or the first failure is returned and the caller
/// keeps its previous snapshot.
pub fn apply_patch(mut doc: Value, patch: &[Operation]) -> Result<Value, PatchError> {
    for op in patch {
        apply_operation(&mut doc, op)?;
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn apply(doc: Value, ops: Vec<Operation>) -> Result<Value, PatchError> {
        apply_patch(doc, &ops)
    }

    #[test]
    fn add_sets_members_and_inserts_elements() {
        let doc = json!({"foo": "bar", "baz": [{"fluff": 42}]});
        let out = apply(
            doc,
            vec![
                Operation::add("/baz/1", json!({"fluff": 44})),
                Operation::add("/baz/0", json!(1)),
                Operation::add("/baz/-", json!(2)),
                Operation::add("/new", json!(true)),
            ],
        )
        .unwrap();
        assert_eq!(
            out,
            json!({"foo": "bar", "baz": [1, {"fluff": 42}, {"fluff": 44}, 2], "new": true})
        );
    }

    #[test]
    fn add_past_end_is_rejected() {
        let err = apply(json!([1]), vec![Operation::add("/5", json!(0))]).unwrap_err();
        assert_eq!(err, PatchError::InvalidIndex);
        let err = apply(json!([1]), vec![Operation::add("/01", json!(0))]).unwrap_err();
        assert_eq!(err, PatchError::InvalidIndex);
    }

    #[test]
    fn add_into_scalar_is_rejected() {
        let err = apply(json!({"foo": "bar"}), vec![Operation::add("/foo/x", json!(1))]).unwrap_err();
        assert_eq!(err, PatchError::InvalidTarget);
    }

    #[test]
    fn remove_requires_existing_target() {
        let doc = json!({"foo": "bar"});
        assert_eq!(
            apply(doc.clone(), vec![Operation::remove("/foo/x/3")]).unwrap_err(),
            PatchError::NotFound
        );
        assert_eq!(
            apply(doc.clone(), vec![Operation::remove("/nope")]).unwrap_err(),
            PatchError::NotFound
        );
        assert_eq!(apply(doc, vec![Operation::remove("/foo")]).unwrap(), json!({}));
    }

    #[test]
    fn removing_the_root_yields_null() {
        assert_eq!(apply(json!(42), vec![Operation::remove("")]).unwrap(), Value::Null);
    }

    #[test]
    fn replace_requires_existing_target() {
        let doc = json!({"foo": "bar", "baz": [1]});
        assert_eq!(
            apply(doc.clone(), vec![Operation::replace("/qux", json!(1))]).unwrap_err(),
            PatchError::NotFound
        );
        assert_eq!(
            apply(doc.clone(), vec![Operation::replace("/baz/1", json!(1))]).unwrap_err(),
            PatchError::NotFound
        );
        assert_eq!(
            apply(doc, vec![Operation::replace("", json!("whole"))]).unwrap(),
            json!("whole")
        );
    }

    #[test]
    fn move_and_copy() {
        let doc = json!({"a": {"b": 1}, "c": [1, 2]});
        let out = apply(
            doc,
            vec![Operation::copy("/a", "/d"), Operation::move_("/c/0", "/c/-")],
        )
        .unwrap();
        assert_eq!(out, json!({"a": {"b": 1}, "c": [2, 1], "d": {"b": 1}}));
    }

    #[test]
    fn move_into_own_child_is_rejected() {
        let err = apply(json!({"a": {"b": 1}}), vec![Operation::move_("/a", "/a/b/c")]).unwrap_err();
        assert_eq!(err, PatchError::InvalidTarget);
    }

    #[test]
    fn test_compares_values() {
        let doc = json!({"a": [1, 2]});
        assert!(apply(doc.clone(), vec![Operation::test("/a", json!([1, 2]))]).is_ok());
        assert_eq!(
            apply(doc.clone(), vec![Operation::test("/a", json!([2, 1]))]).unwrap_err(),
            PatchError::Test
        );
        assert_eq!(
            apply(doc, vec![Operation::test("/b", json!(null))]).unwrap_err(),
            PatchError::NotFound
        );
    }

    #[test]
    fn test_compares_numbers_by_value() {
        let doc = json!({"n": 1, "nested": {"xs": [2, 3.5]}});
        assert!(apply(doc.clone(), vec![Operation::test("/n", json!(1.0))]).is_ok());
        assert!(apply(doc.clone(), vec![Operation::test("/nested", json!({"xs": [2.0, 3.5]}))]).is_ok());
        assert_eq!(
            apply(doc, vec![Operation::test("/n", json!(1.5))]).unwrap_err(),
            PatchError::Test
        );
    }

    #[test]
    fn later_operations_see_earlier_ones() {
        let out = apply(
            json!({}),
            vec![
                Operation::add("/list", json!([])),
                Operation::add("/list/0", json!("x")),
                Operation::replace("/list/0", json!("y")),
            ],
        )
        .unwrap();
        assert_eq!(out, json!({"list": ["y"]}));
    }
}
