//! Structural diff: the patch that turns one document into another.

use serde_json::{Map, Value};

use crate::types::{Operation, Patch};

/// Generates a patch transforming `src` into `dst`.
///
/// Equal documents produce an empty patch.
pub fn diff(src: &Value, dst: &Value) -> Patch {
    let mut ops = Vec::new();
    diff_at(&mut ops, &mut Vec::new(), src, dst);
    ops
}

fn diff_at(ops: &mut Patch, path: &mut Vec<String>, src: &Value, dst: &Value) {
    if src == dst {
        return;
    }
    match (src, dst) {
        (Value::Object(s), Value::Object(d)) => diff_obj(ops, path, s, d),
        (Value::Array(s), Value::Array(d)) => diff_arr(ops, path, s, d),
        _ => ops.push(Operation::Replace {
            path: path.clone(),
            value: dst.clone(),
        }),
    }
}

fn child_path(path: &[String], key: impl Into<String>) -> Vec<String> {
    let mut p = path.to_vec();
    p.push(key.into());
    p
}

fn diff_obj(ops: &mut Patch, path: &mut Vec<String>, src: &Map<String, Value>, dst: &Map<String, Value>) {
    for key in src.keys() {
        if !dst.contains_key(key) {
            ops.push(Operation::Remove { path: child_path(path, key.as_str()) });
        }
    }
    for (key, dst_val) in dst {
        match src.get(key) {
            None => ops.push(Operation::Add {
                path: child_path(path, key.as_str()),
                value: dst_val.clone(),
            }),
            Some(src_val) => {
                path.push(key.clone());
                diff_at(ops, path, src_val, dst_val);
                path.pop();
            }
        }
    }
}

fn diff_arr(ops: &mut Patch, path: &mut Vec<String>, src: &[Value], dst: &[Value]) {
    let common = src.len().min(dst.len());
    for i in 0..common {
        path.push(i.to_string());
        diff_at(ops, path, &src[i], &dst[i]);
        path.pop();
    }
    // Trailing removals go from the end so indices stay valid.
    for i in (common..src.len()).rev() {
        ops.push(Operation::Remove { path: child_path(path, i.to_string()) });
    }
    for (i, value) in dst.iter().enumerate().skip(common) {
        ops.push(Operation::Add {
            path: child_path(path, i.to_string()),
            value: value.clone(),
        });
    }
}
