mod common;

use andern::{create_echo, Observer, Operation, Patch, SafeNode};
use common::record;
use serde_json::json;

fn safe_root() -> SafeNode {
    SafeNode::new(json!({"foo": "bar", "baz": [{"fluff": 42}]}), create_echo::<Patch>())
}

#[test]
fn invalid_patch_is_dropped_silently_and_later_patches_apply() {
    let root = safe_root();
    let all = record(&root);
    let foo = record(&root.child("/foo"));

    root.patch(Operation::remove("/foo/x/3"));

    assert_eq!(all.values().len(), 1);
    assert_eq!(all.error_count() + foo.error_count(), 0);
    assert_eq!(root.value(), json!({"foo": "bar", "baz": [{"fluff": 42}]}));

    root.set("/foo", "qux");
    assert_eq!(foo.values(), vec![json!("bar"), json!("qux")]);
}

#[test]
fn validation_uses_the_snapshot_at_receipt() {
    let echo = create_echo::<Patch>();
    let root = SafeNode::new(json!({}), echo.clone());
    let all = record(&root);

    // Valid only once the first batch has been applied.
    let second = vec![Operation::replace("/a", json!(2))];
    echo.next(second.clone());
    echo.next(vec![Operation::add("/a", json!(1))]);
    echo.next(second);

    assert_eq!(all.values(), vec![json!({}), json!({"a": 1}), json!({"a": 2})]);
}

#[test]
fn children_of_a_safe_node_write_through_the_gate() {
    let root = safe_root();
    let all = record(&root);
    let fluff = root.child("/baz/0/fluff");

    fluff.set("", 43);
    root.child("/baz/7").set("/fluff", 1);

    assert_eq!(all.values().len(), 2);
    assert_eq!(root.value()["baz"], json!([{"fluff": 43}]));
}

#[test]
fn failing_test_operations_reject_the_whole_batch() {
    let root = safe_root();
    let all = record(&root);
    root.patch(vec![
        Operation::test("/foo", json!("not bar")),
        Operation::replace("/foo", json!("qux")),
    ]);
    assert_eq!(all.values().len(), 1);

    root.patch(vec![
        Operation::test("/foo", json!("bar")),
        Operation::replace("/foo", json!("qux")),
    ]);
    assert_eq!(root.value()["foo"], json!("qux"));
}

#[test]
fn whole_value_reconciliation_passes_validation() {
    let root = safe_root();
    let _all = record(&root);
    root.next(json!({"foo": [1, 2], "extra": {"deep": true}}));
    assert_eq!(root.value(), json!({"foo": [1, 2], "extra": {"deep": true}}));
}
