mod common;

use std::cell::RefCell;
use std::rc::Rc;

use andern::{create_echo, Identifier, Message, Operation, Patch, PersistError, PersistedNode};
use common::{record, InlineSpawner};
use serde_json::json;

type Log = Rc<RefCell<Vec<Patch>>>;

fn peer(medium: &Rc<andern::Subject<Message>>, name: &str) -> (PersistedNode, Log) {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let l = log.clone();
    let node = PersistedNode::with_identifier(
        json!({"foo": "bar", "baz": [{"fluff": 42}]}),
        move |patch: Patch| {
            l.borrow_mut().push(patch);
            async { Ok::<(), PersistError>(()) }
        },
        medium.clone(),
        InlineSpawner,
        Identifier::from(name),
    );
    (node, log)
}

#[test]
fn only_the_author_persists_a_shared_write() {
    let medium = create_echo::<Message>();
    let (a, a_log) = peer(&medium, "a");
    let (b, b_log) = peer(&medium, "b");
    let a_values = record(&a);
    let b_values = record(&b);

    a.child("/baz/0").set("/fluff", 43);

    let expected = vec![Operation::replace("/baz/0/fluff", json!(43))];
    assert_eq!(*a_log.borrow(), vec![expected.clone()]);
    assert!(b_log.borrow().is_empty());
    assert_eq!(a_values.last(), b_values.last());
    assert_eq!(b.value()["baz"][0]["fluff"], json!(43));

    b.set("/foo", "from b");

    assert_eq!(a_log.borrow().len(), 1);
    assert_eq!(*b_log.borrow(), vec![vec![Operation::replace("/foo", json!("from b"))]]);
    assert_eq!(a.value()["foo"], json!("from b"));
}

#[test]
fn messages_on_the_medium_carry_the_author() {
    let medium = create_echo::<Message>();
    let wire = record(&medium);
    let (a, _log) = peer(&medium, "a");

    a.remove("/foo");

    let sent = wire.values();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].sender, Identifier::from("a"));
    assert_eq!(a.identifier().as_str(), "a");
    assert_eq!(
        serde_json::to_value(&sent[0]).expect("message must serialize"),
        json!({"sender": "a", "patch": [{"op": "remove", "path": "/foo"}]})
    );
}

#[test]
fn terminal_signals_stay_off_the_medium() {
    use andern::{NodeError, Observer};

    let medium = create_echo::<Message>();
    let wire = record(&medium);
    let (a, _log) = peer(&medium, "a");

    a.error(NodeError::external(common::TransportDown));
    a.complete();

    assert_eq!(wire.error_count(), 0);
    assert_eq!(wire.completion_count(), 0);
    assert!(!medium.is_terminated());
}

#[test]
fn unobserved_nodes_do_not_persist() {
    let medium = create_echo::<Message>();
    let (a, a_log) = peer(&medium, "a");
    a.set("/foo", 1);
    assert!(a_log.borrow().is_empty());

    let _values = record(&a);
    a.set("/foo", 2);
    assert_eq!(a_log.borrow().len(), 1);
}

#[test]
fn fresh_identifiers_are_unique_per_node() {
    let medium = create_echo::<Message>();
    let persist = |_: Patch| async { Ok::<(), PersistError>(()) };
    let a = PersistedNode::new(json!({}), persist, medium.clone(), InlineSpawner);
    let b = PersistedNode::new(json!({}), persist, medium, InlineSpawner);
    assert_ne!(a.identifier(), b.identifier());
}
