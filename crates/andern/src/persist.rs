//! Nodes bridged to a shared message medium with write-through persistence.
//!
//! Every [`PersistedNode`] tags its writes with its own [`Identifier`] and
//! sends them as [`Message`]s on a medium shared with its peers. All peers
//! apply every message they receive; only the author of a message hands its
//! patch to the persistence callback.

use std::error::Error;
use std::fmt;
use std::future::Future;
use std::ops::Deref;
use std::rc::Rc;

use andern_patch::Patch;
use futures_util::future::{FutureExt, LocalBoxFuture};
use futures_util::task::{LocalSpawn, LocalSpawnExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::channel::{Channel, Observable, Observer, Stream, Subscription};
use crate::error::NodeError;
use crate::node::Node;

// ── Wire types ──────────────────────────────────────────────────────────────

/// Opaque tag naming the node that authored a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// A fresh random identifier.
    pub fn random() -> Self {
        Identifier(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Identifier(s)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Identifier(s.to_string())
    }
}

/// A patch tagged with its author, as carried on the shared medium.
///
/// Serializes as `{"sender": "...", "patch": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Identifier,
    pub patch: Patch,
}

// ── Persistence ─────────────────────────────────────────────────────────────

pub type PersistError = Box<dyn Error>;

/// Durable storage for patches a node authored.
pub trait Persist {
    fn persist(&self, patch: Patch) -> LocalBoxFuture<'static, Result<(), PersistError>>;
}

impl<F, Fut> Persist for F
where
    F: Fn(Patch) -> Fut,
    Fut: Future<Output = Result<(), PersistError>> + 'static,
{
    fn persist(&self, patch: Patch) -> LocalBoxFuture<'static, Result<(), PersistError>> {
        self(patch).boxed_local()
    }
}

// ── Node ────────────────────────────────────────────────────────────────────

/// A [`Node`] reading and writing [`Message`]s on a shared medium.
///
/// Persistence runs on `spawner` and is never awaited by the node: the
/// patch is applied as soon as the message arrives, whatever becomes of
/// the persisted copy. Failures are logged and otherwise ignored.
///
/// Like every node, a `PersistedNode` only pulls from the medium while it
/// or one of its children is subscribed to.
#[derive(Clone)]
pub struct PersistedNode {
    node: Node,
    identifier: Identifier,
}

impl PersistedNode {
    pub fn new<P, C, S>(initial: Value, persist: P, channel: C, spawner: S) -> Self
    where
        P: Persist + 'static,
        C: Channel<Message> + 'static,
        S: LocalSpawn + 'static,
    {
        Self::with_identifier(initial, persist, channel, spawner, Identifier::random())
    }

    pub fn with_identifier<P, C, S>(
        initial: Value,
        persist: P,
        channel: C,
        spawner: S,
        identifier: Identifier,
    ) -> Self
    where
        P: Persist + 'static,
        C: Channel<Message> + 'static,
        S: LocalSpawn + 'static,
    {
        let channel = Rc::new(channel);
        let source: Rc<dyn Observable<Message>> = channel.clone();

        let own = identifier.clone();
        let downstream = Stream::from_rc(source)
            .inspect(move |message: &Message| {
                if message.sender == own {
                    debug!(sender = %own, ops = message.patch.len(), "persisting own write");
                    schedule(&spawner, persist.persist(message.patch.clone()));
                }
            })
            .map(|message: Message| message.patch);

        let upstream = Rc::new(MessageSink {
            medium: channel,
            sender: identifier.clone(),
        });
        Self {
            node: Node::from_parts(initial, downstream, upstream),
            identifier,
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn into_node(self) -> Node {
        self.node
    }
}

fn schedule(
    spawner: &impl LocalSpawn,
    persisting: LocalBoxFuture<'static, Result<(), PersistError>>,
) {
    let spawned = spawner.spawn_local(async move {
        if let Err(err) = persisting.await {
            warn!(%err, "persisting patch failed");
        }
    });
    if let Err(err) = spawned {
        warn!(%err, "could not spawn persistence task");
    }
}

impl Deref for PersistedNode {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.node
    }
}

impl Observable<Value> for PersistedNode {
    fn subscribe(&self, observer: Rc<dyn Observer<Value>>) -> Subscription {
        self.node.subscribe(observer)
    }
}

impl Observer<Value> for PersistedNode {
    fn next(&self, value: Value) {
        self.node.next(value)
    }

    fn error(&self, err: NodeError) {
        self.node.error(err)
    }

    fn complete(&self) {
        self.node.complete()
    }
}

/// Wraps outgoing patches as messages from `sender`. Terminal signals stay
/// off the shared medium.
struct MessageSink {
    medium: Rc<dyn Observer<Message>>,
    sender: Identifier,
}

impl Observer<Patch> for MessageSink {
    fn next(&self, patch: Patch) {
        self.medium.next(Message {
            sender: self.sender.clone(),
            patch,
        })
    }

    fn error(&self, _err: NodeError) {}

    fn complete(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{create_echo, ObservableExt};
    use andern_patch::Operation;
    use futures_util::future::LocalFutureObj;
    use futures_util::task::SpawnError;
    use serde_json::json;
    use std::cell::RefCell;
    use tracing_test::traced_test;

    struct Inline;

    impl LocalSpawn for Inline {
        fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
            let _ = future.now_or_never();
            Ok(())
        }
    }

    #[test]
    fn message_wire_shape() {
        let message = Message {
            sender: Identifier::from("a"),
            patch: vec![Operation::replace("/foo", json!(1))],
        };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"sender": "a", "patch": [{"op": "replace", "path": "/foo", "value": 1}]})
        );
    }

    #[test]
    fn random_identifiers_differ() {
        assert_ne!(Identifier::random(), Identifier::random());
    }

    #[test]
    fn writes_are_tagged_with_the_identifier() {
        let medium = create_echo::<Message>();
        let sent = Rc::new(RefCell::new(Vec::new()));
        let s = sent.clone();
        medium.subscribe_fn(move |m| s.borrow_mut().push(m));

        let node = PersistedNode::with_identifier(
            json!({}),
            |_: Patch| async { Ok::<(), PersistError>(()) },
            medium.clone(),
            Inline,
            Identifier::from("me"),
        );
        node.set("", json!({"x": 1}));
        assert_eq!(sent.borrow()[0].sender.as_str(), "me");
    }

    #[test]
    #[traced_test]
    fn persistence_failures_are_logged_not_propagated() {
        let medium = create_echo::<Message>();
        let node = PersistedNode::new(
            json!({"n": 0}),
            |_: Patch| async { Err::<(), PersistError>("disk full".into()) },
            medium,
            Inline,
        );
        node.subscribe_fn(|_| {});
        node.set("/n", 1);
        assert_eq!(node.value(), json!({"n": 1}));
        assert!(logs_contain("persisting patch failed"));
    }

    #[test]
    fn foreign_messages_are_applied_without_persisting() {
        let medium = create_echo::<Message>();
        let persisted = Rc::new(RefCell::new(Vec::<Patch>::new()));
        let p = persisted.clone();
        let node = PersistedNode::new(
            json!({"n": 0}),
            move |patch: Patch| {
                p.borrow_mut().push(patch);
                async { Ok::<(), PersistError>(()) }
            },
            medium.clone(),
            Inline,
        );
        node.subscribe_fn(|_| {});
        medium.next(Message {
            sender: Identifier::from("someone else"),
            patch: vec![Operation::replace("/n", json!(5))],
        });
        assert_eq!(node.value(), json!({"n": 5}));
        assert!(persisted.borrow().is_empty());
    }
}
