//! Writable nodes.

use std::cell::RefCell;
use std::rc::Rc;

use andern_patch::{diff, parse_pointer_relaxed, prefix_patch, IntoPatch, Operation, Patch, Path};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::channel::{Bundle, Channel, Observable, Observer, Stream, Subscription};
use crate::error::NodeError;
use crate::readonly::ReadOnlyNode;

/// A [`ReadOnlyNode`] that can also write.
///
/// Writes never touch the snapshot directly. They are pushed into the
/// channel the node was built on and take effect once the resulting batch
/// comes back through the node's inbound stream, exactly as a write from
/// any other party would.
///
/// ```
/// use andern::{create_root, ObservableExt};
/// use serde_json::json;
/// use std::{cell::RefCell, rc::Rc};
///
/// let root = create_root(json!({"foo": "bar"}));
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let s = seen.clone();
/// root.child("/foo").subscribe_fn(move |v| s.borrow_mut().push(v));
///
/// root.set("/foo", "qux");
/// assert_eq!(*seen.borrow(), vec![json!("bar"), json!("qux")]);
/// ```
#[derive(Clone)]
pub struct Node {
    base: ReadOnlyNode,
    upstream: Rc<dyn Observer<Patch>>,
}

impl Node {
    /// A node reading from and writing to `channel`.
    pub fn new<C: Channel<Patch> + 'static>(initial: Value, channel: C) -> Self {
        let channel = Rc::new(channel);
        let downstream: Rc<dyn Observable<Patch>> = channel.clone();
        Self::from_parts(initial, Stream::from_rc(downstream), channel)
    }

    /// A node whose inbound patches and outbound writes travel separately.
    pub fn from_parts(
        initial: Value,
        downstream: Stream<Patch>,
        upstream: Rc<dyn Observer<Patch>>,
    ) -> Self {
        Self {
            base: ReadOnlyNode::new(initial, downstream),
            upstream,
        }
    }

    pub(crate) fn with_cell(
        value: Rc<RefCell<Value>>,
        downstream: Stream<Patch>,
        upstream: Rc<dyn Observer<Patch>>,
    ) -> Self {
        Self {
            base: ReadOnlyNode::with_cell(value, downstream),
            upstream,
        }
    }

    /// This node as a patch channel: subscribing yields the applied
    /// patches, pushing sends patches the way [`patch`](Self::patch) does.
    pub fn channel(&self) -> Bundle<Patch> {
        Bundle::from_parts(Rc::new(self.base.patches()), self.upstream.clone())
    }

    // ── Writes ──────────────────────────────────────────────────────────

    /// Pushes one operation or a batch. Empty batches are not sent.
    pub fn patch(&self, patch: impl IntoPatch) -> &Self {
        let patch = patch.into_patch();
        if !patch.is_empty() {
            self.upstream.next(patch);
        }
        self
    }

    /// Replaces the value at `path`.
    pub fn set(&self, path: &str, value: impl Into<Value>) -> &Self {
        self.patch(Operation::replace(path, value.into()))
    }

    pub fn remove(&self, path: &str) -> &Self {
        self.patch(Operation::remove(path))
    }

    // ── Derivation ──────────────────────────────────────────────────────

    /// A writable node scoped to `path`.
    ///
    /// The child sees this node's patches at or below `path`, relative to
    /// it, and the new value of `path` when an ancestor is rewritten. Its writes are lifted back to this node's coordinates and sent
    /// through this node's channel. `error` and `complete` on the child go
    /// nowhere.
    pub fn child(&self, path: &str) -> Node {
        let mount = parse_pointer_relaxed(path);
        let upstream = Rc::new(MountedSink {
            parent: self.upstream.clone(),
            mount: mount.clone(),
        });
        Node {
            base: self.base.child_at(mount),
            upstream,
        }
    }

    /// A read-only view of `path`.
    pub fn read(&self, path: &str) -> ReadOnlyNode {
        self.base.child(path)
    }

    pub fn as_read_only(&self) -> &ReadOnlyNode {
        &self.base
    }

    // ── Snapshot ────────────────────────────────────────────────────────

    pub fn value(&self) -> Value {
        self.base.value()
    }

    pub fn with_value<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        self.base.with_value(f)
    }

    pub fn value_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        self.base.value_as()
    }

    pub fn patches(&self) -> Stream<Patch> {
        self.base.patches()
    }
}

impl Observable<Value> for Node {
    fn subscribe(&self, observer: Rc<dyn Observer<Value>>) -> Subscription {
        self.base.subscribe(observer)
    }
}

/// Whole values pushed into a node are reconciled into a patch against the
/// current snapshot. Terminal signals go to the node's channel.
impl Observer<Value> for Node {
    fn next(&self, value: Value) {
        let patch = self.with_value(|current| diff(current, &value));
        self.patch(patch);
    }

    fn error(&self, err: NodeError) {
        self.upstream.error(err)
    }

    fn complete(&self) {
        self.upstream.complete()
    }
}

struct MountedSink {
    parent: Rc<dyn Observer<Patch>>,
    mount: Path,
}

impl Observer<Patch> for MountedSink {
    fn next(&self, patch: Patch) {
        self.parent.next(prefix_patch(&patch, &self.mount))
    }

    fn error(&self, _err: NodeError) {}

    fn complete(&self) {}
}
