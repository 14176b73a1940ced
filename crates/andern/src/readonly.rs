//! Read-only reactive projection of a document.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use andern_patch::{apply_patch, lookup, parse_pointer_relaxed, scope_patch, Operation, Patch, Path};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{error, trace};

use crate::channel::{Observable, Observer, Stream, Subscription};
use crate::error::NodeError;

/// A document snapshot kept current by a stream of patches.
///
/// Every incoming batch is applied to the snapshot exactly once, however
/// many subscribers are attached, and then rebroadcast on
/// [`patches`](Self::patches). Subscribers observe whole values: the current
/// snapshot immediately on subscribing, then the new snapshot after each
/// applied batch.
///
/// Patches are only pulled while something is subscribed to the node or to
/// one of its children. An unobserved root does not advance. An unobserved
/// child re-reads its sub-document from its parent whenever it is read or
/// starts being observed.
///
/// If a batch cannot be applied the broadcast terminates with
/// [`NodeError::Apply`] for every current subscriber of this node and its
/// children. A root keeps its last good value and a later subscriber
/// reconnects to the source.
#[derive(Clone)]
pub struct ReadOnlyNode {
    value: Rc<RefCell<Value>>,
    patches: Stream<Patch>,
    /// Set while the broadcast is connected to its source.
    live: Rc<Cell<bool>>,
    origin: Option<Rc<Origin>>,
}

/// Where a child's snapshot comes from.
struct Origin {
    parent: ReadOnlyNode,
    mount: Path,
}

impl Origin {
    fn lookup(&self) -> Value {
        self.parent.with_value(|parent| lookup(parent, &self.mount))
    }
}

impl ReadOnlyNode {
    pub fn new(initial: Value, stream: Stream<Patch>) -> Self {
        Self::with_cell(Rc::new(RefCell::new(initial)), stream)
    }

    /// Builds a node around an existing snapshot cell, letting callers
    /// inspect the live snapshot from inside `stream` itself.
    pub(crate) fn with_cell(value: Rc<RefCell<Value>>, stream: Stream<Patch>) -> Self {
        Self::assemble(value, stream, None)
    }

    fn assemble(
        value: Rc<RefCell<Value>>,
        stream: Stream<Patch>,
        origin: Option<Rc<Origin>>,
    ) -> Self {
        let live = Rc::new(Cell::new(false));
        let source = Stream::new(Connect {
            source: stream,
            value: value.clone(),
            live: live.clone(),
            origin: origin.clone(),
        });
        Self {
            patches: broadcast(value.clone(), source),
            value,
            live,
            origin,
        }
    }

    /// The current snapshot.
    pub fn value(&self) -> Value {
        self.with_value(Value::clone)
    }

    /// Borrows the current snapshot without cloning it.
    pub fn with_value<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        self.sync();
        f(&self.value.borrow())
    }

    /// Deserializes the current snapshot into `T`.
    pub fn value_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        self.with_value(|value| T::deserialize(value))
    }

    /// The applied patches, as rebroadcast after each batch.
    pub fn patches(&self) -> Stream<Patch> {
        self.patches.clone()
    }

    /// A read-only node tracking the sub-document at `path`.
    pub fn child(&self, path: &str) -> ReadOnlyNode {
        self.child_at(parse_pointer_relaxed(path))
    }

    /// Same as [`child`](Self::child).
    pub fn read(&self, path: &str) -> ReadOnlyNode {
        self.child(path)
    }

    /// A child fed by this node's broadcast narrowed to `mount`.
    ///
    /// Batches leaving nothing visible below `mount` are dropped, as is a
    /// whole-document replace that would not change the child's snapshot.
    pub(crate) fn child_at(&self, mount: Path) -> ReadOnlyNode {
        let origin = Rc::new(Origin {
            parent: self.clone(),
            mount,
        });
        let cell = Rc::new(RefCell::new(origin.lookup()));

        let parent = self.value.clone();
        let snapshot = cell.clone();
        let scoping = origin.clone();
        let stream = self.patches.filter_map(move |patch: Patch| {
            let mount = &scoping.mount;
            let scoped = scope_patch(&patch, mount, &parent.borrow());
            match scoped.as_slice() {
                [] => return None,
                [Operation::Replace { path, value }]
                    if path.is_empty() && *value == *snapshot.borrow() =>
                {
                    trace!(mount = ?mount, "ancestor write left child unchanged");
                    return None;
                }
                _ => {}
            }
            trace!(ops = scoped.len(), mount = ?mount, "scoped batch for child");
            Some(scoped)
        });

        Self::assemble(cell, stream, Some(origin))
    }

    /// Reloads an unobserved child from its parent.
    fn sync(&self) {
        if self.live.get() {
            return;
        }
        if let Some(origin) = &self.origin {
            let current = origin.lookup();
            *self.value.borrow_mut() = current;
        }
    }
}

/// Marks the node live for as long as its broadcast is connected, reloading
/// a child's snapshot from its parent on each connect.
struct Connect {
    source: Stream<Patch>,
    value: Rc<RefCell<Value>>,
    live: Rc<Cell<bool>>,
    origin: Option<Rc<Origin>>,
}

impl Observable<Patch> for Connect {
    fn subscribe(&self, observer: Rc<dyn Observer<Patch>>) -> Subscription {
        if let Some(origin) = &self.origin {
            let current = origin.lookup();
            *self.value.borrow_mut() = current;
        }
        self.live.set(true);
        let live = self.live.clone();
        let connection = Subscription::new(move || live.set(false));
        connection.add_subscription(self.source.subscribe(observer));
        connection
    }
}

fn broadcast(value: Rc<RefCell<Value>>, stream: Stream<Patch>) -> Stream<Patch> {
    stream
        .pipe::<Patch>(move |patch, down| {
            let current = value.borrow().clone();
            match apply_patch(current, &patch) {
                Ok(next) => {
                    *value.borrow_mut() = next;
                    trace!(ops = patch.len(), "applied batch");
                    down.next(patch);
                }
                Err(err) => {
                    let ops: Vec<_> = patch.iter().map(Operation::op_name).collect();
                    error!(%err, ?ops, "patch could not be applied; terminating broadcast");
                    down.error(NodeError::Apply(err));
                }
            }
        })
        .share()
}

impl Observable<Value> for ReadOnlyNode {
    fn subscribe(&self, observer: Rc<dyn Observer<Value>>) -> Subscription {
        observer.next(self.value());
        let value = self.value.clone();
        self.patches
            .map(move |_| value.borrow().clone())
            .subscribe(observer)
    }
}
