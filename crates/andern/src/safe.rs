use std::cell::RefCell;
use std::ops::Deref;
use std::rc::Rc;

use andern_patch::{validate, Patch};
use serde_json::Value;
use tracing::debug;

use crate::channel::{Channel, Observable, Observer, Stream, Subscription};
use crate::error::NodeError;
use crate::node::Node;

/// A [`Node`] that drops inbound batches which do not validate against
/// its snapshot at the moment they arrive.
///
/// A dropped batch is never applied and never emitted; the sender is not
/// told. Outgoing writes are sent unchecked.
#[derive(Clone)]
pub struct SafeNode(Node);

impl SafeNode {
    pub fn new<C: Channel<Patch> + 'static>(initial: Value, channel: C) -> Self {
        let value = Rc::new(RefCell::new(initial));
        let channel = Rc::new(channel);
        let source: Rc<dyn Observable<Patch>> = channel.clone();

        let snapshot = value.clone();
        let admitted = Stream::from_rc(source).filter(move |patch: &Patch| {
            match validate(patch, &snapshot.borrow()) {
                Ok(()) => true,
                Err(err) => {
                    debug!(%err, ops = patch.len(), "dropping invalid batch");
                    false
                }
            }
        });
        SafeNode(Node::with_cell(value, admitted, channel))
    }

    pub fn into_node(self) -> Node {
        self.0
    }
}

impl Deref for SafeNode {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.0
    }
}

impl Observable<Value> for SafeNode {
    fn subscribe(&self, observer: Rc<dyn Observer<Value>>) -> Subscription {
        self.0.subscribe(observer)
    }
}

impl Observer<Value> for SafeNode {
    fn next(&self, value: Value) {
        self.0.next(value)
    }

    fn error(&self, err: NodeError) {
        self.0.error(err)
    }

    fn complete(&self) {
        self.0.complete()
    }
}
