//! Reactive JSON documents synchronised through JSON Patch channels.
//!
//! A document lives in a tree of nodes. Each node keeps a snapshot current
//! by applying the patches arriving on its inbound stream, and any node can
//! derive children scoped to a sub-path. Writes made on a child are lifted
//! back to its parent's coordinates, so an edit anywhere reaches every node
//! that can see the edited path.
//!
//! - [`ReadOnlyNode`]: observe a document and its sub-documents.
//! - [`Node`]: observe and write.
//! - [`SafeNode`]: a node that drops inbound patches failing validation.
//! - [`PersistedNode`]: a node on a shared message medium that persists
//!   only the writes it authored.
//!
//! ```
//! use andern::{create_root, ObservableExt};
//! use serde_json::json;
//! use std::{cell::RefCell, rc::Rc};
//!
//! let root = create_root(json!({"foo": "bar", "baz": [{"fluff": 42}]}));
//! let fluff = Rc::new(RefCell::new(Vec::new()));
//! let f = fluff.clone();
//! root.child("/baz/0/fluff").subscribe_fn(move |v| f.borrow_mut().push(v));
//!
//! root.set("/baz/0/fluff", 43);
//! root.set("/foo", "qux");
//! assert_eq!(*fluff.borrow(), vec![json!(42), json!(43)]);
//! ```

pub mod channel;
pub mod error;
pub mod node;
pub mod persist;
pub mod readonly;
pub mod safe;

pub use andern_patch::{IntoPatch, Operation, Patch, PatchError};
pub use channel::{
    bundle, create_echo, observer, Bundle, Channel, Observable, ObservableExt, Observer, Stream,
    Subject, Subscription,
};
pub use error::NodeError;
pub use node::Node;
pub use persist::{Identifier, Message, Persist, PersistError, PersistedNode};
pub use readonly::ReadOnlyNode;
pub use safe::SafeNode;

use serde_json::Value;

/// A root node on a fresh [`create_echo`] channel.
pub fn create_root(initial: impl Into<Value>) -> Node {
    Node::new(initial.into(), create_echo::<Patch>())
}
