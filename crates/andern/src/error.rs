//! Error signals carried by channels.

use std::error::Error;
use std::rc::Rc;

use andern_patch::PatchError;
use thiserror::Error;

/// The terminal error a channel delivers to its subscribers.
///
/// Cloneable so one failure can be multicast to every subscriber.
#[derive(Debug, Clone, Error)]
pub enum NodeError {
    /// A patch could not be applied to a node's snapshot; the node's
    /// broadcast terminates with this error.
    #[error("patch could not be applied: {0}")]
    Apply(#[from] PatchError),
    /// An error pushed into a channel from outside, passed through untouched.
    #[error("{0}")]
    External(Rc<dyn Error>),
}

impl NodeError {
    pub fn external(err: impl Error + 'static) -> Self {
        NodeError::External(Rc::new(err))
    }

    /// The patch failure behind this error, if any.
    pub fn as_patch_error(&self) -> Option<&PatchError> {
        match self {
            NodeError::Apply(err) => Some(err),
            NodeError::External(_) => None,
        }
    }
}
