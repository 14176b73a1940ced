use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

type Teardown = Box<dyn FnOnce()>;

#[derive(Default)]
struct Inner {
    closed: Cell<bool>,
    teardowns: RefCell<Vec<Teardown>>,
}

/// Handle to a live subscription.
///
/// Clones share the same underlying subscription. Dropping a handle does
/// not unsubscribe; call [`Subscription::unsubscribe`].
#[derive(Clone, Default)]
pub struct Subscription {
    inner: Rc<Inner>,
}

impl Subscription {
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        let sub = Self::default();
        sub.add(teardown);
        sub
    }

    /// A subscription that is already closed.
    pub fn closed() -> Self {
        let sub = Self::default();
        sub.inner.closed.set(true);
        sub
    }

    /// Registers extra teardown work; runs it at once if already closed.
    pub fn add(&self, teardown: impl FnOnce() + 'static) {
        if self.is_closed() {
            teardown();
        } else {
            self.inner.teardowns.borrow_mut().push(Box::new(teardown));
        }
    }

    /// Ties `other` to this subscription's lifetime.
    pub fn add_subscription(&self, other: Subscription) {
        self.add(move || other.unsubscribe());
    }

    /// Runs every teardown once. Idempotent.
    pub fn unsubscribe(&self) {
        if self.inner.closed.replace(true) {
            return;
        }
        let teardowns = std::mem::take(&mut *self.inner.teardowns.borrow_mut());
        for teardown in teardowns {
            teardown();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.get()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}
