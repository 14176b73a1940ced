use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::{Observable, Observer, Stream, Subject, Subscription};
use crate::error::NodeError;

struct ShareState<T> {
    /// Bumped on every reset so stale teardowns and observers become inert.
    generation: u64,
    subject: Option<Rc<Subject<T>>>,
    connection: Option<Subscription>,
    refcount: usize,
}

/// Reference-counted multicast over `source`.
///
/// The first subscriber connects to the source; the last one to leave
/// disconnects it. An error or completion from the source resets the share
/// so that a later subscriber reconnects.
pub(crate) struct Share<T> {
    source: Stream<T>,
    state: Rc<RefCell<ShareState<T>>>,
}

impl<T: Clone + 'static> Share<T> {
    pub(crate) fn new(source: Stream<T>) -> Self {
        Self {
            source,
            state: Rc::new(RefCell::new(ShareState {
                generation: 0,
                subject: None,
                connection: None,
                refcount: 0,
            })),
        }
    }
}

fn reset<T>(state: &RefCell<ShareState<T>>, generation: u64) -> Option<Subscription> {
    let mut st = state.borrow_mut();
    if st.generation != generation {
        return None;
    }
    st.generation = st.generation.wrapping_add(1);
    st.subject = None;
    st.refcount = 0;
    st.connection.take()
}

impl<T: Clone + 'static> Observable<T> for Share<T> {
    fn subscribe(&self, observer: Rc<dyn Observer<T>>) -> Subscription {
        let (subject, generation, connect) = {
            let mut st = self.state.borrow_mut();
            let subject = st.subject.get_or_insert_with(|| Rc::new(Subject::new())).clone();
            st.refcount += 1;
            (subject, st.generation, st.refcount == 1)
        };
        let inner = subject.subscribe(observer);

        if connect {
            let connection = self.source.subscribe(Rc::new(ShareObserver {
                subject,
                state: Rc::downgrade(&self.state),
                generation,
            }));
            let mut st = self.state.borrow_mut();
            if st.generation == generation {
                st.connection = Some(connection);
            } else {
                // The source terminated while connecting.
                drop(st);
                connection.unsubscribe();
            }
        }

        let state = Rc::downgrade(&self.state);
        Subscription::new(move || {
            inner.unsubscribe();
            let Some(state) = state.upgrade() else {
                return;
            };
            let connection = {
                let mut st = state.borrow_mut();
                if st.generation != generation {
                    return;
                }
                st.refcount = st.refcount.saturating_sub(1);
                if st.refcount > 0 {
                    return;
                }
                drop(st);
                reset(&state, generation)
            };
            if let Some(connection) = connection {
                connection.unsubscribe();
            }
        })
    }
}

struct ShareObserver<T> {
    subject: Rc<Subject<T>>,
    state: Weak<RefCell<ShareState<T>>>,
    generation: u64,
}

impl<T: Clone + 'static> ShareObserver<T> {
    fn disconnect(&self) {
        let connection = self
            .state
            .upgrade()
            .and_then(|state| reset(&state, self.generation));
        if let Some(connection) = connection {
            connection.unsubscribe();
        }
    }
}

impl<T: Clone + 'static> Observer<T> for ShareObserver<T> {
    fn next(&self, value: T) {
        self.subject.next(value)
    }

    fn error(&self, err: NodeError) {
        self.disconnect();
        self.subject.error(err)
    }

    fn complete(&self) {
        self.disconnect();
        self.subject.complete()
    }
}
