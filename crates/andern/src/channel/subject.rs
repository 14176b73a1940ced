use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::{Observable, Observer, Subscription};
use crate::error::NodeError;

#[derive(Clone)]
enum Terminal {
    Error(NodeError),
    Complete,
}

struct SubjectState<T> {
    next_id: u64,
    observers: BTreeMap<u64, Rc<dyn Observer<T>>>,
    terminal: Option<Terminal>,
}

/// A plain multicast channel: every value pushed in is delivered, in order
/// and synchronously, to every current subscriber.
///
/// Once errored or completed it stays terminated: later pushes are ignored
/// and late subscribers receive the terminal signal immediately.
pub struct Subject<T> {
    state: Rc<RefCell<SubjectState<T>>>,
}

impl<T> Default for Subject<T> {
    fn default() -> Self {
        Self {
            state: Rc::new(RefCell::new(SubjectState {
                next_id: 1,
                observers: BTreeMap::new(),
                terminal: None,
            })),
        }
    }
}

impl<T: Clone + 'static> Subject<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observer_count(&self) -> usize {
        self.state.borrow().observers.len()
    }

    pub fn is_terminated(&self) -> bool {
        self.state.borrow().terminal.is_some()
    }

    fn snapshot(&self) -> Vec<(u64, Rc<dyn Observer<T>>)> {
        self.state
            .borrow()
            .observers
            .iter()
            .map(|(id, obs)| (*id, obs.clone()))
            .collect()
    }

    fn is_subscribed(&self, id: u64) -> bool {
        self.state.borrow().observers.contains_key(&id)
    }

    fn terminate(&self, terminal: Terminal) {
        let observers = {
            let mut state = self.state.borrow_mut();
            if state.terminal.is_some() {
                return;
            }
            state.terminal = Some(terminal.clone());
            std::mem::take(&mut state.observers)
        };
        for observer in observers.into_values() {
            deliver(&*observer, &terminal);
        }
    }
}

fn deliver<T>(observer: &dyn Observer<T>, terminal: &Terminal) {
    match terminal {
        Terminal::Error(err) => observer.error(err.clone()),
        Terminal::Complete => observer.complete(),
    }
}

impl<T: Clone + 'static> Observable<T> for Subject<T> {
    fn subscribe(&self, observer: Rc<dyn Observer<T>>) -> Subscription {
        let id = {
            let mut state = self.state.borrow_mut();
            if let Some(terminal) = state.terminal.clone() {
                drop(state);
                deliver(&*observer, &terminal);
                return Subscription::closed();
            }
            let id = state.next_id;
            state.next_id = state.next_id.saturating_add(1);
            state.observers.insert(id, observer);
            id
        };
        let state = Rc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = state.upgrade() {
                state.borrow_mut().observers.remove(&id);
            }
        })
    }
}

impl<T: Clone + 'static> Observer<T> for Subject<T> {
    fn next(&self, value: T) {
        if self.is_terminated() {
            return;
        }
        for (id, observer) in self.snapshot() {
            // Skip observers that unsubscribed while this value was in flight.
            if self.is_subscribed(id) {
                observer.next(value.clone());
            }
        }
    }

    fn error(&self, err: NodeError) {
        self.terminate(Terminal::Error(err));
    }

    fn complete(&self) {
        self.terminate(Terminal::Complete);
    }
}

/// A fresh, behaviourless multicast channel; the default root transport.
pub fn create_echo<T: Clone + 'static>() -> Rc<Subject<T>> {
    Rc::new(Subject::new())
}
