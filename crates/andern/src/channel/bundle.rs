use std::rc::Rc;

use super::{Observable, Observer, Subscription};
use crate::error::NodeError;

/// A channel whose producing side and sink side are chosen independently.
///
/// Subscribing forwards to `producer` verbatim; `next`/`error`/`complete`
/// go to `sink`, never to `producer`.
pub struct Bundle<T> {
    producer: Rc<dyn Observable<T>>,
    sink: Rc<dyn Observer<T>>,
}

pub fn bundle<T>(
    producer: impl Observable<T> + 'static,
    sink: impl Observer<T> + 'static,
) -> Bundle<T> {
    Bundle {
        producer: Rc::new(producer),
        sink: Rc::new(sink),
    }
}

impl<T> Bundle<T> {
    pub fn from_parts(producer: Rc<dyn Observable<T>>, sink: Rc<dyn Observer<T>>) -> Self {
        Self { producer, sink }
    }
}

impl<T> Observable<T> for Bundle<T> {
    fn subscribe(&self, observer: Rc<dyn Observer<T>>) -> Subscription {
        self.producer.subscribe(observer)
    }
}

impl<T> Observer<T> for Bundle<T> {
    fn next(&self, value: T) {
        self.sink.next(value)
    }

    fn error(&self, err: NodeError) {
        self.sink.error(err)
    }

    fn complete(&self) {
        self.sink.complete()
    }
}
