//! Channel composition.
//!
//! A [`Channel`] is a duplex endpoint: an [`Observable`] that any number of
//! subscribers can attach to, and an [`Observer`] that accepts `next`,
//! `error` and `complete` signals. [`Subject`] (see [`create_echo`]) is the
//! behaviourless case where both sides are the same multicast medium;
//! [`bundle`] wires a producer and an unrelated sink into one channel.
//!
//! Everything here is single-threaded and synchronous: a value pushed into
//! a channel reaches every subscriber before the push returns.

mod bundle;
mod observer;
mod share;
mod stream;
mod subject;
mod subscription;

use std::rc::Rc;

pub use bundle::{bundle, Bundle};
pub use observer::{observer, FnObserver};
pub use stream::Stream;
pub use subject::{create_echo, Subject};
pub use subscription::Subscription;

use crate::error::NodeError;

/// The sink side of a channel.
pub trait Observer<T> {
    fn next(&self, value: T);
    fn error(&self, err: NodeError);
    fn complete(&self);
}

/// The producing side of a channel.
pub trait Observable<T> {
    fn subscribe(&self, observer: Rc<dyn Observer<T>>) -> Subscription;
}

/// Producer and sink in one value.
pub trait Channel<T>: Observable<T> + Observer<T> {}

impl<T, C: Observable<T> + Observer<T> + ?Sized> Channel<T> for C {}

impl<T, O: Observer<T> + ?Sized> Observer<T> for Rc<O> {
    fn next(&self, value: T) {
        (**self).next(value)
    }

    fn error(&self, err: NodeError) {
        (**self).error(err)
    }

    fn complete(&self) {
        (**self).complete()
    }
}

impl<T, O: Observable<T> + ?Sized> Observable<T> for Rc<O> {
    fn subscribe(&self, observer: Rc<dyn Observer<T>>) -> Subscription {
        (**self).subscribe(observer)
    }
}

/// Subscription conveniences for every [`Observable`].
pub trait ObservableExt<T>: Observable<T> {
    /// Subscribes a closure to values only; errors and completion are ignored.
    fn subscribe_fn(&self, on_next: impl Fn(T) + 'static) -> Subscription
    where
        T: 'static,
    {
        self.subscribe(Rc::new(observer(on_next)))
    }

    fn subscribe_with(&self, observer: impl Observer<T> + 'static) -> Subscription {
        self.subscribe(Rc::new(observer))
    }
}

impl<T, O: Observable<T> + ?Sized> ObservableExt<T> for O {}
