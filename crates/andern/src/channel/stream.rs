use std::rc::Rc;

use super::share::Share;
use super::{Observable, Observer, Subscription};
use crate::error::NodeError;

type Project<T, U> = dyn Fn(T, &dyn Observer<U>);

/// A shareable handle to a value producer, with stream operators.
///
/// Operators are lazy: nothing runs until a subscriber attaches, and each
/// subscriber gets its own pass through the pipeline unless the stream is
/// [`share`](Stream::share)d.
pub struct Stream<T> {
    source: Rc<dyn Observable<T>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self { source: self.source.clone() }
    }
}

impl<T: 'static> Stream<T> {
    pub fn new(source: impl Observable<T> + 'static) -> Self {
        Self { source: Rc::new(source) }
    }

    pub fn from_rc(source: Rc<dyn Observable<T>>) -> Self {
        Self { source }
    }

    /// General operator: `project` receives each value and decides what, if
    /// anything, to forward downstream. Errors and completion pass through.
    pub fn pipe<U: 'static>(&self, project: impl Fn(T, &dyn Observer<U>) + 'static) -> Stream<U> {
        Stream::new(Pipe {
            source: self.clone(),
            project: Rc::new(project),
        })
    }

    pub fn map<U: 'static>(&self, f: impl Fn(T) -> U + 'static) -> Stream<U> {
        self.pipe::<U>(move |v, down| down.next(f(v)))
    }

    pub fn filter(&self, predicate: impl Fn(&T) -> bool + 'static) -> Stream<T> {
        self.pipe::<T>(move |v, down| {
            if predicate(&v) {
                down.next(v)
            }
        })
    }

    pub fn filter_map<U: 'static>(&self, f: impl Fn(T) -> Option<U> + 'static) -> Stream<U> {
        self.pipe::<U>(move |v, down| {
            if let Some(u) = f(v) {
                down.next(u)
            }
        })
    }

    /// Runs a side effect for each value, then forwards it unchanged.
    pub fn inspect(&self, f: impl Fn(&T) + 'static) -> Stream<T> {
        self.pipe::<T>(move |v, down| {
            f(&v);
            down.next(v)
        })
    }

    /// Multicasts this stream: upstream work runs once per value no matter
    /// how many subscribers attach.
    pub fn share(&self) -> Stream<T>
    where
        T: Clone,
    {
        Stream::new(Share::new(self.clone()))
    }
}

impl<T> Observable<T> for Stream<T> {
    fn subscribe(&self, observer: Rc<dyn Observer<T>>) -> Subscription {
        self.source.subscribe(observer)
    }
}

struct Pipe<T, U> {
    source: Stream<T>,
    project: Rc<Project<T, U>>,
}

impl<T: 'static, U: 'static> Observable<U> for Pipe<T, U> {
    fn subscribe(&self, observer: Rc<dyn Observer<U>>) -> Subscription {
        self.source.subscribe(Rc::new(PipeObserver {
            downstream: observer,
            project: self.project.clone(),
        }))
    }
}

struct PipeObserver<T, U> {
    downstream: Rc<dyn Observer<U>>,
    project: Rc<Project<T, U>>,
}

impl<T, U> Observer<T> for PipeObserver<T, U> {
    fn next(&self, value: T) {
        (self.project)(value, &*self.downstream)
    }

    fn error(&self, err: NodeError) {
        self.downstream.error(err)
    }

    fn complete(&self) {
        self.downstream.complete()
    }
}
