#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use andern::{observer, NodeError, Observable, ObservableExt};
use futures_util::future::{FutureExt, LocalFutureObj};
use futures_util::task::{LocalSpawn, SpawnError};

/// Everything an observer was sent, in order.
pub struct Recorder<T> {
    pub values: Rc<RefCell<Vec<T>>>,
    pub errors: Rc<RefCell<Vec<NodeError>>>,
    pub completions: Rc<Cell<u32>>,
}

impl<T: Clone> Recorder<T> {
    pub fn values(&self) -> Vec<T> {
        self.values.borrow().clone()
    }

    pub fn last(&self) -> Option<T> {
        self.values.borrow().last().cloned()
    }

    pub fn error_count(&self) -> usize {
        self.errors.borrow().len()
    }

    pub fn completion_count(&self) -> u32 {
        self.completions.get()
    }
}

pub fn record<T: 'static>(source: &impl Observable<T>) -> Recorder<T> {
    let values = Rc::new(RefCell::new(Vec::new()));
    let errors = Rc::new(RefCell::new(Vec::new()));
    let completions = Rc::new(Cell::new(0));
    let (v, e, c) = (values.clone(), errors.clone(), completions.clone());
    source.subscribe_with(
        observer(move |value| v.borrow_mut().push(value))
            .on_error(move |err| e.borrow_mut().push(err))
            .on_complete(move || c.set(c.get() + 1)),
    );
    Recorder {
        values,
        errors,
        completions,
    }
}

/// Runs spawned futures to their first pending point, immediately.
pub struct InlineSpawner;

impl LocalSpawn for InlineSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        let _ = future.now_or_never();
        Ok(())
    }
}

#[derive(Debug)]
pub struct TransportDown;

impl std::fmt::Display for TransportDown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("transport down")
    }
}

impl std::error::Error for TransportDown {}
