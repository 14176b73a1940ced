use super::Observer;
use crate::error::NodeError;

/// Closure-backed [`Observer`].
///
/// ```
/// use andern::channel::observer;
///
/// let obs = observer(|v: i32| println!("{v}")).on_complete(|| println!("done"));
/// # let _ = obs;
/// ```
pub struct FnObserver<T> {
    on_next: Box<dyn Fn(T)>,
    on_error: Option<Box<dyn Fn(NodeError)>>,
    on_complete: Option<Box<dyn Fn()>>,
}

pub fn observer<T>(on_next: impl Fn(T) + 'static) -> FnObserver<T> {
    FnObserver {
        on_next: Box::new(on_next),
        on_error: None,
        on_complete: None,
    }
}

impl<T> FnObserver<T> {
    pub fn on_error(mut self, f: impl Fn(NodeError) + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl Fn() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }
}

impl<T> Observer<T> for FnObserver<T> {
    fn next(&self, value: T) {
        (self.on_next)(value)
    }

    fn error(&self, err: NodeError) {
        if let Some(f) = &self.on_error {
            f(err)
        }
    }

    fn complete(&self) {
        if let Some(f) = &self.on_complete {
            f()
        }
    }
}
