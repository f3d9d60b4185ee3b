use std::sync::{Arc, Mutex, PoisonError};

/// A cloneable handle that serializes access to a store or façade.
///
/// Commands are all-or-nothing, so a panic inside one leaves the inner
/// value consistent and a poisoned lock is recovered rather than
/// propagated.
#[derive(Debug, Default)]
pub struct Shared<T>(Arc<Mutex<T>>);

impl<T> Shared<T> {
    pub fn new(inner: T) -> Self {
        Self(Arc::new(Mutex::new(inner)))
    }

    /// Runs `f` with exclusive access; other callers wait until it returns.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}
