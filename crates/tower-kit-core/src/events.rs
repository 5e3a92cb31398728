//! Event callbacks for stateful middleware.
//!
//! The rate limiter and circuit breaker report what they do (permits handed
//! out, state transitions, rejections) to a [`Listeners`] collection built up
//! through their config builders.

use std::fmt;
use std::sync::Arc;

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// A list of callbacks invoked for every emitted event of type `E`.
pub struct Listeners<E> {
    callbacks: Vec<Callback<E>>,
}

impl<E> Listeners<E> {
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    pub fn add<F>(&mut self, callback: F)
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.callbacks.push(Arc::new(callback));
    }

    /// Calls every listener with `event`.
    ///
    /// A panicking listener is contained so the remaining listeners still run
    /// and the request in flight is unaffected.
    pub fn emit(&self, event: &E) {
        for callback in &self.callbacks {
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| callback(event)));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for Listeners<E> {
    fn clone(&self) -> Self {
        Self {
            callbacks: self.callbacks.clone(),
        }
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.callbacks.len())
            .finish()
    }
}
