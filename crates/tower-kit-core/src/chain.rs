//! Ordered middleware composition.
//!
//! A [`Chain`] is a list of middleware constructors, each taking the value to
//! wrap and returning a value of the same type. [`Chain::build`] folds the list
//! right-to-left around an inner value, so the first middleware in the list
//! ends up outermost and runs first:
//!
//! ```text
//! Chain::new().with(logging).with(limiter).build(svc)
//!   == logging(limiter(svc))
//!
//! Request  → logging → limiter → svc
//! Response ← logging ← limiter ← svc
//! ```
//!
//! The built value is an ordinary owned value. The chain can be reused to wrap
//! several inner values (one per operation) with identical middleware.
//!
//! ```rust
//! use tower_kit_core::Chain;
//!
//! let chain = Chain::new()
//!     .with(|s: String| format!("outer({s})"))
//!     .with(|s: String| format!("inner({s})"));
//!
//! assert_eq!(chain.build("svc".to_string()), "outer(inner(svc))");
//! ```

use std::fmt;
use std::sync::Arc;

/// One middleware constructor: wraps a `T`, returns a `T`.
pub type Middleware<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

/// An ordered list of middleware, outermost first.
pub struct Chain<T> {
    middleware: Vec<Middleware<T>>,
}

impl<T> Chain<T> {
    pub fn new() -> Self {
        Self {
            middleware: Vec::new(),
        }
    }

    /// Appends a middleware. Each appended middleware sits inside the previous ones.
    pub fn with<F>(mut self, middleware: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Appends a middleware only when `middleware` is `Some`.
    pub fn with_option<F>(self, middleware: Option<F>) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        match middleware {
            Some(mw) => self.with(mw),
            None => self,
        }
    }

    /// Wraps `inner` with every middleware, the first one outermost.
    pub fn build(&self, inner: T) -> T {
        self.middleware
            .iter()
            .rev()
            .fold(inner, |wrapped, middleware| middleware(wrapped))
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }
}

impl<T> Default for Chain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Chain<T> {
    fn clone(&self) -> Self {
        Self {
            middleware: self.middleware.clone(),
        }
    }
}

impl<T> fmt::Debug for Chain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("len", &self.middleware.len())
            .finish()
    }
}

impl<T> FromIterator<Middleware<T>> for Chain<T> {
    fn from_iter<I: IntoIterator<Item = Middleware<T>>>(iter: I) -> Self {
        Self {
            middleware: iter.into_iter().collect(),
        }
    }
}
