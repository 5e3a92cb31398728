//! Deciding which call outcomes count against the breaker.

use std::sync::Arc;
use tower_kit_core::{Classify, ErrorKind};

/// Decides whether a call result counts as a failure.
pub trait FailureClassifier<Res, Err>: Send + Sync {
    fn classify(&self, result: &Result<Res, Err>) -> bool;

    /// Results that say nothing about the service's health.
    ///
    /// An ignored result is neither a success nor a failure: the failure
    /// streak is left as is and a half-open trial slot is freed for the next
    /// caller. Checked before [`classify`](Self::classify).
    fn is_ignored(&self, _result: &Result<Res, Err>) -> bool {
        false
    }
}

/// Counts every error as a failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClassifier;

impl<Res, Err> FailureClassifier<Res, Err> for DefaultClassifier {
    fn classify(&self, result: &Result<Res, Err>) -> bool {
        result.is_err()
    }
}

/// Counts only errors whose kind is a server fault.
///
/// Validation and decode errors mean the service answered correctly, so they
/// never open the breaker. Rejections from a rate limiter further in and
/// cancellations never reached the service, so they are ignored: they
/// neither reset the failure streak nor decide a half-open trial.
///
/// ```rust
/// use tower_kit_circuitbreaker::classifier::{FailureClassifier, ServerFaultClassifier};
/// use tower_kit_core::{ErrorKind, KitError};
///
/// let classifier = ServerFaultClassifier;
/// let invalid: Result<(), KitError> = Err(KitError::new(ErrorKind::Validation, "integer overflow"));
/// let broken: Result<(), KitError> = Err(KitError::internal("connection reset"));
///
/// let throttled: Result<(), KitError> = Err(KitError::new(ErrorKind::RateLimited, "rate limit exceeded"));
///
/// assert!(!classifier.classify(&invalid));
/// assert!(classifier.classify(&broken));
/// assert!(classifier.is_ignored(&throttled));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerFaultClassifier;

impl<Res, Err> FailureClassifier<Res, Err> for ServerFaultClassifier
where
    Err: Classify,
{
    fn classify(&self, result: &Result<Res, Err>) -> bool {
        match result {
            Ok(_) => false,
            Err(err) => err.kind().is_server_fault(),
        }
    }

    fn is_ignored(&self, result: &Result<Res, Err>) -> bool {
        match result {
            Ok(_) => false,
            Err(err) => {
                let kind = err.kind();
                kind.is_throttled() || kind == ErrorKind::Canceled
            }
        }
    }
}

/// A failure classifier backed by a closure.
#[derive(Clone)]
pub struct FnClassifier<F> {
    f: Arc<F>,
}

impl<F> FnClassifier<F> {
    pub fn new(f: F) -> Self {
        Self { f: Arc::new(f) }
    }
}

impl<F, Res, Err> FailureClassifier<Res, Err> for FnClassifier<F>
where
    F: Fn(&Result<Res, Err>) -> bool + Send + Sync,
{
    fn classify(&self, result: &Result<Res, Err>) -> bool {
        (self.f)(result)
    }
}

impl<F> std::fmt::Debug for FnClassifier<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnClassifier").finish_non_exhaustive()
    }
}
