//! Circuit breaking for tower-kit endpoints.
//!
//! The breaker counts consecutive failures of the wrapped service. Once
//! `failure_threshold` failures occur in a row it opens, and every call fails
//! immediately with [`CircuitBreakerError::OpenCircuit`] without reaching the
//! service. After `wait_duration_in_open` the next call is let through as a
//! trial while all others keep failing fast; the trial's success closes the
//! circuit and its failure opens it again for another full cooldown.
//!
//! ```text
//!            K consecutive failures
//!   Closed ─────────────────────────▶ Open
//!     ▲                               │  ▲
//!     │ trial succeeds       cooldown │  │ trial fails
//!     │                               ▼  │
//!     └─────────────────────────── HalfOpen
//! ```
//!
//! Which results count as failures is decided by a [`FailureClassifier`]. The
//! default counts every error; [`ServerFaultClassifier`] counts only
//! [`ErrorKind::Internal`](tower_kit_core::ErrorKind::Internal) so client
//! mistakes cannot trip the breaker.
//!
//! ```
//! use tower_kit_circuitbreaker::{CircuitBreakerConfig, CircuitState};
//! use tower_kit_circuitbreaker::classifier::ServerFaultClassifier;
//! use tower_kit_core::{Invocation, KitError};
//! use tower::{Layer, ServiceExt};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let breaker = CircuitBreakerConfig::builder()
//!     .name("upstream")
//!     .failure_threshold(2)
//!     .wait_duration_in_open(Duration::from_secs(30))
//!     .classifier(ServerFaultClassifier)
//!     .on_state_transition(|from, to| println!("{from:?} -> {to:?}"))
//!     .build();
//!
//! let service = breaker.layer(tower::service_fn(|_: Invocation<()>| async {
//!     Err::<(), _>(KitError::internal("connection refused"))
//! }));
//!
//! for _ in 0..2 {
//!     let _ = service.clone().oneshot(Invocation::new(())).await;
//! }
//! assert_eq!(service.state(), CircuitState::Open);
//! # }
//! ```

mod circuit;
pub mod classifier;
mod config;
mod error;
mod events;
mod layer;

pub use circuit::CircuitState;
pub use classifier::{DefaultClassifier, FailureClassifier, FnClassifier, ServerFaultClassifier};
pub use config::{CircuitBreakerConfig, CircuitBreakerConfigBuilder};
pub use error::CircuitBreakerError;
pub use events::CircuitBreakerEvent;
pub use layer::CircuitBreakerLayer;

use crate::circuit::{Circuit, Permit};
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use tower::Service;

#[cfg(feature = "metrics")]
use metrics::counter;

#[cfg(feature = "tracing")]
use tracing::debug;

fn lock(circuit: &Mutex<Circuit>) -> MutexGuard<'_, Circuit> {
    circuit.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A Tower [`Service`] guarded by a circuit breaker.
pub struct CircuitBreaker<S, C> {
    inner: S,
    circuit: Arc<Mutex<Circuit>>,
    state_atomic: Arc<AtomicU8>,
    config: Arc<CircuitBreakerConfig<C>>,
}

impl<S, C> CircuitBreaker<S, C> {
    /// Creates a new breaker with a closed circuit of its own.
    pub fn new(inner: S, config: Arc<CircuitBreakerConfig<C>>) -> Self {
        let state_atomic = Arc::new(AtomicU8::new(CircuitState::Closed as u8));
        Self {
            inner,
            circuit: Arc::new(Mutex::new(Circuit::new(Arc::clone(&state_atomic)))),
            state_atomic,
            config,
        }
    }

    /// Current state, read without taking the circuit lock.
    pub fn state(&self) -> CircuitState {
        CircuitState::from_u8(self.state_atomic.load(Ordering::Acquire))
    }

    /// Failures counted since the last success or state change.
    pub fn consecutive_failures(&self) -> usize {
        lock(&self.circuit).consecutive_failures()
    }

    /// Opens the circuit immediately, starting a fresh cooldown.
    pub fn force_open(&self) {
        lock(&self.circuit).force_open(&self.config);
    }

    /// Closes the circuit and clears the failure streak.
    pub fn reset(&self) {
        lock(&self.circuit).reset(&self.config);
    }
}

impl<S: Clone, C> Clone for CircuitBreaker<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            circuit: Arc::clone(&self.circuit),
            state_atomic: Arc::clone(&self.state_atomic),
            config: Arc::clone(&self.config),
        }
    }
}

/// Hands an unrecorded permit back if the call future is dropped mid-flight.
struct PermitGuard {
    circuit: Arc<Mutex<Circuit>>,
    permit: Option<Permit>,
}

impl PermitGuard {
    fn take(&mut self) -> Option<Permit> {
        self.permit.take()
    }
}

impl Drop for PermitGuard {
    fn drop(&mut self) {
        if let Some(permit) = self.permit.take() {
            lock(&self.circuit).abandon(permit);
        }
    }
}

impl<S, C, Req> Service<Req> for CircuitBreaker<S, C>
where
    S: Service<Req> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    S::Error: From<CircuitBreakerError> + Send + 'static,
    C: FailureClassifier<S::Response, S::Error> + 'static,
    Req: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let config = Arc::clone(&self.config);
        let circuit = Arc::clone(&self.circuit);
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let permit = lock(&circuit).try_acquire(&config);

            let Some(permit) = permit else {
                #[cfg(feature = "tracing")]
                debug!(breaker = %config.name, "circuit breaker rejected call");

                #[cfg(feature = "metrics")]
                counter!("circuitbreaker_calls_total", "circuitbreaker" => config.name.clone(), "outcome" => "rejected").increment(1);

                return Err(CircuitBreakerError::OpenCircuit.into());
            };

            let mut guard = PermitGuard {
                circuit: Arc::clone(&circuit),
                permit: Some(permit),
            };

            let result = inner.call(req).await;

            if let Some(permit) = guard.take() {
                let mut circuit = lock(&circuit);
                if config.classifier.is_ignored(&result) {
                    circuit.abandon(permit);
                } else if config.classifier.classify(&result) {
                    circuit.record_failure(permit, &config);
                } else {
                    circuit.record_success(permit, &config);
                }
            }

            result
        })
    }
}
