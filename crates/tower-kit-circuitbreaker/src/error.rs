use thiserror::Error;
use tower_kit_core::{ErrorKind, KitError};

/// Errors produced by the circuit breaker itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CircuitBreakerError {
    /// The circuit is open, or half-open with its trial call already in flight.
    #[error("circuit breaker is open")]
    OpenCircuit,
}

impl CircuitBreakerError {
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, CircuitBreakerError::OpenCircuit)
    }
}

impl From<CircuitBreakerError> for KitError {
    fn from(err: CircuitBreakerError) -> Self {
        KitError::new(ErrorKind::CircuitOpen, err.to_string())
    }
}
