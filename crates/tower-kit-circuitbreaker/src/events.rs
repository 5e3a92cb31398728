use crate::circuit::CircuitState;
use std::time::Instant;

/// Events emitted by a circuit breaker.
#[derive(Debug, Clone)]
pub enum CircuitBreakerEvent {
    StateTransition {
        name: String,
        timestamp: Instant,
        from_state: CircuitState,
        to_state: CircuitState,
    },
    CallPermitted {
        name: String,
        timestamp: Instant,
        state: CircuitState,
    },
    /// A call was refused without reaching the inner service.
    CallRejected {
        name: String,
        timestamp: Instant,
        state: CircuitState,
    },
    SuccessRecorded {
        name: String,
        timestamp: Instant,
        state: CircuitState,
    },
    FailureRecorded {
        name: String,
        timestamp: Instant,
        state: CircuitState,
        consecutive_failures: usize,
    },
}

impl CircuitBreakerEvent {
    pub fn name(&self) -> &str {
        match self {
            CircuitBreakerEvent::StateTransition { name, .. }
            | CircuitBreakerEvent::CallPermitted { name, .. }
            | CircuitBreakerEvent::CallRejected { name, .. }
            | CircuitBreakerEvent::SuccessRecorded { name, .. }
            | CircuitBreakerEvent::FailureRecorded { name, .. } => name,
        }
    }
}
