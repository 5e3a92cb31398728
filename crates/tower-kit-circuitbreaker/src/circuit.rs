use crate::config::CircuitBreakerConfig;
use crate::events::CircuitBreakerEvent;
#[cfg(feature = "metrics")]
use metrics::{counter, gauge};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// State of a circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CircuitState {
    /// Calls pass through; consecutive failures are counted.
    Closed = 0,
    /// Calls are rejected until the cooldown elapses.
    Open = 1,
    /// A single trial call decides whether to close or reopen.
    HalfOpen = 2,
}

impl CircuitState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => CircuitState::Open,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Closed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "Closed",
            CircuitState::Open => "Open",
            CircuitState::HalfOpen => "HalfOpen",
        }
    }
}

/// Admission granted by [`Circuit::try_acquire`].
///
/// Only the trial permit of a half-open circuit may change the state when its
/// result is recorded. Results of calls admitted while closed that finish after
/// the circuit opened are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Permit {
    Closed,
    Trial,
}

pub(crate) struct Circuit {
    state: CircuitState,
    state_atomic: Arc<AtomicU8>,
    last_state_change: tokio::time::Instant,
    consecutive_failures: usize,
    trial_in_flight: bool,
}

impl Circuit {
    pub(crate) fn new(state_atomic: Arc<AtomicU8>) -> Self {
        state_atomic.store(CircuitState::Closed as u8, Ordering::Release);
        Self {
            state: CircuitState::Closed,
            state_atomic,
            last_state_change: tokio::time::Instant::now(),
            consecutive_failures: 0,
            trial_in_flight: false,
        }
    }

    pub(crate) fn state(&self) -> CircuitState {
        self.state
    }

    pub(crate) fn consecutive_failures(&self) -> usize {
        self.consecutive_failures
    }

    pub(crate) fn try_acquire<C>(&mut self, config: &CircuitBreakerConfig<C>) -> Option<Permit> {
        let permit = match self.state {
            CircuitState::Closed => Some(Permit::Closed),
            CircuitState::Open => {
                if self.last_state_change.elapsed() >= config.wait_duration_in_open {
                    self.transition_to(CircuitState::HalfOpen, config);
                    self.trial_in_flight = true;
                    Some(Permit::Trial)
                } else {
                    None
                }
            }
            CircuitState::HalfOpen => {
                if self.trial_in_flight {
                    None
                } else {
                    self.trial_in_flight = true;
                    Some(Permit::Trial)
                }
            }
        };

        match permit {
            Some(_) => config.listeners.emit(&CircuitBreakerEvent::CallPermitted {
                name: config.name.clone(),
                timestamp: Instant::now(),
                state: self.state,
            }),
            None => config.listeners.emit(&CircuitBreakerEvent::CallRejected {
                name: config.name.clone(),
                timestamp: Instant::now(),
                state: self.state,
            }),
        }

        permit
    }

    pub(crate) fn record_success<C>(&mut self, permit: Permit, config: &CircuitBreakerConfig<C>) {
        config.listeners.emit(&CircuitBreakerEvent::SuccessRecorded {
            name: config.name.clone(),
            timestamp: Instant::now(),
            state: self.state,
        });

        #[cfg(feature = "metrics")]
        counter!("circuitbreaker_calls_total", "circuitbreaker" => config.name.clone(), "outcome" => "success").increment(1);

        match (permit, self.state) {
            (Permit::Trial, CircuitState::HalfOpen) => {
                self.transition_to(CircuitState::Closed, config);
            }
            (Permit::Closed, CircuitState::Closed) => {
                self.consecutive_failures = 0;
            }
            _ => {}
        }
    }

    pub(crate) fn record_failure<C>(&mut self, permit: Permit, config: &CircuitBreakerConfig<C>) {
        if self.state == CircuitState::Closed && permit == Permit::Closed {
            self.consecutive_failures += 1;
        }

        config.listeners.emit(&CircuitBreakerEvent::FailureRecorded {
            name: config.name.clone(),
            timestamp: Instant::now(),
            state: self.state,
            consecutive_failures: self.consecutive_failures,
        });

        #[cfg(feature = "metrics")]
        counter!("circuitbreaker_calls_total", "circuitbreaker" => config.name.clone(), "outcome" => "failure").increment(1);

        match (permit, self.state) {
            (Permit::Trial, CircuitState::HalfOpen) => {
                self.transition_to(CircuitState::Open, config);
            }
            (Permit::Closed, CircuitState::Closed)
                if self.consecutive_failures >= config.failure_threshold =>
            {
                self.transition_to(CircuitState::Open, config);
            }
            _ => {}
        }
    }

    /// Frees the trial slot of a call that ended without a recorded result.
    pub(crate) fn abandon(&mut self, permit: Permit) {
        if permit == Permit::Trial && self.state == CircuitState::HalfOpen {
            self.trial_in_flight = false;
        }
    }

    pub(crate) fn force_open<C>(&mut self, config: &CircuitBreakerConfig<C>) {
        self.transition_to(CircuitState::Open, config);
    }

    pub(crate) fn reset<C>(&mut self, config: &CircuitBreakerConfig<C>) {
        self.transition_to(CircuitState::Closed, config);
    }

    fn transition_to<C>(&mut self, state: CircuitState, config: &CircuitBreakerConfig<C>) {
        if self.state == state {
            return;
        }

        let from_state = self.state;

        config.listeners.emit(&CircuitBreakerEvent::StateTransition {
            name: config.name.clone(),
            timestamp: Instant::now(),
            from_state,
            to_state: state,
        });

        #[cfg(feature = "tracing")]
        tracing::info!(
            breaker = %config.name,
            from = from_state.as_str(),
            to = state.as_str(),
            "circuit state transition"
        );

        #[cfg(feature = "metrics")]
        {
            counter!(
                "circuitbreaker_transitions_total",
                "circuitbreaker" => config.name.clone(),
                "from" => from_state.as_str(),
                "to" => state.as_str()
            )
            .increment(1);

            gauge!("circuitbreaker_state", "circuitbreaker" => config.name.clone())
                .set(state as u8 as f64);
        }

        self.state = state;
        self.state_atomic.store(state as u8, Ordering::Release);
        self.last_state_change = tokio::time::Instant::now();
        self.consecutive_failures = 0;
        self.trial_in_flight = false;
    }
}
