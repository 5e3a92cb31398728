use crate::circuit::CircuitState;
use crate::classifier::{DefaultClassifier, FnClassifier};
use crate::events::CircuitBreakerEvent;
use crate::layer::CircuitBreakerLayer;
use std::time::Duration;
use tower_kit_core::Listeners;

/// Configuration for a consecutive-failure circuit breaker.
pub struct CircuitBreakerConfig<C = DefaultClassifier> {
    pub(crate) failure_threshold: usize,
    pub(crate) wait_duration_in_open: Duration,
    pub(crate) classifier: C,
    pub(crate) listeners: Listeners<CircuitBreakerEvent>,
    pub(crate) name: String,
}

impl CircuitBreakerConfig<DefaultClassifier> {
    pub fn builder() -> CircuitBreakerConfigBuilder<DefaultClassifier> {
        CircuitBreakerConfigBuilder::new()
    }
}

impl<C> CircuitBreakerConfig<C> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn failure_threshold(&self) -> usize {
        self.failure_threshold
    }

    pub fn wait_duration_in_open(&self) -> Duration {
        self.wait_duration_in_open
    }
}

/// Builder for [`CircuitBreakerConfig`].
pub struct CircuitBreakerConfigBuilder<C> {
    failure_threshold: usize,
    wait_duration_in_open: Duration,
    classifier: C,
    listeners: Listeners<CircuitBreakerEvent>,
    name: String,
}

impl Default for CircuitBreakerConfigBuilder<DefaultClassifier> {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitBreakerConfigBuilder<DefaultClassifier> {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - failure_threshold: 5 consecutive failures
    /// - wait_duration_in_open: 60 seconds
    /// - classifier: every error is a failure
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        Self {
            failure_threshold: 5,
            wait_duration_in_open: Duration::from_secs(60),
            classifier: DefaultClassifier,
            listeners: Listeners::new(),
            name: String::from("<unnamed>"),
        }
    }
}

impl<C> CircuitBreakerConfigBuilder<C> {
    /// Sets how many consecutive failures open the circuit.
    ///
    /// A threshold of zero is treated as one.
    pub fn failure_threshold(mut self, n: usize) -> Self {
        self.failure_threshold = n.max(1);
        self
    }

    /// Sets how long the circuit stays open before allowing a trial call.
    pub fn wait_duration_in_open(mut self, duration: Duration) -> Self {
        self.wait_duration_in_open = duration;
        self
    }

    /// Replaces the failure classifier.
    pub fn classifier<C2>(self, classifier: C2) -> CircuitBreakerConfigBuilder<C2> {
        CircuitBreakerConfigBuilder {
            failure_threshold: self.failure_threshold,
            wait_duration_in_open: self.wait_duration_in_open,
            classifier,
            listeners: self.listeners,
            name: self.name,
        }
    }

    /// Classifies results with a closure.
    ///
    /// ```rust
    /// use tower_kit_circuitbreaker::CircuitBreakerConfig;
    /// use tower_kit_core::KitError;
    ///
    /// let layer = CircuitBreakerConfig::builder()
    ///     .failure_classifier(|result: &Result<String, KitError>| {
    ///         matches!(result, Err(e) if !e.kind().is_client_fault())
    ///     })
    ///     .build();
    /// ```
    pub fn failure_classifier<F, Res, Err>(
        self,
        f: F,
    ) -> CircuitBreakerConfigBuilder<FnClassifier<F>>
    where
        F: Fn(&Result<Res, Err>) -> bool + Send + Sync + 'static,
    {
        self.classifier(FnClassifier::new(f))
    }

    /// Sets the name for this circuit breaker (used in events, logs and metrics).
    pub fn name<N: Into<String>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback run on every state transition.
    pub fn on_state_transition<F>(mut self, f: F) -> Self
    where
        F: Fn(CircuitState, CircuitState) + Send + Sync + 'static,
    {
        self.listeners.add(move |event: &CircuitBreakerEvent| {
            if let CircuitBreakerEvent::StateTransition {
                from_state,
                to_state,
                ..
            } = event
            {
                f(*from_state, *to_state);
            }
        });
        self
    }

    /// Registers a callback run when a call is let through.
    pub fn on_call_permitted<F>(mut self, f: F) -> Self
    where
        F: Fn(CircuitState) + Send + Sync + 'static,
    {
        self.listeners.add(move |event: &CircuitBreakerEvent| {
            if let CircuitBreakerEvent::CallPermitted { state, .. } = event {
                f(*state);
            }
        });
        self
    }

    /// Registers a callback run when a call is rejected.
    pub fn on_call_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.add(move |event: &CircuitBreakerEvent| {
            if let CircuitBreakerEvent::CallRejected { .. } = event {
                f();
            }
        });
        self
    }

    /// Registers a callback run when a call is recorded as a success.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(CircuitState) + Send + Sync + 'static,
    {
        self.listeners.add(move |event: &CircuitBreakerEvent| {
            if let CircuitBreakerEvent::SuccessRecorded { state, .. } = event {
                f(*state);
            }
        });
        self
    }

    /// Registers a callback run when a call is recorded as a failure, with the
    /// number of consecutive failures so far.
    pub fn on_failure<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.listeners.add(move |event: &CircuitBreakerEvent| {
            if let CircuitBreakerEvent::FailureRecorded {
                consecutive_failures,
                ..
            } = event
            {
                f(*consecutive_failures);
            }
        });
        self
    }

    /// Builds the circuit breaker layer.
    pub fn build(self) -> CircuitBreakerLayer<C> {
        CircuitBreakerLayer::new(CircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            wait_duration_in_open: self.wait_duration_in_open,
            classifier: self.classifier,
            listeners: self.listeners,
            name: self.name,
        })
    }
}
