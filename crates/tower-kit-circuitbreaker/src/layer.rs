use crate::classifier::DefaultClassifier;
use crate::config::{CircuitBreakerConfig, CircuitBreakerConfigBuilder};
use crate::CircuitBreaker;
use std::sync::Arc;
use tower::Layer;

/// A Tower [`Layer`] that puts a circuit breaker in front of a service.
///
/// Each call to [`Layer::layer`] creates an independent circuit, so one layer
/// applied to several endpoints trips per endpoint. Clones of a wrapped
/// service share their circuit.
///
/// ```rust
/// use tower::{ServiceBuilder, service_fn};
/// use tower_kit_circuitbreaker::CircuitBreakerLayer;
/// use tower_kit_core::{Invocation, KitError};
/// use std::time::Duration;
///
/// let layer = CircuitBreakerLayer::builder()
///     .failure_threshold(5)
///     .wait_duration_in_open(Duration::from_secs(30))
///     .build();
///
/// let service = ServiceBuilder::new()
///     .layer(layer)
///     .service(service_fn(|inv: Invocation<String>| async move {
///         Ok::<_, KitError>(inv.request)
///     }));
/// ```
pub struct CircuitBreakerLayer<C = DefaultClassifier> {
    config: Arc<CircuitBreakerConfig<C>>,
}

impl<C> CircuitBreakerLayer<C> {
    pub(crate) fn new(config: CircuitBreakerConfig<C>) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl CircuitBreakerLayer<DefaultClassifier> {
    pub fn builder() -> CircuitBreakerConfigBuilder<DefaultClassifier> {
        CircuitBreakerConfigBuilder::new()
    }
}

impl<C> Clone for CircuitBreakerLayer<C> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, C> Layer<S> for CircuitBreakerLayer<C> {
    type Service = CircuitBreaker<S, C>;

    fn layer(&self, service: S) -> Self::Service {
        CircuitBreaker::new(service, Arc::clone(&self.config))
    }
}
