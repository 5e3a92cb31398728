use crate::{RateLimiter, RateLimiterConfig};
use std::sync::Arc;
use tower::Layer;

/// A Tower [`Layer`] that puts a token bucket in front of a service.
///
/// Every call to [`Layer::layer`] creates a fresh bucket, so one layer can be
/// applied to several endpoints and each gets its own budget. Clones of a
/// wrapped service share their bucket.
///
/// ```
/// use tower_kit_ratelimiter::RateLimiterConfig;
/// use tower::ServiceBuilder;
///
/// let limiter = RateLimiterConfig::builder()
///     .capacity(100)
///     .refill_per_second(100.0)
///     .build();
///
/// let service = ServiceBuilder::new()
///     .layer(limiter)
///     .service(tower::service_fn(|inv: tower_kit_core::Invocation<u32>| async move {
///         Ok::<_, tower_kit_core::KitError>(inv.request)
///     }));
/// ```
#[derive(Clone)]
pub struct RateLimiterLayer {
    config: Arc<RateLimiterConfig>,
}

impl RateLimiterLayer {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl<S> Layer<S> for RateLimiterLayer {
    type Service = RateLimiter<S>;

    fn layer(&self, service: S) -> Self::Service {
        RateLimiter::new(service, Arc::clone(&self.config))
    }
}
