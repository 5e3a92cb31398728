//! Token bucket rate limiting for tower-kit endpoints.
//!
//! A [`RateLimiter`] admits a call only when its bucket has a token. Tokens
//! refill continuously up to the bucket capacity, so the limiter allows bursts
//! of `capacity` calls and a sustained `refill_per_second` rate after that.
//!
//! By default a call that finds the bucket empty fails at once with
//! [`RateLimiterError::RateLimitExceeded`]. With [`max_wait`] set, it instead
//! waits for the next token as long as that arrives within the budget; the wait
//! is abandoned, and the token given back, when the invocation's context is
//! cancelled or reaches its deadline.
//!
//! The wrapped service's error type must absorb [`RateLimiterError`], so the
//! limiter fits into a chain where every layer shares one error type.
//!
//! # Examples
//!
//! ```
//! use tower_kit_core::{Invocation, KitError};
//! use tower_kit_ratelimiter::RateLimiterConfig;
//! use tower::{Layer, ServiceExt};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), KitError> {
//! let limiter = RateLimiterConfig::builder()
//!     .name("sum")
//!     .capacity(1)
//!     .refill_per_second(1.0)
//!     .max_wait(Duration::from_millis(10))
//!     .build();
//!
//! let service = limiter.layer(tower::service_fn(|inv: Invocation<(i64, i64)>| async move {
//!     let (a, b) = inv.request;
//!     Ok::<_, KitError>(a + b)
//! }));
//!
//! assert_eq!(service.oneshot(Invocation::new((1, 2))).await?, 3);
//! # Ok(())
//! # }
//! ```
//!
//! [`max_wait`]: RateLimiterConfigBuilder::max_wait

mod bucket;
mod config;
mod error;
mod events;
mod layer;

pub use config::{RateLimiterConfig, RateLimiterConfigBuilder};
pub use error::RateLimiterError;
pub use events::RateLimiterEvent;
pub use layer::RateLimiterLayer;

use crate::bucket::SharedBucket;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::Service;
use tower_kit_core::Contextual;

#[cfg(feature = "metrics")]
use metrics::{counter, histogram};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// A Tower [`Service`] that applies token bucket rate limiting.
pub struct RateLimiter<S> {
    inner: S,
    config: Arc<RateLimiterConfig>,
    bucket: SharedBucket,
}

impl<S> RateLimiter<S> {
    /// Creates a new `RateLimiter` with a full bucket of its own.
    pub fn new(inner: S, config: Arc<RateLimiterConfig>) -> Self {
        let bucket = SharedBucket::new(config.capacity, config.refill_per_second);
        Self {
            inner,
            config,
            bucket,
        }
    }

    /// Tokens currently in the bucket.
    pub fn available_permits(&self) -> usize {
        self.bucket.available()
    }
}

impl<S> Clone for RateLimiter<S>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            config: Arc::clone(&self.config),
            bucket: self.bucket.clone(),
        }
    }
}

impl<S, Req> Service<Req> for RateLimiter<S>
where
    S: Service<Req> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: From<RateLimiterError> + Send + 'static,
    S::Response: Send + 'static,
    Req: Contextual + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let bucket = self.bucket.clone();
        let config = Arc::clone(&self.config);
        // Take the service that was driven to readiness, leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let acquired = bucket.acquire(req.context(), config.max_wait).await;
            match acquired {
                Ok(wait_duration) => {
                    #[cfg(feature = "tracing")]
                    debug!(
                        ratelimiter = %config.name,
                        wait_ms = wait_duration.as_millis() as u64,
                        "permit acquired"
                    );

                    #[cfg(feature = "metrics")]
                    {
                        counter!("ratelimiter_calls_total", "ratelimiter" => config.name.clone(), "result" => "permitted").increment(1);
                        histogram!("ratelimiter_wait_duration_seconds", "ratelimiter" => config.name.clone()).record(wait_duration.as_secs_f64());
                    }

                    config.listeners.emit(&RateLimiterEvent::PermitAcquired {
                        name: config.name.clone(),
                        timestamp: Instant::now(),
                        wait_duration,
                    });

                    inner.call(req).await
                }
                Err(RateLimiterError::RateLimitExceeded) => {
                    #[cfg(feature = "tracing")]
                    warn!(ratelimiter = %config.name, "rate limit exceeded");

                    #[cfg(feature = "metrics")]
                    counter!("ratelimiter_calls_total", "ratelimiter" => config.name.clone(), "result" => "rejected").increment(1);

                    config.listeners.emit(&RateLimiterEvent::PermitRejected {
                        name: config.name.clone(),
                        timestamp: Instant::now(),
                    });

                    Err(RateLimiterError::RateLimitExceeded.into())
                }
                Err(err) => {
                    #[cfg(feature = "metrics")]
                    counter!("ratelimiter_calls_total", "ratelimiter" => config.name.clone(), "result" => "canceled").increment(1);

                    Err(err.into())
                }
            }
        })
    }
}
