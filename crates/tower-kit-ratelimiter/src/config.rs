use crate::events::RateLimiterEvent;
use std::time::Duration;
use tower_kit_core::Listeners;

/// Configuration for a token bucket rate limiter.
pub struct RateLimiterConfig {
    pub(crate) capacity: usize,
    pub(crate) refill_per_second: f64,
    pub(crate) max_wait: Duration,
    pub(crate) listeners: Listeners<RateLimiterEvent>,
    pub(crate) name: String,
}

impl RateLimiterConfig {
    pub fn builder() -> RateLimiterConfigBuilder {
        RateLimiterConfigBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Builder for [`RateLimiterConfig`].
pub struct RateLimiterConfigBuilder {
    capacity: usize,
    refill_per_second: f64,
    max_wait: Duration,
    listeners: Listeners<RateLimiterEvent>,
    name: String,
}

impl Default for RateLimiterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiterConfigBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - capacity: 100
    /// - refill_per_second: 100.0
    /// - max_wait: zero (reject immediately when the bucket is empty)
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        Self {
            capacity: 100,
            refill_per_second: 100.0,
            max_wait: Duration::ZERO,
            listeners: Listeners::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Sets the bucket size, i.e. the largest burst served without waiting.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets how many tokens are added back per second.
    pub fn refill_per_second(mut self, rate: f64) -> Self {
        self.refill_per_second = rate.max(0.0);
        self
    }

    /// Sets how long a call may wait for a token before it is rejected.
    ///
    /// With the default of zero the limiter never waits. A waiting call still
    /// gives up as soon as its context is cancelled or its deadline passes.
    pub fn max_wait(mut self, duration: Duration) -> Self {
        self.max_wait = duration;
        self
    }

    /// Sets the name for this rate limiter instance (used in events and metrics).
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback run when a call obtains a token, with the time it waited.
    pub fn on_permit_acquired<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.listeners.add(move |event: &RateLimiterEvent| {
            if let RateLimiterEvent::PermitAcquired { wait_duration, .. } = event {
                f(*wait_duration);
            }
        });
        self
    }

    /// Registers a callback run when a call is rejected for lack of tokens.
    pub fn on_permit_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.add(move |event: &RateLimiterEvent| {
            if let RateLimiterEvent::PermitRejected { .. } = event {
                f();
            }
        });
        self
    }

    /// Builds the rate limiter layer.
    pub fn build(self) -> crate::RateLimiterLayer {
        crate::RateLimiterLayer::new(RateLimiterConfig {
            capacity: self.capacity,
            refill_per_second: self.refill_per_second,
            max_wait: self.max_wait,
            listeners: self.listeners,
            name: self.name,
        })
    }
}
