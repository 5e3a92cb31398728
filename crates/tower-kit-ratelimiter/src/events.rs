use std::time::{Duration, Instant};

/// Events emitted by a rate limiter.
#[derive(Debug, Clone)]
pub enum RateLimiterEvent {
    /// A call obtained a token, possibly after waiting.
    PermitAcquired {
        name: String,
        timestamp: Instant,
        wait_duration: Duration,
    },
    /// A call was turned away because no token arrived in time.
    PermitRejected { name: String, timestamp: Instant },
}

impl RateLimiterEvent {
    pub fn name(&self) -> &str {
        match self {
            RateLimiterEvent::PermitAcquired { name, .. }
            | RateLimiterEvent::PermitRejected { name, .. } => name,
        }
    }
}
