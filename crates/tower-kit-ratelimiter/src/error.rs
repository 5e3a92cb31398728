use thiserror::Error;
use tower_kit_core::{ErrorKind, KitError};

/// Errors produced by the rate limiter itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimiterError {
    /// No token was available within the configured wait budget.
    #[error("rate limit exceeded")]
    RateLimitExceeded,

    /// The caller gave up while waiting for a token.
    #[error("{0}")]
    Canceled(String),
}

impl From<RateLimiterError> for KitError {
    fn from(err: RateLimiterError) -> Self {
        match err {
            RateLimiterError::RateLimitExceeded => {
                KitError::new(ErrorKind::RateLimited, "rate limit exceeded")
            }
            RateLimiterError::Canceled(message) => KitError::canceled(message),
        }
    }
}
