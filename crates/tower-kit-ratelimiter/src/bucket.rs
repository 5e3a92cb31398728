use crate::error::RateLimiterError;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tower_kit_core::Context;

/// Token bucket state.
///
/// Tokens refill continuously at `refill_per_sec` up to `capacity`. A caller
/// willing to wait reserves a token ahead of time, which can drive `tokens`
/// negative; later callers then see a longer wait.
#[derive(Debug)]
pub(crate) struct TokenBucket {
    capacity: f64,
    refill_per_sec: f64,
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    pub(crate) fn new(capacity: usize, refill_per_sec: f64) -> Self {
        Self {
            capacity: capacity as f64,
            refill_per_sec,
            tokens: capacity as f64,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        self.last_refill = now;
    }

    /// Takes a token, reserving one in the future if none is available now.
    ///
    /// Returns how long the caller must wait before using its token, or `None`
    /// if that wait would exceed `max_wait` (nothing is reserved in that case).
    pub(crate) fn reserve(&mut self, max_wait: Duration) -> Option<Duration> {
        self.refill(Instant::now());

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            return Some(Duration::ZERO);
        }

        if self.refill_per_sec <= 0.0 {
            return None;
        }

        // A tiny rate can put the next token beyond what a Duration holds.
        let wait = Duration::try_from_secs_f64((1.0 - self.tokens) / self.refill_per_sec)
            .ok()
            .filter(|wait| *wait <= max_wait)?;

        self.tokens -= 1.0;
        Some(wait)
    }

    /// Gives back a reserved token whose caller stopped waiting.
    pub(crate) fn release(&mut self) {
        self.tokens = (self.tokens + 1.0).min(self.capacity);
    }

    pub(crate) fn available(&mut self) -> usize {
        self.refill(Instant::now());
        self.tokens.max(0.0).floor() as usize
    }
}

/// A token reserved by a waiting caller. Returned to the bucket on drop unless
/// the wait completed.
struct Reservation<'a> {
    bucket: &'a SharedBucket,
    kept: bool,
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.kept {
            self.bucket.with_state(TokenBucket::release);
        }
    }
}

/// A token bucket shared by every clone of one rate-limited service.
#[derive(Debug, Clone)]
pub(crate) struct SharedBucket {
    state: Arc<Mutex<TokenBucket>>,
}

impl SharedBucket {
    pub(crate) fn new(capacity: usize, refill_per_sec: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(TokenBucket::new(capacity, refill_per_sec))),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut TokenBucket) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Acquires a token, waiting at most `max_wait`.
    ///
    /// The wait ends early if `ctx` is cancelled or its deadline passes. The
    /// reserved token goes back to the bucket then, and also when the returned
    /// future is dropped mid-wait.
    pub(crate) async fn acquire(
        &self,
        ctx: &Context,
        max_wait: Duration,
    ) -> Result<Duration, RateLimiterError> {
        ctx.check()
            .map_err(|e| RateLimiterError::Canceled(e.message().to_string()))?;

        let wait = self
            .with_state(|bucket| bucket.reserve(max_wait))
            .ok_or(RateLimiterError::RateLimitExceeded)?;

        if wait.is_zero() {
            return Ok(wait);
        }

        let mut reservation = Reservation {
            bucket: self,
            kept: false,
        };

        tokio::select! {
            _ = sleep(wait) => {
                reservation.kept = true;
                Ok(wait)
            }
            err = ctx.done() => Err(RateLimiterError::Canceled(err.message().to_string())),
        }
    }

    pub(crate) fn available(&self) -> usize {
        self.with_state(TokenBucket::available)
    }
}
