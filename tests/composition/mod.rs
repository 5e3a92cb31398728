//! Ordering and short-circuit behavior of composed middleware.
//!
//! `order_verification` checks that the first middleware added runs
//! outermost, for both service middleware and endpoint middleware, and that
//! the position of the circuit breaker relative to the rate limiter matters.
//! `short_circuit` checks that rejected calls never reach the service.

mod order_verification;
mod test_utils;
