//! Layered endpoints for Tower services.
//!
//! `tower-kit` separates a service into three layers: the business trait you
//! write, the [`Endpoint`](endpoint::Endpoint) each operation is adapted to,
//! and the transport that exposes endpoints over HTTP. Cross-cutting concerns
//! are middleware at whichever layer fits them:
//!
//! - **Endpoint middleware**: [logging](endpoint::LoggingLayer),
//!   [instrumentation](endpoint::InstrumentingLayer), [tracing](endpoint::TracingLayer),
//!   rate limiting (`ratelimiter` feature) and circuit breaking (`circuitbreaker` feature)
//! - **Transport options** (`transport` feature): `before` hooks, error
//!   encoders and error handlers
//!
//! Every layer speaks [`KitError`](core::KitError), whose
//! [`ErrorKind`](core::ErrorKind) decides the HTTP status in exactly one place.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(all(feature = "circuitbreaker", feature = "ratelimiter"))]
//! # {
//! use std::time::Duration;
//! use tower_kit::circuitbreaker::CircuitBreakerConfig;
//! use tower_kit::core::{Context, KitError};
//! use tower_kit::endpoint::{endpoint_fn, EndpointBuilder, LoggingLayer};
//! use tower_kit::ratelimiter::RateLimiterConfig;
//!
//! let concat = endpoint_fn(|_ctx: Context, (a, b): (String, String)| async move {
//!     Ok::<_, KitError>(format!("{a}{b}"))
//! });
//!
//! let concat = EndpointBuilder::new()
//!     .layer(LoggingLayer::new("Concat"))
//!     .layer(RateLimiterConfig::builder().capacity(100).refill_per_second(1.0).build())
//!     .layer(
//!         CircuitBreakerConfig::builder()
//!             .failure_threshold(5)
//!             .wait_duration_in_open(Duration::from_secs(30))
//!             .build(),
//!     )
//!     .build(concat);
//! # let _ = concat;
//! # }
//! ```

pub use tower_kit_core as core;
pub use tower_kit_endpoint as endpoint;

#[cfg(feature = "circuitbreaker")]
pub use tower_kit_circuitbreaker as circuitbreaker;

#[cfg(feature = "ratelimiter")]
pub use tower_kit_ratelimiter as ratelimiter;

#[cfg(feature = "transport")]
pub use tower_kit_transport as transport;
