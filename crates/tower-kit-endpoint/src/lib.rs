//! Endpoints and endpoint middleware.
//!
//! An [`Endpoint`] is the uniform shape every service operation is adapted to:
//! a cloneable, shareable Tower service taking an
//! [`Invocation`](tower_kit_core::Invocation) (context plus typed request) and
//! resolving to the typed response or a [`KitError`](tower_kit_core::KitError).
//! Each operation gets its own request/response pair, so a mismatched request
//! is a compile error rather than a runtime cast failure.
//!
//! [`endpoint_fn`] adapts an async function into the terminal endpoint.
//! [`EndpointBuilder`] stacks middleware on top of it, first added outermost.
//! This crate provides the observability layers:
//!
//! - [`LoggingLayer`]: operation, request and response summaries, error, elapsed time
//! - [`InstrumentingLayer`]: one count and one duration sample per call
//! - [`TracingLayer`]: one span per call, carried on to inner layers in the context
//!
//! The rate limiter and circuit breaker from `tower-kit-ratelimiter` and
//! `tower-kit-circuitbreaker` stack the same way.
//!
//! ```
//! use tower_kit_core::{Context, Invocation, KitError, MetricsFacade, TracingTracer};
//! use tower_kit_endpoint::{endpoint_fn, EndpointBuilder, InstrumentingLayer, LoggingLayer, TracingLayer};
//! use tower::ServiceExt;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), KitError> {
//! let sum = endpoint_fn(|_ctx: Context, (a, b): (i64, i64)| async move {
//!     Ok::<_, KitError>(a + b)
//! });
//!
//! let sum = EndpointBuilder::new()
//!     .layer(InstrumentingLayer::new("Sum", Some(Arc::new(MetricsFacade::new()))))
//!     .layer(LoggingLayer::new("Sum"))
//!     .layer(TracingLayer::new("Sum", Some(Arc::new(TracingTracer))))
//!     .build(sum);
//!
//! assert_eq!(sum.oneshot(Invocation::new((1, 2))).await?, 3);
//! # Ok(())
//! # }
//! ```

mod builder;
mod endpoint;
mod instrument;
mod logging;
mod trace;

pub use builder::EndpointBuilder;
pub use endpoint::{endpoint_fn, Endpoint, EndpointFuture};
pub use instrument::{Instrumenting, InstrumentingLayer, REQUEST_COUNT, REQUEST_DURATION};
pub use logging::{Logging, LoggingLayer};
pub use trace::{Tracing, TracingLayer};
