//! A string service built on tower-kit.
//!
//! Two operations, `uppercase` and `count`, written once as a plain
//! [`StringService`] and then layered:
//!
//! ```text
//! HTTP (/uppercase, /count)
//!   → endpoints: logging, tracing
//!     → service middleware: instrumenting, logging
//!       → BasicService
//! ```
//!
//! [`http::client`] builds the same [`Endpoints`] on top of HTTP clients, which
//! is how other services call this one.

pub mod endpoints;
pub mod http;
pub mod middleware;
pub mod service;

pub use endpoints::{
    CountRequest, CountResponse, Endpoints, UppercaseRequest, UppercaseResponse,
};
pub use service::{BasicService, StringError, StringService};

use std::sync::Arc;
use tower_kit::core::{Chain, MetricsRecorder};

/// The basic service wrapped in its service middleware.
///
/// Instrumenting is outermost so its latency covers the logging as well.
/// Without a recorder only logging is applied.
pub fn new_service(recorder: Option<Arc<dyn MetricsRecorder>>) -> Arc<dyn StringService> {
    Chain::new()
        .with_option(recorder.map(middleware::instrumenting))
        .with(middleware::logging())
        .build(Arc::new(BasicService::new()))
}
