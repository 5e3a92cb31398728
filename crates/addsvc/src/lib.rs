//! An add service built on tower-kit.
//!
//! `sum` and `concat` are written once as a plain [`AddService`], then
//! decorated in two places:
//!
//! ```text
//! HTTP (/sum, /concat)
//!   → endpoints: instrumenting, logging, tracing, circuit breaker, rate limiter
//!     → service middleware: instrumenting, logging, remote uppercasing
//!       → BasicService
//! ```
//!
//! Sum and concat each get their own token bucket and breaker. With the
//! defaults sum admits one call per second and concat a hundred.
//!
//! ```no_run
//! use addsvc::{http, new_service, EndpointSettings, Endpoints};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let svc = new_service(None, None, None);
//! let app = http::router(Endpoints::new(svc, &EndpointSettings::default()));
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod endpoints;
pub mod http;
pub mod middleware;
pub mod service;

pub use config::Config;
pub use endpoints::{
    ConcatRequest, ConcatResponse, EndpointSettings, Endpoints, RateLimit, SumRequest, SumResponse,
};
pub use service::{AddError, AddService, BasicService};

use std::sync::Arc;
use stringsvc::StringService;
use tower_kit::core::{Chain, MetricsRecorder};

/// The basic service wrapped in its service middleware, outermost first:
/// instrumenting (given a recorder), logging, remote uppercasing (given a
/// string service).
pub fn new_service(
    max_concat_len: Option<usize>,
    recorder: Option<Arc<dyn MetricsRecorder>>,
    postprocess: Option<Arc<dyn StringService>>,
) -> Arc<dyn AddService> {
    Chain::new()
        .with_option(recorder.map(middleware::instrumenting))
        .with(middleware::logging())
        .with_option(postprocess.map(middleware::remote_uppercasing))
        .build(Arc::new(
            BasicService::new().with_max_concat_len(max_concat_len),
        ))
}
