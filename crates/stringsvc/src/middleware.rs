//! Service middleware.
//!
//! Each middleware wraps a [`StringService`] and is itself one, so they stack
//! with [`Chain`](tower_kit::core::Chain), the first added outermost.

use crate::service::StringService;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::time::Instant;
use tower_kit::core::{Context, KitError, MetricsRecorder};

/// Counter of calls, tagged by method and error.
pub const REQUEST_COUNT: &str = "stringsvc_request_count";

/// Histogram of call latency in seconds, tagged by method and error.
pub const REQUEST_LATENCY: &str = "stringsvc_request_latency_seconds";

/// Histogram of the values returned by `count`.
pub const COUNT_RESULT: &str = "stringsvc_count_result";

/// Logs arguments, result and elapsed time of every call.
pub fn logging() -> impl Fn(Arc<dyn StringService>) -> Arc<dyn StringService> + Send + Sync {
    |next: Arc<dyn StringService>| -> Arc<dyn StringService> { Arc::new(Logging { next }) }
}

/// Records request count and latency, and the distribution of count results.
pub fn instrumenting(
    recorder: Arc<dyn MetricsRecorder>,
) -> impl Fn(Arc<dyn StringService>) -> Arc<dyn StringService> + Send + Sync {
    move |next: Arc<dyn StringService>| -> Arc<dyn StringService> {
        Arc::new(Instrumenting {
            next,
            recorder: Arc::clone(&recorder),
        })
    }
}

struct Logging {
    next: Arc<dyn StringService>,
}

impl StringService for Logging {
    fn uppercase(&self, ctx: Context, s: String) -> BoxFuture<'_, Result<String, KitError>> {
        Box::pin(async move {
            let begin = Instant::now();
            let arg = s.clone();
            let result = self.next.uppercase(ctx, s).await;
            match &result {
                Ok(v) => tracing::info!(method = "Uppercase", s = %arg, v = %v, took = ?begin.elapsed()),
                Err(err) => tracing::info!(method = "Uppercase", s = %arg, err = %err, took = ?begin.elapsed()),
            }
            result
        })
    }

    fn count(&self, ctx: Context, s: String) -> BoxFuture<'_, Result<usize, KitError>> {
        Box::pin(async move {
            let begin = Instant::now();
            let arg = s.clone();
            let result = self.next.count(ctx, s).await;
            match &result {
                Ok(n) => tracing::info!(method = "Count", s = %arg, n = n, took = ?begin.elapsed()),
                Err(err) => tracing::info!(method = "Count", s = %arg, err = %err, took = ?begin.elapsed()),
            }
            result
        })
    }
}

struct Instrumenting {
    next: Arc<dyn StringService>,
    recorder: Arc<dyn MetricsRecorder>,
}

impl Instrumenting {
    fn observe<T>(&self, method: &'static str, begin: Instant, result: &Result<T, KitError>) {
        let tags = [
            ("method", method.to_string()),
            ("error", result.is_err().to_string()),
        ];
        self.recorder.increment(REQUEST_COUNT, &tags);
        self.recorder.observe(REQUEST_LATENCY, &tags, begin.elapsed());
    }
}

impl StringService for Instrumenting {
    fn uppercase(&self, ctx: Context, s: String) -> BoxFuture<'_, Result<String, KitError>> {
        Box::pin(async move {
            let begin = Instant::now();
            let result = self.next.uppercase(ctx, s).await;
            self.observe("uppercase", begin, &result);
            result
        })
    }

    fn count(&self, ctx: Context, s: String) -> BoxFuture<'_, Result<usize, KitError>> {
        Box::pin(async move {
            let begin = Instant::now();
            let result = self.next.count(ctx, s).await;
            self.observe("count", begin, &result);
            if let Ok(n) = &result {
                self.recorder.record(COUNT_RESULT, &[], *n as f64);
            }
            result
        })
    }
}
