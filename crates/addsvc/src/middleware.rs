//! Service middleware for [`AddService`].
//!
//! Each function returns a constructor for [`Chain`](tower_kit::core::Chain):
//!
//! ```
//! use addsvc::middleware::{instrumenting, logging};
//! use addsvc::{AddService, BasicService};
//! use std::sync::Arc;
//! use tower_kit::core::{Chain, MetricsFacade};
//!
//! let svc: Arc<dyn AddService> = Chain::new()
//!     .with(instrumenting(Arc::new(MetricsFacade::new())))
//!     .with(logging())
//!     .build(Arc::new(BasicService::new()));
//! ```

use crate::service::AddService;
use futures::future::BoxFuture;
use std::sync::Arc;
use stringsvc::StringService;
use tokio::time::Instant;
use tower_kit::core::{Context, KitError, MetricsRecorder};

/// Counter of integers that went into successful sums.
pub const INTEGERS_SUMMED: &str = "addsvc_integers_summed";

/// Counter of characters produced by successful concatenations.
pub const CHARACTERS_CONCATENATED: &str = "addsvc_characters_concatenated";

/// Logs the arguments, result and duration of every call.
pub fn logging() -> impl Fn(Arc<dyn AddService>) -> Arc<dyn AddService> + Send + Sync {
    |next: Arc<dyn AddService>| -> Arc<dyn AddService> { Arc::new(Logging { next }) }
}

/// Counts integers summed and characters concatenated.
pub fn instrumenting(
    recorder: Arc<dyn MetricsRecorder>,
) -> impl Fn(Arc<dyn AddService>) -> Arc<dyn AddService> + Send + Sync {
    move |next: Arc<dyn AddService>| -> Arc<dyn AddService> {
        Arc::new(Instrumenting {
            next,
            recorder: Arc::clone(&recorder),
        })
    }
}

/// Upper-cases every concat result with a (usually remote) string service.
///
/// If that call fails the failure is logged and the result is returned as it
/// came from the inner service.
pub fn remote_uppercasing(
    strings: Arc<dyn StringService>,
) -> impl Fn(Arc<dyn AddService>) -> Arc<dyn AddService> + Send + Sync {
    move |next: Arc<dyn AddService>| -> Arc<dyn AddService> {
        Arc::new(RemoteUppercasing {
            next,
            strings: Arc::clone(&strings),
        })
    }
}

struct Logging {
    next: Arc<dyn AddService>,
}

impl AddService for Logging {
    fn sum(&self, ctx: Context, a: i64, b: i64) -> BoxFuture<'_, Result<i64, KitError>> {
        Box::pin(async move {
            let begin = Instant::now();
            let result = self.next.sum(ctx, a, b).await;
            match &result {
                Ok(v) => tracing::info!(method = "Sum", a, b, result = v, took = ?begin.elapsed()),
                Err(err) => tracing::info!(method = "Sum", a, b, error = %err, took = ?begin.elapsed()),
            }
            result
        })
    }

    fn concat(&self, ctx: Context, a: String, b: String) -> BoxFuture<'_, Result<String, KitError>> {
        Box::pin(async move {
            let begin = Instant::now();
            let args = (a.clone(), b.clone());
            let result = self.next.concat(ctx, a, b).await;
            match &result {
                Ok(v) => tracing::info!(method = "Concat", a = ?args.0, b = ?args.1, result = ?v, took = ?begin.elapsed()),
                Err(err) => tracing::info!(method = "Concat", a = ?args.0, b = ?args.1, error = %err, took = ?begin.elapsed()),
            }
            result
        })
    }
}

struct Instrumenting {
    next: Arc<dyn AddService>,
    recorder: Arc<dyn MetricsRecorder>,
}

impl AddService for Instrumenting {
    fn sum(&self, ctx: Context, a: i64, b: i64) -> BoxFuture<'_, Result<i64, KitError>> {
        Box::pin(async move {
            let result = self.next.sum(ctx, a, b).await;
            if result.is_ok() {
                self.recorder.add(INTEGERS_SUMMED, &[], 2);
            }
            result
        })
    }

    fn concat(&self, ctx: Context, a: String, b: String) -> BoxFuture<'_, Result<String, KitError>> {
        Box::pin(async move {
            let result = self.next.concat(ctx, a, b).await;
            if let Ok(v) = &result {
                self.recorder
                    .add(CHARACTERS_CONCATENATED, &[], v.chars().count() as u64);
            }
            result
        })
    }
}

struct RemoteUppercasing {
    next: Arc<dyn AddService>,
    strings: Arc<dyn StringService>,
}

impl AddService for RemoteUppercasing {
    fn sum(&self, ctx: Context, a: i64, b: i64) -> BoxFuture<'_, Result<i64, KitError>> {
        self.next.sum(ctx, a, b)
    }

    fn concat(&self, ctx: Context, a: String, b: String) -> BoxFuture<'_, Result<String, KitError>> {
        Box::pin(async move {
            let v = self.next.concat(ctx.clone(), a, b).await?;
            match self.strings.uppercase(ctx, v.clone()).await {
                Ok(upper) => Ok::<_, KitError>(upper),
                Err(err) => {
                    tracing::warn!(error = %err, kind = %err.kind(), "remote uppercase failed, returning result unchanged");
                    Ok(v)
                }
            }
        })
    }
}
