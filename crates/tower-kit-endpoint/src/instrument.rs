use crate::endpoint::EndpointFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::time::Instant;
use tower::{Layer, Service};
use tower_kit_core::{Invocation, KitError, MetricsRecorder};

/// Histogram receiving one duration sample per call.
pub const REQUEST_DURATION: &str = "request_duration_seconds";

/// Counter incremented once per call.
pub const REQUEST_COUNT: &str = "request_count";

/// Records a count and a duration for every call, tagged with the operation
/// name and whether it succeeded.
///
/// Without a recorder the layer passes calls through untouched.
#[derive(Clone)]
pub struct InstrumentingLayer {
    operation: Arc<str>,
    recorder: Option<Arc<dyn MetricsRecorder>>,
}

impl InstrumentingLayer {
    pub fn new(operation: impl Into<Arc<str>>, recorder: Option<Arc<dyn MetricsRecorder>>) -> Self {
        Self {
            operation: operation.into(),
            recorder,
        }
    }
}

impl<S> Layer<S> for InstrumentingLayer {
    type Service = Instrumenting<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Instrumenting {
            inner,
            operation: Arc::clone(&self.operation),
            recorder: self.recorder.clone(),
        }
    }
}

#[derive(Clone)]
pub struct Instrumenting<S> {
    inner: S,
    operation: Arc<str>,
    recorder: Option<Arc<dyn MetricsRecorder>>,
}

impl<S, Req> Service<Invocation<Req>> for Instrumenting<S>
where
    S: Service<Invocation<Req>, Error = KitError> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    Req: Send + 'static,
{
    type Response = S::Response;
    type Error = KitError;
    type Future = EndpointFuture<S::Response>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, inv: Invocation<Req>) -> Self::Future {
        let fut = self.inner.call(inv);
        let Some(recorder) = self.recorder.clone() else {
            return Box::pin(fut);
        };
        let operation = Arc::clone(&self.operation);

        Box::pin(async move {
            let begin = Instant::now();
            let result = fut.await;

            let tags = [
                ("method", operation.to_string()),
                ("success", result.is_ok().to_string()),
            ];
            recorder.observe(REQUEST_DURATION, &tags, begin.elapsed());
            recorder.increment(REQUEST_COUNT, &tags);

            result
        })
    }
}
