use crate::endpoint::EndpointFuture;
use std::fmt::Debug;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::time::Instant;
use tower::{Layer, Service};
use tower_kit_core::{Invocation, KitError};
use tracing::{info, warn};

/// Logs every call: operation, request and response summaries, error and
/// elapsed time. Never changes the outcome.
#[derive(Debug, Clone)]
pub struct LoggingLayer {
    operation: Arc<str>,
}

impl LoggingLayer {
    pub fn new(operation: impl Into<Arc<str>>) -> Self {
        Self {
            operation: operation.into(),
        }
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging {
            inner,
            operation: Arc::clone(&self.operation),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
    operation: Arc<str>,
}

impl<S, Req> Service<Invocation<Req>> for Logging<S>
where
    S: Service<Invocation<Req>, Error = KitError> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: Debug + Send + 'static,
    Req: Debug + Send + 'static,
{
    type Response = S::Response;
    type Error = KitError;
    type Future = EndpointFuture<S::Response>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, inv: Invocation<Req>) -> Self::Future {
        let operation = Arc::clone(&self.operation);
        let request = format!("{:?}", inv.request);
        let fut = self.inner.call(inv);

        Box::pin(async move {
            let begin = Instant::now();
            let result = fut.await;
            let took = begin.elapsed();

            match &result {
                Ok(response) => info!(
                    method = %operation,
                    request = %request,
                    response = ?response,
                    took = ?took,
                    "endpoint call"
                ),
                Err(err) => warn!(
                    method = %operation,
                    request = %request,
                    error = %err,
                    kind = %err.kind(),
                    took = ?took,
                    "endpoint call failed"
                ),
            }

            result
        })
    }
}
