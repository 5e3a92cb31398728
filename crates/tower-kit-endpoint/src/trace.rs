use crate::endpoint::EndpointFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tower_kit_core::{Invocation, KitError, Tracer};
use tracing::Instrument;

/// Opens a span per call, named after the operation and recording its outcome.
///
/// The span becomes the invocation context's span, so spans started by inner
/// layers (or by an HTTP client endpoint further down) nest under it. Without
/// a tracer the layer passes calls through untouched.
#[derive(Clone)]
pub struct TracingLayer {
    operation: Arc<str>,
    tracer: Option<Arc<dyn Tracer>>,
}

impl TracingLayer {
    pub fn new(operation: impl Into<Arc<str>>, tracer: Option<Arc<dyn Tracer>>) -> Self {
        Self {
            operation: operation.into(),
            tracer,
        }
    }
}

impl<S> Layer<S> for TracingLayer {
    type Service = Tracing<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Tracing {
            inner,
            operation: Arc::clone(&self.operation),
            tracer: self.tracer.clone(),
        }
    }
}

#[derive(Clone)]
pub struct Tracing<S> {
    inner: S,
    operation: Arc<str>,
    tracer: Option<Arc<dyn Tracer>>,
}

impl<S, Req> Service<Invocation<Req>> for Tracing<S>
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
        let Some(tracer) = &self.tracer else {
            return Box::pin(self.inner.call(inv));
        };

        let (context, request) = inv.into_parts();
        let span = tracer.start_span(&self.operation, context.span());
        let inv = Invocation::with_context(context.with_span(span.clone()), request);

        let fut = span.in_scope(|| self.inner.call(inv));
        let record = span.clone();

        Box::pin(
            async move {
                let result = fut.await;
                match &result {
                    Ok(_) => {
                        record.record("outcome", "success");
                    }
                    Err(err) => {
                        record.record("outcome", "failure");
                        record.record("error", tracing::field::display(err));
                    }
                }
                result
            }
            .instrument(span),
        )
    }
}
