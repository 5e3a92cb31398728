use crate::service::{StringError, StringService};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tower::ServiceExt;
use tower_kit::core::{Context, ErrorKind, Failer, Invocation, KitError, Tracer};
use tower_kit::endpoint::{endpoint_fn, Endpoint, EndpointBuilder, LoggingLayer, TracingLayer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UppercaseRequest {
    pub s: String,
}

/// Result of `uppercase`.
///
/// A rejected input is reported in `err` rather than as an endpoint error;
/// the transport picks it up through [`Failer`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UppercaseResponse {
    pub v: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

impl Failer for UppercaseResponse {
    fn failed(&self) -> Option<KitError> {
        let msg = self.err.as_deref()?;
        Some(match StringError::from_message(msg) {
            Some(err) => err.into(),
            None => KitError::new(ErrorKind::Validation, msg),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRequest {
    pub s: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResponse {
    pub v: usize,
}

impl Failer for CountResponse {}

/// Adapts `uppercase` to an endpoint. Validation errors move into the response.
pub fn make_uppercase_endpoint(
    svc: Arc<dyn StringService>,
) -> Endpoint<UppercaseRequest, UppercaseResponse> {
    endpoint_fn(move |ctx: Context, req: UppercaseRequest| {
        let svc = Arc::clone(&svc);
        async move {
            match svc.uppercase(ctx, req.s).await {
                Ok(v) => Ok(UppercaseResponse { v, err: None }),
                Err(err) if err.kind() == ErrorKind::Validation => Ok(UppercaseResponse {
                    v: String::new(),
                    err: Some(err.message().to_string()),
                }),
                Err(err) => Err(err),
            }
        }
    })
}

pub fn make_count_endpoint(svc: Arc<dyn StringService>) -> Endpoint<CountRequest, CountResponse> {
    endpoint_fn(move |ctx: Context, req: CountRequest| {
        let svc = Arc::clone(&svc);
        async move {
            let v = svc.count(ctx, req.s).await?;
            Ok::<_, KitError>(CountResponse { v })
        }
    })
}

/// Every endpoint of the string service.
///
/// Built either around a local service with [`Endpoints::new`], or from
/// remote clients with [`crate::http::client`]. Either way it implements
/// [`StringService`] again, so callers use a remote service exactly like a
/// local one.
#[derive(Clone)]
pub struct Endpoints {
    pub uppercase: Endpoint<UppercaseRequest, UppercaseResponse>,
    pub count: Endpoint<CountRequest, CountResponse>,
}

impl Endpoints {
    /// Wraps each operation of `svc` with logging and, given a tracer, a span
    /// per call.
    pub fn new(svc: Arc<dyn StringService>, tracer: Option<Arc<dyn Tracer>>) -> Self {
        let uppercase = EndpointBuilder::new()
            .layer(LoggingLayer::new("Uppercase"))
            .layer(TracingLayer::new("Uppercase", tracer.clone()))
            .build(make_uppercase_endpoint(Arc::clone(&svc)));

        let count = EndpointBuilder::new()
            .layer(LoggingLayer::new("Count"))
            .layer(TracingLayer::new("Count", tracer))
            .build(make_count_endpoint(svc));

        Self { uppercase, count }
    }
}

impl fmt::Debug for Endpoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoints").finish_non_exhaustive()
    }
}

impl StringService for Endpoints {
    fn uppercase(&self, ctx: Context, s: String) -> BoxFuture<'_, Result<String, KitError>> {
        let endpoint = self.uppercase.clone();
        Box::pin(async move {
            let response = endpoint
                .oneshot(Invocation::with_context(ctx, UppercaseRequest { s }))
                .await?;
            match response.failed() {
                Some(err) => Err(err),
                None => Ok(response.v),
            }
        })
    }

    fn count(&self, ctx: Context, s: String) -> BoxFuture<'_, Result<usize, KitError>> {
        let endpoint = self.count.clone();
        Box::pin(async move {
            let response = endpoint
                .oneshot(Invocation::with_context(ctx, CountRequest { s }))
                .await?;
            Ok::<_, KitError>(response.v)
        })
    }
}
