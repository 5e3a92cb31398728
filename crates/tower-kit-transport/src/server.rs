use crate::codec::encode_error;
use axum::body::to_bytes;
use axum::extract::Request;
use axum::response::Response;
use bytes::Bytes;
use futures::future::BoxFuture;
use http::request::Parts;
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use std::time::Duration;
use tower::{Service, ServiceExt};
use tower_kit_core::{Context, Failer, Invocation, KitError};
use tower_kit_endpoint::Endpoint;
use tracing::warn;

/// Header a caller can set to bound how long the server works on its request.
pub const REQUEST_TIMEOUT_HEADER: &str = "x-request-timeout-ms";

const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Turns the request head and body into the endpoint's request type.
pub type DecodeRequestFn<Req> = Arc<dyn Fn(&Parts, Bytes) -> Result<Req, KitError> + Send + Sync>;

/// Turns the endpoint's response into an HTTP response.
pub type EncodeResponseFn<Res> = Arc<dyn Fn(Res) -> Result<Response, KitError> + Send + Sync>;

/// Turns any failure into an HTTP response.
pub type ErrorEncoder = Arc<dyn Fn(&KitError) -> Response + Send + Sync>;

/// Derives the invocation context from the request head before decoding.
pub type RequestFn = Arc<dyn Fn(Context, &Parts) -> Context + Send + Sync>;

/// Observes every failure before it is encoded.
pub type ErrorHandler = Arc<dyn Fn(&KitError) + Send + Sync>;

/// `before` hook honoring [`REQUEST_TIMEOUT_HEADER`].
///
/// A valid millisecond count sets the context deadline; a missing or
/// unparsable header leaves the context as it is.
pub fn deadline_from_header(ctx: Context, parts: &Parts) -> Context {
    let timeout = parts
        .headers
        .get(REQUEST_TIMEOUT_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());

    match timeout {
        Some(ms) => ctx.with_timeout(Duration::from_millis(ms)),
        None => ctx,
    }
}

/// Default error handler: logs the failure at `WARN`.
pub fn log_error(err: &KitError) {
    warn!(error = %err, kind = %err.kind(), "request failed");
}

/// Serves one endpoint over HTTP.
///
/// `Server` is a Tower service over axum requests that never fails at the
/// service level, so it mounts directly with
/// [`Router::route_service`](axum::Router::route_service).
///
/// ```
/// use tower_kit_core::{Context, Failer, KitError};
/// use tower_kit_endpoint::endpoint_fn;
/// use tower_kit_transport::{decode_json_request, encode_json_response, Server};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Deserialize)]
/// struct CountRequest { s: String }
///
/// #[derive(Serialize)]
/// struct CountResponse { v: usize }
///
/// impl Failer for CountResponse {}
///
/// let count = endpoint_fn(|_ctx: Context, req: CountRequest| async move {
///     Ok::<_, KitError>(CountResponse { v: req.s.chars().count() })
/// });
///
/// let app: axum::Router = axum::Router::new().route_service(
///     "/count",
///     Server::new(count, decode_json_request(), encode_json_response()),
/// );
/// ```
pub struct Server<Req, Res> {
    endpoint: Endpoint<Req, Res>,
    decode: DecodeRequestFn<Req>,
    encode: EncodeResponseFn<Res>,
    before: Vec<RequestFn>,
    error_encoder: ErrorEncoder,
    error_handler: Option<ErrorHandler>,
    body_limit: usize,
}

impl<Req, Res> Server<Req, Res>
where
    Req: Send + 'static,
    Res: Failer + Send + 'static,
{
    /// Creates a server with the default error encoder, the
    /// [`deadline_from_header`] hook and [`log_error`] as error handler.
    pub fn new(
        endpoint: Endpoint<Req, Res>,
        decode: DecodeRequestFn<Req>,
        encode: EncodeResponseFn<Res>,
    ) -> Self {
        Self {
            endpoint,
            decode,
            encode,
            before: vec![Arc::new(deadline_from_header)],
            error_encoder: Arc::new(encode_error),
            error_handler: Some(Arc::new(log_error)),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Appends a hook run, in order, on every request before decoding.
    pub fn before<F>(mut self, f: F) -> Self
    where
        F: Fn(Context, &Parts) -> Context + Send + Sync + 'static,
    {
        self.before.push(Arc::new(f));
        self
    }

    /// Replaces the error encoder.
    pub fn error_encoder<F>(mut self, f: F) -> Self
    where
        F: Fn(&KitError) -> Response + Send + Sync + 'static,
    {
        self.error_encoder = Arc::new(f);
        self
    }

    /// Replaces the error handler.
    pub fn error_handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&KitError) + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(f));
        self
    }

    /// Stops reporting failures to any error handler.
    pub fn without_error_handler(mut self) -> Self {
        self.error_handler = None;
        self
    }

    /// Sets the largest request body accepted, in bytes.
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    fn fail(&self, err: KitError) -> Response {
        if let Some(handler) = &self.error_handler {
            handler(&err);
        }
        (self.error_encoder)(&err)
    }

    async fn serve(self, request: Request) -> Response {
        let (parts, body) = request.into_parts();

        let span = tracing::info_span!("http", method = %parts.method, path = %parts.uri.path());
        let mut ctx = Context::new().with_span(span);
        for hook in &self.before {
            ctx = hook(ctx, &parts);
        }

        let bytes = match to_bytes(body, self.body_limit).await {
            Ok(bytes) => bytes,
            Err(e) => return self.fail(KitError::decode(e.to_string())),
        };

        let request = match (self.decode)(&parts, bytes) {
            Ok(request) => request,
            Err(err) => return self.fail(err),
        };

        let response = match self
            .endpoint
            .clone()
            .oneshot(Invocation::with_context(ctx, request))
            .await
        {
            Ok(response) => response,
            Err(err) => return self.fail(err),
        };

        if let Some(err) = response.failed() {
            return self.fail(err);
        }

        match (self.encode)(response) {
            Ok(response) => response,
            Err(err) => self.fail(err),
        }
    }
}

impl<Req, Res> Clone for Server<Req, Res> {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            decode: Arc::clone(&self.decode),
            encode: Arc::clone(&self.encode),
            before: self.before.clone(),
            error_encoder: Arc::clone(&self.error_encoder),
            error_handler: self.error_handler.clone(),
            body_limit: self.body_limit,
        }
    }
}

impl<Req, Res> fmt::Debug for Server<Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("before", &self.before.len())
            .field("body_limit", &self.body_limit)
            .finish_non_exhaustive()
    }
}

impl<Req, Res> Service<Request> for Server<Req, Res>
where
    Req: Send + 'static,
    Res: Failer + Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let server = self.clone();
        Box::pin(async move { Ok(server.serve(request).await) })
    }
}
