use crate::codec::{decode_json_response, encode_json_request};
use crate::server::REQUEST_TIMEOUT_HEADER;
use bytes::Bytes;
use http::StatusCode;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use tokio::time::Instant;
use tower::util::BoxCloneSyncService;
use tower::Service;
use tower_kit_core::{ErrorKind, Invocation, KitError};
use tower_kit_endpoint::{Endpoint, EndpointFuture};

/// Writes the endpoint request into an outgoing HTTP request.
pub type EncodeRequestFn<Req> =
    Arc<dyn Fn(RequestBuilder, Req) -> Result<RequestBuilder, KitError> + Send + Sync>;

/// Reads the endpoint response (or error) from a status and body.
pub type DecodeResponseFn<Res> =
    Arc<dyn Fn(StatusCode, Bytes) -> Result<Res, KitError> + Send + Sync>;

/// An endpoint backed by a remote HTTP server.
///
/// Calling it sends one request and decodes the reply, so it can be wrapped in
/// the same middleware as any local endpoint. The invocation context bounds
/// the call: its deadline becomes the request timeout (and is forwarded in
/// [`REQUEST_TIMEOUT_HEADER`]), and cancelling it abandons the request.
///
/// ```no_run
/// use reqwest::{Method, Url};
/// use serde::{Deserialize, Serialize};
/// use tower::ServiceExt;
/// use tower_kit_core::{Invocation, KitError};
/// use tower_kit_transport::Client;
///
/// #[derive(Serialize)]
/// struct UppercaseRequest { s: String }
///
/// #[derive(Deserialize)]
/// struct UppercaseResponse { v: String }
///
/// # async fn example() -> Result<(), KitError> {
/// let url = Url::parse("http://localhost:8080/uppercase").map_err(|e| KitError::internal(e.to_string()))?;
/// let uppercase = Client::<UppercaseRequest, UppercaseResponse>::json(Method::POST, url).into_endpoint();
///
/// let reply = uppercase
///     .oneshot(Invocation::new(UppercaseRequest { s: "hello".into() }))
///     .await?;
/// assert_eq!(reply.v, "HELLO");
/// # Ok(())
/// # }
/// ```
pub struct Client<Req, Res> {
    http: reqwest::Client,
    method: Method,
    url: Url,
    encode: EncodeRequestFn<Req>,
    decode: DecodeResponseFn<Res>,
}

impl<Req, Res> Client<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    pub fn new(
        method: Method,
        url: Url,
        encode: EncodeRequestFn<Req>,
        decode: DecodeResponseFn<Res>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            method,
            url,
            encode,
            decode,
        }
    }

    /// Uses `http` instead of a default `reqwest::Client`, e.g. to share a
    /// connection pool between endpoints.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Boxes the client into an [`Endpoint`].
    pub fn into_endpoint(self) -> Endpoint<Req, Res> {
        BoxCloneSyncService::new(self)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl<Req, Res> Client<Req, Res>
where
    Req: Serialize + Send + 'static,
    Res: DeserializeOwned + Send + 'static,
{
    /// A client speaking JSON both ways.
    pub fn json(method: Method, url: Url) -> Self {
        Self::new(method, url, encode_json_request(), decode_json_response())
    }
}

fn transport_error(err: reqwest::Error) -> KitError {
    if err.is_timeout() {
        KitError::canceled("deadline exceeded")
    } else {
        KitError::with_source(ErrorKind::Internal, err)
    }
}

impl<Req, Res> Clone for Client<Req, Res> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            method: self.method.clone(),
            url: self.url.clone(),
            encode: Arc::clone(&self.encode),
            decode: Arc::clone(&self.decode),
        }
    }
}

impl<Req, Res> fmt::Debug for Client<Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

impl<Req, Res> Service<Invocation<Req>> for Client<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    type Response = Res;
    type Error = KitError;
    type Future = EndpointFuture<Res>;

    fn poll_ready(&mut self, _cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, inv: Invocation<Req>) -> Self::Future {
        let (ctx, request) = inv.into_parts();
        let builder = self.http.request(self.method.clone(), self.url.clone());
        let encode = Arc::clone(&self.encode);
        let decode = Arc::clone(&self.decode);

        Box::pin(async move {
            ctx.check()?;

            let mut builder = encode(builder, request)?;
            if let Some(deadline) = ctx.deadline() {
                let remaining = deadline.saturating_duration_since(Instant::now());
                builder = builder
                    .timeout(remaining)
                    .header(REQUEST_TIMEOUT_HEADER, remaining.as_millis().to_string());
            }

            let exchange = async {
                let response = builder.send().await.map_err(transport_error)?;
                let status = response.status();
                let body = response.bytes().await.map_err(transport_error)?;
                Ok::<_, KitError>((status, body))
            };

            let (status, body) = tokio::select! {
                result = exchange => result?,
                err = ctx.done() => return Err(err),
            };

            decode(status, body)
        })
    }
}
