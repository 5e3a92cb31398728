//! Shared helpers for the end-to-end tests.

use addsvc::{EndpointSettings, RateLimit};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use stringsvc::StringService;
use tokio::net::TcpListener;
use tower::ServiceExt;

/// Sends `body` to `path` and returns the status and the JSON body.
///
/// A body that is not JSON (axum's own 404, for example) comes back as `Null`.
pub async fn call(app: &Router, method: &str, path: &str, body: &str) -> (StatusCode, Value) {
    call_with_headers(app, method, path, body, &[]).await
}

pub async fn call_with_headers(
    app: &Router,
    method: &str,
    path: &str,
    body: &str,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method(method)
        .uri(path)
        .header("content-type", "application/json");
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    let request = request.body(Body::from(body.to_string())).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Serves `app` on an ephemeral local port.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// An address nothing listens on.
pub async fn dead_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Endpoint settings generous enough that no test hits the rate limits.
pub fn unthrottled() -> EndpointSettings {
    EndpointSettings {
        sum_limit: RateLimit {
            capacity: 1_000,
            per_second: 1_000.0,
        },
        concat_limit: RateLimit {
            capacity: 1_000,
            per_second: 1_000.0,
        },
        ..EndpointSettings::default()
    }
}

/// The addsvc router over a fresh service.
pub fn addsvc_app(
    settings: &EndpointSettings,
    postprocess: Option<Arc<dyn StringService>>,
) -> Router {
    let svc = addsvc::new_service(None, None, postprocess);
    addsvc::http::router(addsvc::Endpoints::new(svc, settings))
}

/// The stringsvc router over a fresh service.
pub fn stringsvc_app() -> Router {
    let svc = stringsvc::new_service(None);
    stringsvc::http::router(stringsvc::Endpoints::new(svc, None))
}
