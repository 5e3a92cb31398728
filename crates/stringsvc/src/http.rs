//! JSON over HTTP bindings for the string service.

use crate::endpoints::{CountRequest, CountResponse, Endpoints, UppercaseRequest, UppercaseResponse};
use axum::Router;
use reqwest::{Method, Url};
use tower_kit::core::KitError;
use tower_kit::transport::{decode_json_request, encode_json_response, Client, Server};

/// Mounts `/uppercase` and `/count`. Any HTTP method is accepted.
pub fn router(endpoints: Endpoints) -> Router {
    Router::new()
        .route_service(
            "/uppercase",
            Server::new(
                endpoints.uppercase,
                decode_json_request::<UppercaseRequest>(),
                encode_json_response::<UppercaseResponse>(),
            ),
        )
        .route_service(
            "/count",
            Server::new(
                endpoints.count,
                decode_json_request::<CountRequest>(),
                encode_json_response::<CountResponse>(),
            ),
        )
}

/// Endpoints calling a remote string service at `instance`.
///
/// `instance` is a base URL or a bare `host:port`, in which case `http://` is
/// assumed. Both endpoints share one connection pool.
pub fn client(instance: &str) -> Result<Endpoints, KitError> {
    let base = parse_instance(instance)?;
    let http = reqwest::Client::new();

    Ok(Endpoints {
        uppercase: Client::<UppercaseRequest, UppercaseResponse>::json(
            Method::POST,
            with_path(&base, "/uppercase"),
        )
        .with_http_client(http.clone())
        .into_endpoint(),
        count: Client::<CountRequest, CountResponse>::json(Method::POST, with_path(&base, "/count"))
            .with_http_client(http)
            .into_endpoint(),
    })
}

fn parse_instance(instance: &str) -> Result<Url, KitError> {
    let instance = if instance.starts_with("http://") || instance.starts_with("https://") {
        instance.to_string()
    } else {
        format!("http://{instance}")
    };
    Url::parse(&instance).map_err(|e| KitError::internal(format!("invalid instance {instance}: {e}")))
}

fn with_path(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    url.set_path(path);
    url
}
