//! JSON over HTTP bindings for the add service.

use crate::endpoints::{ConcatRequest, ConcatResponse, Endpoints, SumRequest, SumResponse};
use axum::Router;
use reqwest::{Method, Url};
use tower_kit::core::KitError;
use tower_kit::transport::{decode_json_request, encode_json_response, Client, Server};

/// Mounts `/sum` and `/concat`. Any HTTP method is accepted.
pub fn router(endpoints: Endpoints) -> Router {
    Router::new()
        .route_service(
            "/sum",
            Server::new(
                endpoints.sum,
                decode_json_request::<SumRequest>(),
                encode_json_response::<SumResponse>(),
            ),
        )
        .route_service(
            "/concat",
            Server::new(
                endpoints.concat,
                decode_json_request::<ConcatRequest>(),
                encode_json_response::<ConcatResponse>(),
            ),
        )
}

/// Endpoints calling a remote add service at `instance` (a base URL, or
/// `host:port` for plain HTTP).
///
/// The endpoints carry no middleware; use [`Endpoints::layered`] to add
/// client-side rate limiting and circuit breaking.
pub fn client(instance: &str) -> Result<Endpoints, KitError> {
    let base = if instance.starts_with("http://") || instance.starts_with("https://") {
        instance.to_string()
    } else {
        format!("http://{instance}")
    };
    let base = Url::parse(&base).map_err(|e| KitError::internal(format!("invalid instance {base}: {e}")))?;
    let http = reqwest::Client::new();

    let mut sum_url = base.clone();
    sum_url.set_path("/sum");
    let mut concat_url = base;
    concat_url.set_path("/concat");

    Ok(Endpoints {
        sum: Client::<SumRequest, SumResponse>::json(Method::POST, sum_url)
            .with_http_client(http.clone())
            .into_endpoint(),
        concat: Client::<ConcatRequest, ConcatResponse>::json(Method::POST, concat_url)
            .with_http_client(http)
            .into_endpoint(),
    })
}
