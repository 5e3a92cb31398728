use crate::client::{DecodeResponseFn, EncodeRequestFn};
use crate::server::{DecodeRequestFn, EncodeResponseFn};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::request::Parts;
use http::{HeaderValue, StatusCode};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_kit_core::{ErrorKind, KitError};

/// Status for a caller that gave up before the response was ready.
pub const STATUS_CLIENT_CLOSED_REQUEST: u16 = 499;

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// The single mapping from error kind to HTTP status.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Decode | ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::CircuitOpen => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Canceled => StatusCode::from_u16(STATUS_CLIENT_CLOSED_REQUEST)
            .unwrap_or(StatusCode::REQUEST_TIMEOUT),
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Recovers an error kind from a non-success status.
///
/// 400 covers both decode and validation failures on the server; the client
/// reports it as [`ErrorKind::Validation`].
pub fn kind_for_status(status: StatusCode) -> ErrorKind {
    match status.as_u16() {
        400 => ErrorKind::Validation,
        429 => ErrorKind::RateLimited,
        503 => ErrorKind::CircuitOpen,
        STATUS_CLIENT_CLOSED_REQUEST | 408 => ErrorKind::Canceled,
        _ => ErrorKind::Internal,
    }
}

fn json_response(status: StatusCode, body: Vec<u8>) -> Response {
    let mut response = (status, body).into_response();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// Default error encoder: the mapped status and `{"error": "<message>"}`.
pub fn encode_error(err: &KitError) -> Response {
    let body = ErrorBody {
        error: err.message().to_string(),
    };
    // A struct with one string field always serializes.
    let bytes = serde_json::to_vec(&body).unwrap_or_default();
    json_response(status_for(err.kind()), bytes)
}

/// Decodes the request body as JSON. Malformed input is a decode error.
pub fn decode_json_request<Req>() -> DecodeRequestFn<Req>
where
    Req: DeserializeOwned + 'static,
{
    Arc::new(|_parts: &Parts, body: Bytes| -> Result<Req, KitError> {
        serde_json::from_slice::<Req>(&body).map_err(|e| KitError::with_source(ErrorKind::Decode, e))
    })
}

/// Encodes the response as a `200 OK` JSON body.
pub fn encode_json_response<Res>() -> EncodeResponseFn<Res>
where
    Res: Serialize + 'static,
{
    Arc::new(|response: Res| -> Result<Response, KitError> {
        let bytes = serde_json::to_vec(&response)
            .map_err(|e| KitError::with_source(ErrorKind::Internal, e))?;
        Ok(json_response(StatusCode::OK, bytes))
    })
}

/// Sends the request as a JSON body.
pub fn encode_json_request<Req>() -> EncodeRequestFn<Req>
where
    Req: Serialize + 'static,
{
    Arc::new(
        |builder: RequestBuilder, request: Req| -> Result<RequestBuilder, KitError> {
            Ok(builder.json(&request))
        },
    )
}

/// Decodes a success status as `Res` and anything else as an [`ErrorBody`].
///
/// The error's kind comes from the status; its message from the body, or from
/// the status line if the body is not an error document.
pub fn decode_json_response<Res>() -> DecodeResponseFn<Res>
where
    Res: DeserializeOwned + 'static,
{
    Arc::new(|status: StatusCode, body: Bytes| -> Result<Res, KitError> {
        if status.is_success() {
            return serde_json::from_slice::<Res>(&body)
                .map_err(|e| KitError::with_source(ErrorKind::Decode, e));
        }

        let message = match serde_json::from_slice::<ErrorBody>(&body) {
            Ok(ErrorBody { error }) => error,
            Err(_) => status.to_string(),
        };
        Err(KitError::new(kind_for_status(status), message))
    })
}
