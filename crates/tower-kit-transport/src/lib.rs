//! HTTP bindings for tower-kit endpoints.
//!
//! [`Server`] turns an [`Endpoint`](tower_kit_endpoint::Endpoint) into an axum
//! route: it runs the `before` hooks to build the invocation context, decodes
//! the body into the endpoint's request type, invokes the endpoint and encodes
//! the result. Every failure, whether a decode error, an endpoint error or a
//! response reporting its own failure through
//! [`Failer`](tower_kit_core::Failer), goes through one error encoder.
//!
//! [`Client`] is the other direction: an endpoint whose invocation is an HTTP
//! round trip, so client-side middleware composes exactly like server-side.
//!
//! Wire format: success bodies are whatever the response type serializes to
//! (`{"v": ...}` for the bundled services); error bodies are
//! `{"error": "<message>"}` with the status from [`status_for`].

mod client;
mod codec;
mod server;

pub use client::{Client, DecodeResponseFn, EncodeRequestFn};
pub use codec::{
    decode_json_request, decode_json_response, encode_error, encode_json_request,
    encode_json_response, kind_for_status, status_for, ErrorBody, STATUS_CLIENT_CLOSED_REQUEST,
};
pub use server::{
    deadline_from_header, log_error, DecodeRequestFn, EncodeResponseFn, ErrorEncoder,
    ErrorHandler, RequestFn, Server, REQUEST_TIMEOUT_HEADER,
};
