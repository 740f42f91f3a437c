//! HTTP API handlers.

pub mod checkout;
pub mod extractors;
pub mod webhook;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Render an error as the single `{ "error": string }` body shape shared
/// by every endpoint. Nothing internal (stack traces, secrets) goes in.
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}
