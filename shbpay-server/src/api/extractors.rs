//! Custom Axum extractors for request authentication.
//!
//! Provides `VerifiedWebhook` — reads the `x-razorpay-signature` header,
//! computes the HMAC over the **raw body bytes**, compares in constant
//! time, and only then parses the JSON. Verifying pre-parse means a
//! re-serialization can never change the signed message.

use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shbpay_gateway::objects::webhook::WebhookEvent;
use shbpay_gateway::signature::{WEBHOOK_SIGNATURE_HEADER, verify_webhook_signature};

use crate::api::error_response;
use crate::state::AppState;

/// Upper bound on webhook bodies; gateway events are small.
const MAX_WEBHOOK_BODY_BYTES: usize = 1024 * 1024;

/// An Axum extractor carrying a signature-verified, parsed webhook event.
pub struct VerifiedWebhook(pub WebhookEvent);

/// Errors that can occur during webhook verification.
#[derive(Debug, thiserror::Error)]
pub enum WebhookRejection {
    #[error("missing webhook signature")]
    MissingSignature,
    #[error("invalid webhook signature header")]
    InvalidHeader,
    #[error("failed to read request body")]
    BodyReadError,
    #[error("webhook signature mismatch")]
    SignatureMismatch,
    #[error("invalid webhook JSON: {0}")]
    InvalidJson(serde_json::Error),
}

impl IntoResponse for WebhookRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            WebhookRejection::MissingSignature => {
                (StatusCode::UNAUTHORIZED, "Missing webhook signature")
            }
            WebhookRejection::InvalidHeader => {
                (StatusCode::BAD_REQUEST, "Invalid webhook signature header")
            }
            WebhookRejection::BodyReadError => {
                (StatusCode::BAD_REQUEST, "Failed to read request body")
            }
            WebhookRejection::SignatureMismatch => {
                (StatusCode::UNAUTHORIZED, "Invalid webhook signature")
            }
            WebhookRejection::InvalidJson(_) => (StatusCode::BAD_REQUEST, "Invalid JSON body"),
        };
        error_response(status, message)
    }
}

impl FromRequest<AppState> for VerifiedWebhook {
    type Rejection = WebhookRejection;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let header_value = req
            .headers()
            .get(WEBHOOK_SIGNATURE_HEADER)
            .ok_or(WebhookRejection::MissingSignature)?
            .to_str()
            .map_err(|_| WebhookRejection::InvalidHeader)?
            .trim()
            .to_owned();

        let body_bytes = axum::body::to_bytes(req.into_body(), MAX_WEBHOOK_BODY_BYTES)
            .await
            .map_err(|_| WebhookRejection::BodyReadError)?;

        if !verify_webhook_signature(
            state.config.gateway.webhook_secret.as_bytes(),
            &body_bytes,
            &header_value,
        ) {
            return Err(WebhookRejection::SignatureMismatch);
        }

        let event: WebhookEvent =
            serde_json::from_slice(&body_bytes).map_err(WebhookRejection::InvalidJson)?;

        Ok(VerifiedWebhook(event))
    }
}
