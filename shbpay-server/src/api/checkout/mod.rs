//! Checkout API handlers.
//!
//! These endpoints are called by the storefront's browser code and drive
//! the gateway checkout widget. The browser only ever holds the opaque
//! `paymentToken`; internal order ids and server secrets never cross this
//! boundary.
//!
//! # Endpoints
//!
//! - `POST /create-order`   – create a gateway order for a product
//! - `POST /submit-payment` – record a client-reported checkout outcome
//! - `POST /payment-status` – poll (and reconcile) order status

use axum::{Router, http::StatusCode, response::IntoResponse, routing::post};
use rand::{Rng, distr::Alphanumeric};
use shbpay_gateway::client::ClientError;

use crate::api::error_response;
use crate::state::AppState;

mod create_order;
mod payment_status;
mod submit_payment;

/// Build the Checkout API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-order", post(create_order::create_order))
        .route("/submit-payment", post(submit_payment::submit_payment))
        .route("/payment-status", post(payment_status::payment_status))
}

/// Length of the browser-facing payment token.
const PAYMENT_TOKEN_LEN: usize = 40;

/// Generate an unguessable public token for a new payment order.
///
/// This is the browser's only handle on the order; it carries no
/// relationship to the internal id or any product data.
fn generate_payment_token() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(PAYMENT_TOKEN_LEN)
        .map(char::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in Checkout API handlers.
#[derive(Debug)]
enum CheckoutApiError {
    /// The request body was not valid JSON for the expected shape.
    InvalidBody,
    /// A required or malformed input field, with a client-facing message.
    Validation(String),
    /// The requested product does not exist.
    ProductNotFound,
    /// No payment order matches the supplied token.
    OrderNotFound,
    /// The submitted gateway order id disagrees with the stored one.
    OrderMismatch,
    /// `checkout_success` without a payment id + signature.
    MissingPaymentProof,
    /// The checkout signature did not verify.
    SignatureMismatch,
    /// The gateway rejected or failed an outbound call.
    Gateway(ClientError),
    /// A database query failed.
    Database(sqlx::Error),
}

impl IntoResponse for CheckoutApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            CheckoutApiError::InvalidBody => {
                error_response(StatusCode::BAD_REQUEST, "Invalid JSON body")
            }
            CheckoutApiError::Validation(message) => {
                error_response(StatusCode::BAD_REQUEST, message)
            }
            CheckoutApiError::ProductNotFound => {
                error_response(StatusCode::NOT_FOUND, "Product not found")
            }
            CheckoutApiError::OrderNotFound => {
                error_response(StatusCode::NOT_FOUND, "Payment order not found")
            }
            CheckoutApiError::OrderMismatch => {
                error_response(StatusCode::BAD_REQUEST, "Gateway order mismatch")
            }
            CheckoutApiError::MissingPaymentProof => error_response(
                StatusCode::BAD_REQUEST,
                "gatewayPaymentId and gatewaySignature are required for checkout_success",
            ),
            CheckoutApiError::SignatureMismatch => {
                error_response(StatusCode::BAD_REQUEST, "Signature verification failed")
            }
            CheckoutApiError::Gateway(e) => {
                tracing::error!(error = %e, "Gateway order call failed");
                let message = e
                    .gateway_description()
                    .unwrap_or("Unable to create payment order")
                    .to_owned();
                error_response(StatusCode::BAD_GATEWAY, message)
            }
            CheckoutApiError::Database(e) => {
                tracing::error!(error = %e, "Checkout API database error");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Trim an optional field down to its non-empty value.
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Require a non-empty field, naming it in the error.
fn required(value: Option<String>, field: &str) -> Result<String, CheckoutApiError> {
    clean(value).ok_or_else(|| CheckoutApiError::Validation(format!("{field} is required")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_tokens_are_long_alphanumeric_and_distinct() {
        let a = generate_payment_token();
        let b = generate_payment_token();
        assert_eq!(a.len(), PAYMENT_TOKEN_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn clean_trims_and_drops_empty() {
        assert_eq!(clean(Some("  pay_1  ".to_owned())), Some("pay_1".to_owned()));
        assert_eq!(clean(Some("   ".to_owned())), None);
        assert_eq!(clean(None), None);
    }

    #[test]
    fn required_names_the_missing_field() {
        let err = required(None, "paymentToken");
        assert!(matches!(
            err,
            Err(CheckoutApiError::Validation(message)) if message == "paymentToken is required"
        ));
    }
}
