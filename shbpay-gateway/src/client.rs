//! Typed HTTP client for the gateway's Orders and Payments APIs.
//!
//! Used server-side only, with the merchant's key id + key secret as HTTP
//! basic auth. Every call carries a finite timeout so a stalled gateway
//! surfaces as a retryable error instead of a hung request.

use reqwest::{Client, StatusCode};

use crate::objects::orders::{CreateGatewayOrder, GatewayErrorEnvelope, GatewayOrder};
use crate::objects::payments::PaymentCollection;

/// Timeout applied to every outbound gateway call.
const GATEWAY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Errors produced by the gateway HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, timeout, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    ///
    /// `description` is the gateway's own human-readable error when its
    /// error envelope carried one.
    #[error("gateway error: status {status}")]
    Api {
        status: StatusCode,
        description: Option<String>,
    },

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// The gateway's human-readable description, when one was returned.
    pub fn gateway_description(&self) -> Option<&str> {
        match self {
            ClientError::Api { description, .. } => description.as_deref(),
            _ => None,
        }
    }
}

/// Typed client for the Razorpay REST API.
#[derive(Debug, Clone)]
pub struct RazorpayClient {
    http: Client,
    api_base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayClient {
    /// Create a new client.
    ///
    /// * `api_base_url` – versioned API root (e.g. `https://api.razorpay.com/v1`).
    /// * `key_id` / `key_secret` – merchant API credentials for basic auth.
    pub fn new(
        api_base_url: impl Into<String>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
    ) -> Self {
        let http = Client::builder()
            .timeout(GATEWAY_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            api_base_url: api_base_url.into(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url.trim_end_matches('/'), path)
    }

    /// `POST /orders` – create a gateway order for an amount in minor units.
    pub async fn create_order(
        &self,
        payload: CreateGatewayOrder,
    ) -> Result<GatewayOrder, ClientError> {
        let resp = self
            .http
            .post(self.endpoint("orders"))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&payload)
            .send()
            .await?;

        let order: GatewayOrder = parse_response(resp).await?;
        tracing::info!(
            gateway_order_id = %order.id,
            amount = order.amount,
            currency = %order.currency,
            "Gateway order created"
        );
        Ok(order)
    }

    /// `GET /orders/{id}/payments` – list all payment attempts against an
    /// order. The authoritative source for reconciliation.
    pub async fn list_order_payments(
        &self,
        gateway_order_id: &str,
    ) -> Result<PaymentCollection, ClientError> {
        let resp = self
            .http
            .get(self.endpoint(&format!("orders/{gateway_order_id}/payments")))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await?;

        parse_response(resp).await
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let description = extract_error_description(&body);
        tracing::warn!(status = %status, description = ?description, "Gateway call failed");
        return Err(ClientError::Api {
            status,
            description,
        });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}

/// Pull the human-readable description out of a gateway error body, if
/// the body is the gateway's JSON error envelope.
fn extract_error_description(body: &str) -> Option<String> {
    let envelope: GatewayErrorEnvelope = serde_json::from_str(body).ok()?;
    envelope
        .error
        .description
        .map(|d| d.trim().to_owned())
        .filter(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_description_extracted_from_envelope() {
        let body = r#"{"error":{"code":"BAD_REQUEST_ERROR","description":"  Order amount less than minimum  "}}"#;
        assert_eq!(
            extract_error_description(body).as_deref(),
            Some("Order amount less than minimum")
        );
    }

    #[test]
    fn non_envelope_bodies_yield_no_description() {
        assert_eq!(extract_error_description("<html>502</html>"), None);
        assert_eq!(extract_error_description(r#"{"error":{}}"#), None);
        assert_eq!(extract_error_description(r#"{"error":{"description":"   "}}"#), None);
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = RazorpayClient::new("https://api.razorpay.com/v1/", "rzp_test", "secret");
        assert_eq!(
            client.endpoint("orders/order_1/payments"),
            "https://api.razorpay.com/v1/orders/order_1/payments"
        );
    }
}
