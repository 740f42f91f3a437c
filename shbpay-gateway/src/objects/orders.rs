//! Order creation types for the gateway Orders API.

use serde::{Deserialize, Serialize};

/// Request body for `POST /orders`.
///
/// `amount` is in minor units (paise for INR) — the gateway never sees
/// decimal currency amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateGatewayOrder {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub notes: OrderNotes,
}

/// Merchant notes attached to a gateway order, echoed back in dashboards
/// and webhooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderNotes {
    pub product_id: String,
    pub product_title: String,
}

/// A gateway order, as returned by order creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    pub status: String,
}

/// Error envelope returned by the gateway on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayErrorEnvelope {
    pub error: GatewayErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_response_parses_gateway_json() {
        let body = r#"{
            "id": "order_EKwxwAgItmmXdp",
            "entity": "order",
            "amount": 5000,
            "amount_paid": 0,
            "amount_due": 5000,
            "currency": "INR",
            "receipt": "shb_1700000000000_a1b2c3",
            "status": "created",
            "attempts": 0,
            "created_at": 1700000000
        }"#;
        let order: GatewayOrder = serde_json::from_str(body).unwrap();
        assert_eq!(order.id, "order_EKwxwAgItmmXdp");
        assert_eq!(order.amount, 5000);
        assert_eq!(order.status, "created");
    }

    #[test]
    fn error_envelope_extracts_description() {
        let body = r#"{"error":{"code":"BAD_REQUEST_ERROR","description":"Order amount less than minimum amount allowed"}}"#;
        let envelope: GatewayErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(
            envelope.error.description.as_deref(),
            Some("Order amount less than minimum amount allowed")
        );
    }
}
