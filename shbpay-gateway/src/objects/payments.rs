//! Payment entity types for the gateway Payments API.

use serde::Deserialize;

/// Status of an individual payment attempt, in the gateway's vocabulary.
///
/// Unknown values map to [`PaymentStatus::Other`] so new gateway statuses
/// never break parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Created,
    Authorized,
    Captured,
    Refunded,
    Failed,
    #[serde(other)]
    Other,
}

/// A single payment attempt against a gateway order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentEntity {
    pub id: String,
    #[serde(default)]
    pub order_id: Option<String>,
    pub status: PaymentStatus,
    /// Some gateway payloads carry capture as a flag alongside `status`.
    #[serde(default)]
    pub captured: Option<bool>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl PaymentEntity {
    /// Whether this payment attempt has been captured (settled).
    pub fn is_captured(&self) -> bool {
        self.status == PaymentStatus::Captured || self.captured == Some(true)
    }
}

/// Response of `GET /orders/{id}/payments`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentCollection {
    pub count: u32,
    pub items: Vec<PaymentEntity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_list_parses_and_tolerates_unknown_status() {
        let body = r#"{
            "entity": "collection",
            "count": 2,
            "items": [
                {"id": "pay_1", "order_id": "order_a", "status": "captured", "captured": true, "amount": 5000, "method": "upi"},
                {"id": "pay_2", "order_id": "order_a", "status": "disputed", "error_description": null}
            ]
        }"#;
        let collection: PaymentCollection = serde_json::from_str(body).unwrap();
        assert_eq!(collection.count, 2);
        assert!(collection.items[0].is_captured());
        assert_eq!(collection.items[1].status, PaymentStatus::Other);
        assert!(!collection.items[1].is_captured());
    }

    #[test]
    fn captured_flag_counts_without_captured_status() {
        let body = r#"{"id": "pay_3", "status": "authorized", "captured": true}"#;
        let payment: PaymentEntity = serde_json::from_str(body).unwrap();
        assert!(payment.is_captured());
    }
}
