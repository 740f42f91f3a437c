//! Webhook envelope types for gateway push notifications.

use serde::Deserialize;

use super::payments::PaymentEntity;

/// A gateway webhook event.
///
/// The payload wraps the affected entities one level deep
/// (`payload.payment.entity`, `payload.order.entity`); accessors below
/// flatten that and encode the "payment entity preferred, order entity
/// fallback" rule used when resolving the local order.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub payload: WebhookPayload,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub payment: Option<WebhookPaymentWrapper>,
    #[serde(default)]
    pub order: Option<WebhookOrderWrapper>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPaymentWrapper {
    pub entity: PaymentEntity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookOrderWrapper {
    pub entity: WebhookOrderEntity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookOrderEntity {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl WebhookEvent {
    fn payment(&self) -> Option<&PaymentEntity> {
        self.payload.payment.as_ref().map(|w| &w.entity)
    }

    /// Gateway order id: the payment entity's `order_id` when present,
    /// else the order entity's own id.
    pub fn gateway_order_id(&self) -> Option<&str> {
        self.payment()
            .and_then(|p| p.order_id.as_deref())
            .or_else(|| self.payload.order.as_ref().map(|w| w.entity.id.as_str()))
    }

    /// Payment attempt id, when the event carries a payment entity.
    pub fn payment_id(&self) -> Option<&str> {
        self.payment().map(|p| p.id.as_str())
    }

    /// Gateway-provided failure description, when present.
    pub fn error_description(&self) -> Option<&str> {
        self.payment().and_then(|p| p.error_description.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_entity_is_preferred_for_order_id() {
        let body = r#"{
            "event": "payment.captured",
            "payload": {
                "payment": {"entity": {"id": "pay_9", "order_id": "order_from_payment", "status": "captured"}},
                "order": {"entity": {"id": "order_from_order", "status": "paid"}}
            }
        }"#;
        let event: WebhookEvent = serde_json::from_str(body).unwrap();
        assert_eq!(event.gateway_order_id(), Some("order_from_payment"));
        assert_eq!(event.payment_id(), Some("pay_9"));
    }

    #[test]
    fn order_entity_is_the_fallback() {
        let body = r#"{
            "event": "order.paid",
            "payload": {
                "order": {"entity": {"id": "order_only", "status": "paid"}}
            }
        }"#;
        let event: WebhookEvent = serde_json::from_str(body).unwrap();
        assert_eq!(event.gateway_order_id(), Some("order_only"));
        assert_eq!(event.payment_id(), None);
    }

    #[test]
    fn failure_description_comes_from_the_payment_entity() {
        let body = r#"{
            "event": "payment.failed",
            "payload": {
                "payment": {"entity": {"id": "pay_2", "order_id": "order_b", "status": "failed", "error_description": "Card declined by issuer"}}
            }
        }"#;
        let event: WebhookEvent = serde_json::from_str(body).unwrap();
        assert_eq!(event.error_description(), Some("Card declined by issuer"));
    }

    #[test]
    fn empty_payload_yields_no_order_id() {
        let event: WebhookEvent = serde_json::from_str(r#"{"event": "refund.created"}"#).unwrap();
        assert_eq!(event.gateway_order_id(), None);
    }
}
