//! `POST /gateway-webhook` — authoritative gateway push notifications.
//!
//! The single source of truth for `success`: a captured/paid event may
//! move any non-success order directly to `success`, regardless of what
//! the client reported. Unrecognized event types are acknowledged and
//! ignored, never errors — the gateway sends more event types than this
//! system tracks.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use kanau::processor::Processor;
use serde_json::json;
use shbpay_core::entities::payment_order::{
    ApplyStatusUpdateByGatewayOrder, GetPaymentOrderByGatewayOrderId, StatusUpdate,
};
use shbpay_core::framework::DatabaseProcessor;
use shbpay_core::lifecycle::{EventSource, PaymentOrderStatus, map_webhook_event};

use crate::api::error_response;
use crate::api::extractors::VerifiedWebhook;
use crate::state::AppState;

pub(crate) async fn handle_webhook(
    State(state): State<AppState>,
    VerifiedWebhook(event): VerifiedWebhook,
) -> Result<impl IntoResponse, WebhookApiError> {
    let Some(status) = map_webhook_event(&event.event) else {
        return Ok(Json(json!({ "ok": true, "ignored": true })));
    };

    let Some(gateway_order_id) = event.gateway_order_id().map(str::to_owned) else {
        return Err(WebhookApiError::MissingOrderId);
    };
    let gateway_payment_id = event.payment_id().map(str::to_owned);
    let failure_reason = (status == PaymentOrderStatus::Failed).then(|| {
        event
            .error_description()
            .unwrap_or("payment_failed")
            .to_owned()
    });
    let event_name = event.event;

    let update = StatusUpdate {
        status,
        gateway_payment_id,
        gateway_signature: None,
        failure_reason,
        audit_payload: json!({
            "source": EventSource::Webhook.as_str(),
            "event": event_name,
        }),
    };

    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    let updated = processor
        .process(ApplyStatusUpdateByGatewayOrder {
            gateway_order_id: gateway_order_id.clone(),
            update,
        })
        .await
        .map_err(WebhookApiError::Database)?;

    if updated.is_none() {
        // Either the order was created out-of-band, or the write was
        // skipped by the monotone-success guard. Both are no-ops.
        let existing = processor
            .process(GetPaymentOrderByGatewayOrderId {
                gateway_order_id: gateway_order_id.clone(),
            })
            .await
            .map_err(WebhookApiError::Database)?;
        if existing.is_none() {
            tracing::warn!(
                gateway_order_id = %gateway_order_id,
                "Webhook matched no local payment order"
            );
        } else {
            tracing::info!(
                gateway_order_id = %gateway_order_id,
                "Webhook write skipped, stored status is already terminal success"
            );
        }
    }

    Ok(Json(json!({ "ok": true })))
}

/// Errors that can occur in the webhook handler.
#[derive(Debug)]
pub(crate) enum WebhookApiError {
    /// The event payload carried no gateway order id.
    MissingOrderId,
    /// A database write failed.
    Database(sqlx::Error),
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            WebhookApiError::MissingOrderId => {
                error_response(StatusCode::BAD_REQUEST, "No order id in webhook payload")
            }
            WebhookApiError::Database(e) => {
                tracing::error!(error = %e, "Webhook database update failed");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Unable to update payment order",
                )
            }
        }
    }
}
