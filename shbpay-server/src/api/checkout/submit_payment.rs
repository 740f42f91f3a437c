use axum::{Json, extract::State, extract::rejection::JsonRejection, response::IntoResponse};
use kanau::processor::Processor;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shbpay_core::entities::payment_order::{
    ApplyStatusUpdate, GetPaymentOrderByToken, StatusUpdate,
};
use shbpay_core::framework::DatabaseProcessor;
use shbpay_core::lifecycle::{
    CheckoutEvent, EventSource, PaymentOrderStatus, status_after_verified_submission,
};
use shbpay_gateway::signature::verify_checkout_signature;

use super::{CheckoutApiError, clean, required};
use crate::state::AppState;

/// Client-reported checkout outcome. The `razorpay*` aliases match the
/// field names the gateway's checkout widget hands to the browser.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SubmitPaymentRequest {
    payment_token: Option<String>,
    #[serde(alias = "razorpayOrderId")]
    gateway_order_id: Option<String>,
    #[serde(alias = "razorpayPaymentId")]
    gateway_payment_id: Option<String>,
    #[serde(alias = "razorpaySignature")]
    gateway_signature: Option<String>,
    #[serde(default)]
    gateway_event: CheckoutEvent,
    failure_reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct SubmitPaymentResponse {
    status: PaymentOrderStatus,
}

/// `POST /submit-payment` — record a client-reported checkout outcome.
///
/// Dismissals and failures are taken at face value: neither can be
/// exploited to fake a payment. A success claim is only accepted with a
/// signature the gateway computed for this exact order+payment pair;
/// a mismatch marks the order failed and is rejected.
pub(super) async fn submit_payment(
    State(state): State<AppState>,
    payload: Result<Json<SubmitPaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, CheckoutApiError> {
    let Json(body) = payload.map_err(|_| CheckoutApiError::InvalidBody)?;

    let payment_token = required(body.payment_token, "paymentToken")?;
    let gateway_order_id = required(body.gateway_order_id, "gatewayOrderId")?;

    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let order = processor
        .process(GetPaymentOrderByToken {
            public_token: payment_token.clone(),
        })
        .await
        .map_err(CheckoutApiError::Database)?
        .ok_or(CheckoutApiError::OrderNotFound)?;

    // The gateway order id is immutable; a disagreeing submission is
    // cross-order tampering, never merged.
    if order.gateway_order_id != gateway_order_id {
        return Err(CheckoutApiError::OrderMismatch);
    }

    let event = body.gateway_event;
    let audit_payload = json!({
        "source": EventSource::ClientSubmission.as_str(),
        "gateway_event": event.as_str(),
    });

    let update = match event {
        CheckoutEvent::CheckoutDismissed => StatusUpdate {
            status: PaymentOrderStatus::Cancelled,
            gateway_payment_id: None,
            gateway_signature: None,
            failure_reason: Some(
                clean(body.failure_reason).unwrap_or_else(|| "checkout_dismissed".to_owned()),
            ),
            audit_payload,
        },
        CheckoutEvent::PaymentFailed => StatusUpdate {
            status: PaymentOrderStatus::Failed,
            gateway_payment_id: clean(body.gateway_payment_id),
            gateway_signature: None,
            failure_reason: Some(
                clean(body.failure_reason).unwrap_or_else(|| "payment_failed".to_owned()),
            ),
            audit_payload,
        },
        CheckoutEvent::CheckoutSuccess => {
            let payment_id =
                clean(body.gateway_payment_id).ok_or(CheckoutApiError::MissingPaymentProof)?;
            let signature =
                clean(body.gateway_signature).ok_or(CheckoutApiError::MissingPaymentProof)?;

            if !verify_checkout_signature(
                state.config.gateway.key_secret.as_bytes(),
                &order.gateway_order_id,
                &payment_id,
                &signature,
            ) {
                // Record the failed attempt so the order does not linger
                // ambiguous, then reject the submission.
                let update = StatusUpdate {
                    status: PaymentOrderStatus::Failed,
                    gateway_payment_id: Some(payment_id),
                    gateway_signature: Some(signature),
                    failure_reason: Some("signature_verification_failed".to_owned()),
                    audit_payload,
                };
                if let Err(e) = processor
                    .process(ApplyStatusUpdate {
                        order_id: order.id,
                        update,
                    })
                    .await
                {
                    tracing::error!(error = %e, "Failed to record signature verification failure");
                }
                return Err(CheckoutApiError::SignatureMismatch);
            }

            StatusUpdate {
                status: status_after_verified_submission(order.status),
                gateway_payment_id: Some(payment_id),
                gateway_signature: Some(signature),
                failure_reason: None,
                audit_payload,
            }
        }
    };

    let updated = processor
        .process(ApplyStatusUpdate {
            order_id: order.id,
            update,
        })
        .await
        .map_err(CheckoutApiError::Database)?;

    // A skipped write means the stored status is already sticky
    // (`success`); answer with whatever is actually stored.
    let status = match updated {
        Some(row) => row.status,
        None => stored_status(&processor, &payment_token).await?,
    };

    Ok(Json(SubmitPaymentResponse { status }))
}

async fn stored_status(
    processor: &DatabaseProcessor,
    public_token: &str,
) -> Result<PaymentOrderStatus, CheckoutApiError> {
    processor
        .process(GetPaymentOrderByToken {
            public_token: public_token.to_owned(),
        })
        .await
        .map_err(CheckoutApiError::Database)?
        .map(|order| order.status)
        .ok_or(CheckoutApiError::OrderNotFound)
}
