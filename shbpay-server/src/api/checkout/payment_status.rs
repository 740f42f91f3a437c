use axum::{Json, extract::State, extract::rejection::JsonRejection, response::IntoResponse};
use kanau::processor::Processor;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shbpay_core::entities::payment_order::{
    ApplyStatusUpdate, GetPaymentOrderByToken, StatusUpdate,
};
use shbpay_core::framework::DatabaseProcessor;
use shbpay_core::lifecycle::{EventSource, PaymentOrderStatus, reconcile_outcome};

use super::{CheckoutApiError, required};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PaymentStatusRequest {
    payment_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PaymentStatusResponse {
    status: PaymentOrderStatus,
    failure_reason: Option<String>,
    amount: Decimal,
    product_title: String,
    updated_at: time::OffsetDateTime,
}

/// `POST /payment-status` — the browser's only view into order progress.
///
/// Terminal orders answer straight from the store. Pending ones
/// (`created`/`client_authorized`) first reconcile against the gateway's
/// authoritative payment list; a new status is persisted before
/// answering, so the next poll takes the cheap path. A failing gateway
/// query degrades to the stored state — every poll is an independent
/// request and the browser's bounded loop retries.
pub(super) async fn payment_status(
    State(state): State<AppState>,
    payload: Result<Json<PaymentStatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, CheckoutApiError> {
    let Json(body) = payload.map_err(|_| CheckoutApiError::InvalidBody)?;

    let payment_token = required(body.payment_token, "paymentToken")?;

    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let mut order = processor
        .process(GetPaymentOrderByToken {
            public_token: payment_token.clone(),
        })
        .await
        .map_err(CheckoutApiError::Database)?
        .ok_or(CheckoutApiError::OrderNotFound)?;

    if !order.status.is_terminal() {
        match state.gateway.list_order_payments(&order.gateway_order_id).await {
            Ok(payments) => {
                if let Some(outcome) = reconcile_outcome(&payments.items) {
                    if outcome.status != order.status {
                        tracing::info!(
                            gateway_order_id = %order.gateway_order_id,
                            from = %order.status,
                            to = %outcome.status,
                            "Reconciled order status from gateway payment list"
                        );
                        let update = StatusUpdate {
                            status: outcome.status,
                            gateway_payment_id: outcome.gateway_payment_id,
                            gateway_signature: None,
                            failure_reason: outcome.failure_reason,
                            audit_payload: json!({
                                "source": EventSource::Reconcile.as_str(),
                            }),
                        };
                        order = match processor
                            .process(ApplyStatusUpdate {
                                order_id: order.id,
                                update,
                            })
                            .await
                            .map_err(CheckoutApiError::Database)?
                        {
                            Some(row) => row,
                            // A concurrent webhook won the race; re-read.
                            None => processor
                                .process(GetPaymentOrderByToken {
                                    public_token: payment_token,
                                })
                                .await
                                .map_err(CheckoutApiError::Database)?
                                .ok_or(CheckoutApiError::OrderNotFound)?,
                        };
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    gateway_order_id = %order.gateway_order_id,
                    "Reconciliation query failed, answering with stored status"
                );
            }
        }
    }

    Ok(Json(PaymentStatusResponse {
        status: order.status,
        failure_reason: order.failure_reason,
        amount: order.amount,
        product_title: order.product_title,
        updated_at: order.updated_at,
    }))
}
