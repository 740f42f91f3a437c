use axum::{Json, extract::State, extract::rejection::JsonRejection, response::IntoResponse};
use kanau::processor::Processor;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shbpay_core::amount::{AmountError, validate_payable};
use shbpay_core::entities::payment_order::{CreatePaymentOrder, PaymentOrderInsert};
use shbpay_core::entities::product::GetProductById;
use shbpay_core::framework::DatabaseProcessor;
use shbpay_core::lifecycle::EventSource;
use shbpay_gateway::objects::orders::{CreateGatewayOrder, OrderNotes};
use uuid::Uuid;

use super::{CheckoutApiError, generate_payment_token, required};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateOrderRequest {
    product_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateOrderResponse {
    payment_order_id: Uuid,
    payment_token: String,
    gateway_order_id: String,
    amount: Decimal,
    amount_minor_units: i64,
    currency: String,
    checkout_key_id: String,
    product_title: String,
    merchant_name: String,
}

/// `POST /create-order` — create a gateway order for a product.
///
/// Snapshots the product's title and price, creates the order at the
/// gateway, and persists the local record bound to a fresh public token.
/// Returns everything the browser needs to open the checkout widget.
pub(super) async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, CheckoutApiError> {
    let Json(body) = payload.map_err(|_| CheckoutApiError::InvalidBody)?;

    let product_id_raw = required(body.product_id, "productId")?;
    let product_id =
        Uuid::parse_str(&product_id_raw).map_err(|_| CheckoutApiError::ProductNotFound)?;

    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let product = processor
        .process(GetProductById { product_id })
        .await
        .map_err(CheckoutApiError::Database)?
        .ok_or(CheckoutApiError::ProductNotFound)?;

    let checkout = &state.config.checkout;
    let amount_minor = match validate_payable(product.price, checkout.min_amount_minor) {
        Ok(minor) => minor,
        Err(AmountError::NotPositive) => {
            return Err(CheckoutApiError::Validation("Invalid product amount".to_owned()));
        }
        Err(AmountError::BelowMinimum { min, .. }) => {
            let min_major = Decimal::from(min) / Decimal::ONE_HUNDRED;
            return Err(CheckoutApiError::Validation(format!(
                "Minimum payable amount is {} {} for gateway checkout.",
                min_major, checkout.currency
            )));
        }
    };

    let gateway_order = state
        .gateway
        .create_order(CreateGatewayOrder {
            amount: amount_minor,
            currency: checkout.currency.clone(),
            receipt: build_receipt(product.id),
            notes: OrderNotes {
                product_id: product.id.to_string(),
                product_title: product.title.clone(),
            },
        })
        .await
        .map_err(CheckoutApiError::Gateway)?;

    let insert = PaymentOrderInsert {
        public_token: generate_payment_token(),
        product_id: product.id,
        product_title: product.title.clone(),
        amount: product.price,
        amount_minor,
        currency: checkout.currency.clone(),
        gateway_order_id: gateway_order.id.clone(),
        audit_payload: json!({
            "source": EventSource::Creation.as_str(),
            "gateway_order": {
                "id": gateway_order.id,
                "amount": gateway_order.amount,
                "currency": gateway_order.currency,
            },
        }),
    };

    // If this insert fails the gateway order is orphaned; it is never
    // charged without further client action.
    let order = processor
        .process(CreatePaymentOrder { insert })
        .await
        .map_err(CheckoutApiError::Database)?;

    Ok(Json(CreateOrderResponse {
        payment_order_id: order.id,
        payment_token: order.public_token,
        gateway_order_id: order.gateway_order_id,
        amount: order.amount,
        amount_minor_units: order.amount_minor,
        currency: order.currency,
        checkout_key_id: state.config.gateway.key_id.clone(),
        product_title: order.product_title,
        merchant_name: state.config.merchant.name.clone(),
    }))
}

/// Receipt string for the gateway order: timestamp plus a product id
/// fragment. Traceable, but not an idempotency key — repeated calls
/// create fresh gateway orders.
fn build_receipt(product_id: Uuid) -> String {
    let millis = time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let simple = product_id.simple().to_string();
    format!("shb_{}_{}", millis, &simple[..6])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_carries_prefix_and_product_fragment() {
        let product_id = Uuid::from_u128(0xabcdef12_3456_7890_abcd_ef1234567890);
        let receipt = build_receipt(product_id);
        assert!(receipt.starts_with("shb_"));
        assert!(receipt.ends_with("_abcdef"));
        assert!(receipt.len() > "shb__abcdef".len());
    }
}
