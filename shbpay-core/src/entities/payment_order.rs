//! The Order Store: persistence operations over the `payment_orders`
//! table.
//!
//! Race-safety contract: handlers race on the same row (a webhook and a
//! client submission can arrive concurrently for one order), so every
//! status write is a single atomic `UPDATE … WHERE` carrying the
//! monotone-success guard — the write is skipped entirely when the stored
//! status is already `success` and the incoming one is not. Last writer
//! wins on field level; `success` is never overwritten by a non-success
//! write. A guarded-out (or unmatched) update returns `None`.
//!
//! `gateway_order_id` and `public_token` are unique; `gateway_order_id`
//! is written once at creation and never updated.

use kanau::processor::Processor;
use uuid::Uuid;

use crate::framework::DatabaseProcessor;
use crate::lifecycle::PaymentOrderStatus;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PaymentOrder {
    pub id: Uuid,
    pub public_token: String,
    pub product_id: Uuid,
    pub product_title: String,
    pub amount: rust_decimal::Decimal,
    pub amount_minor: i64,
    pub currency: String,
    pub gateway_order_id: String,
    pub gateway_payment_id: Option<String>,
    pub gateway_signature: Option<String>,
    pub status: PaymentOrderStatus,
    pub failure_reason: Option<String>,
    pub audit_payload: serde_json::Value,
    pub created_at: time::OffsetDateTime,
    pub updated_at: time::OffsetDateTime,
}

/// Data for inserting a new payment order. Status always starts at
/// `created`.
#[derive(Debug, Clone)]
pub struct PaymentOrderInsert {
    pub public_token: String,
    pub product_id: Uuid,
    pub product_title: String,
    pub amount: rust_decimal::Decimal,
    pub amount_minor: i64,
    pub currency: String,
    pub gateway_order_id: String,
    pub audit_payload: serde_json::Value,
}

/// A status-affecting write.
///
/// `gateway_payment_id` and `gateway_signature` are write-once: `None`
/// keeps whatever is stored. `failure_reason` is always written, so a
/// verified success clears a stale reason. `audit_payload` replaces the
/// previous event record.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub status: PaymentOrderStatus,
    pub gateway_payment_id: Option<String>,
    pub gateway_signature: Option<String>,
    pub failure_reason: Option<String>,
    pub audit_payload: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct CreatePaymentOrder {
    pub insert: PaymentOrderInsert,
}

impl Processor<CreatePaymentOrder> for DatabaseProcessor {
    type Output = PaymentOrder;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:CreatePaymentOrder")]
    async fn process(&self, msg: CreatePaymentOrder) -> Result<PaymentOrder, sqlx::Error> {
        let insert = msg.insert;
        sqlx::query_as::<_, PaymentOrder>(
            r#"
            INSERT INTO payment_orders
                (public_token, product_id, product_title, amount, amount_minor,
                 currency, gateway_order_id, status, audit_payload)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(insert.public_token)
        .bind(insert.product_id)
        .bind(insert.product_title)
        .bind(insert.amount)
        .bind(insert.amount_minor)
        .bind(insert.currency)
        .bind(insert.gateway_order_id)
        .bind(PaymentOrderStatus::Created)
        .bind(insert.audit_payload)
        .fetch_one(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct GetPaymentOrderByToken {
    pub public_token: String,
}

impl Processor<GetPaymentOrderByToken> for DatabaseProcessor {
    type Output = Option<PaymentOrder>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetPaymentOrderByToken")]
    async fn process(
        &self,
        query: GetPaymentOrderByToken,
    ) -> Result<Option<PaymentOrder>, sqlx::Error> {
        sqlx::query_as::<_, PaymentOrder>(
            "SELECT * FROM payment_orders WHERE public_token = $1",
        )
        .bind(query.public_token)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct GetPaymentOrderByGatewayOrderId {
    pub gateway_order_id: String,
}

impl Processor<GetPaymentOrderByGatewayOrderId> for DatabaseProcessor {
    type Output = Option<PaymentOrder>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetPaymentOrderByGatewayOrderId")]
    async fn process(
        &self,
        query: GetPaymentOrderByGatewayOrderId,
    ) -> Result<Option<PaymentOrder>, sqlx::Error> {
        sqlx::query_as::<_, PaymentOrder>(
            "SELECT * FROM payment_orders WHERE gateway_order_id = $1",
        )
        .bind(query.gateway_order_id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Apply a guarded status update to the order with this internal id.
///
/// `None` means the row is missing or the monotone-success guard skipped
/// the write; callers re-read the row when they need the stored state.
#[derive(Debug, Clone)]
pub struct ApplyStatusUpdate {
    pub order_id: Uuid,
    pub update: StatusUpdate,
}

impl Processor<ApplyStatusUpdate> for DatabaseProcessor {
    type Output = Option<PaymentOrder>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ApplyStatusUpdate")]
    async fn process(&self, msg: ApplyStatusUpdate) -> Result<Option<PaymentOrder>, sqlx::Error> {
        sqlx::query_as::<_, PaymentOrder>(
            r#"
            UPDATE payment_orders SET
                status = $2,
                gateway_payment_id = COALESCE($3, gateway_payment_id),
                gateway_signature = COALESCE($4, gateway_signature),
                failure_reason = $5,
                audit_payload = $6,
                updated_at = now()
            WHERE id = $1
              AND NOT (status = 'success' AND $2 <> 'success')
            RETURNING *
            "#,
        )
        .bind(msg.order_id)
        .bind(msg.update.status)
        .bind(msg.update.gateway_payment_id)
        .bind(msg.update.gateway_signature)
        .bind(msg.update.failure_reason)
        .bind(msg.update.audit_payload)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Apply a guarded status update by gateway order id — the join key used
/// by webhooks, which never see internal ids or public tokens.
#[derive(Debug, Clone)]
pub struct ApplyStatusUpdateByGatewayOrder {
    pub gateway_order_id: String,
    pub update: StatusUpdate,
}

impl Processor<ApplyStatusUpdateByGatewayOrder> for DatabaseProcessor {
    type Output = Option<PaymentOrder>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ApplyStatusUpdateByGatewayOrder")]
    async fn process(
        &self,
        msg: ApplyStatusUpdateByGatewayOrder,
    ) -> Result<Option<PaymentOrder>, sqlx::Error> {
        sqlx::query_as::<_, PaymentOrder>(
            r#"
            UPDATE payment_orders SET
                status = $2,
                gateway_payment_id = COALESCE($3, gateway_payment_id),
                gateway_signature = COALESCE($4, gateway_signature),
                failure_reason = $5,
                audit_payload = $6,
                updated_at = now()
            WHERE gateway_order_id = $1
              AND NOT (status = 'success' AND $2 <> 'success')
            RETURNING *
            "#,
        )
        .bind(msg.gateway_order_id)
        .bind(msg.update.status)
        .bind(msg.update.gateway_payment_id)
        .bind(msg.update.gateway_signature)
        .bind(msg.update.failure_reason)
        .bind(msg.update.audit_payload)
        .fetch_optional(&self.pool)
        .await
    }
}
