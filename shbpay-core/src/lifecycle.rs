//! Payment order lifecycle: the status vocabulary, the transition rules,
//! and the mappings from every event channel onto them.
//!
//! Three channels feed the same state machine — client submissions,
//! gateway webhooks, and active reconciliation — so all of that knowledge
//! lives here in one place instead of drifting apart inside three
//! handlers.
//!
//! Transition rules:
//!
//! * `created → client_authorized → success`
//! * `created | client_authorized → failed`
//! * `created → cancelled`
//!
//! `success`, `failed`, and `cancelled` are terminal from the client's
//! point of view, but `failed`/`cancelled` may still be overwritten by a
//! later-arriving authoritative webhook proving success. Only `success`
//! is sticky: once reached, no non-success write may replace it. That
//! guard is duplicated in the store's `UPDATE … WHERE` clause
//! ([`crate::entities::payment_order`]) so racing writers cannot bypass
//! it.

use serde::{Deserialize, Serialize};

use shbpay_gateway::objects::payments::{PaymentEntity, PaymentStatus};

/// Status of a payment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "payment_order_status", rename_all = "snake_case")]
pub enum PaymentOrderStatus {
    Created,
    ClientAuthorized,
    Success,
    Failed,
    Cancelled,
}

impl PaymentOrderStatus {
    /// Terminal from the client's perspective: polling may stop here.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PaymentOrderStatus::Success | PaymentOrderStatus::Failed | PaymentOrderStatus::Cancelled
        )
    }
}

impl std::fmt::Display for PaymentOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentOrderStatus::Created => write!(f, "created"),
            PaymentOrderStatus::ClientAuthorized => write!(f, "client_authorized"),
            PaymentOrderStatus::Success => write!(f, "success"),
            PaymentOrderStatus::Failed => write!(f, "failed"),
            PaymentOrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// The monotone-success guard.
///
/// A stored `success` accepts no write except another `success`; every
/// other stored status accepts any write (later evidence supersedes
/// earlier, including authoritative success over a local `failed`).
pub fn accepts_write(current: PaymentOrderStatus, incoming: PaymentOrderStatus) -> bool {
    !(current == PaymentOrderStatus::Success && incoming != PaymentOrderStatus::Success)
}

/// Status after a signature-verified client submission.
///
/// Client proof only ever yields `client_authorized`; if a webhook or
/// reconciliation already confirmed `success`, that is never downgraded.
pub fn status_after_verified_submission(current: PaymentOrderStatus) -> PaymentOrderStatus {
    if current == PaymentOrderStatus::Success {
        PaymentOrderStatus::Success
    } else {
        PaymentOrderStatus::ClientAuthorized
    }
}

// ---------------------------------------------------------------------------
// Client-reported checkout events
// ---------------------------------------------------------------------------

/// Outcome reported by the browser after the checkout widget closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutEvent {
    /// The widget reported success; requires a payment id + signature.
    #[default]
    CheckoutSuccess,
    /// The widget reported a failed payment attempt.
    PaymentFailed,
    /// The user closed the widget without paying.
    CheckoutDismissed,
}

impl CheckoutEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckoutEvent::CheckoutSuccess => "checkout_success",
            CheckoutEvent::PaymentFailed => "payment_failed",
            CheckoutEvent::CheckoutDismissed => "checkout_dismissed",
        }
    }
}

// ---------------------------------------------------------------------------
// Webhook event mapping
// ---------------------------------------------------------------------------

/// Map a gateway webhook event name to a local status.
///
/// `None` means acknowledged-but-ignored: the gateway sends event types
/// this system does not track, and that must never be an error.
pub fn map_webhook_event(event_name: &str) -> Option<PaymentOrderStatus> {
    match event_name {
        "payment.captured" | "order.paid" => Some(PaymentOrderStatus::Success),
        "payment.failed" => Some(PaymentOrderStatus::Failed),
        "payment.authorized" => Some(PaymentOrderStatus::ClientAuthorized),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Result of reconciling a gateway payment list against a pending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub status: PaymentOrderStatus,
    pub gateway_payment_id: Option<String>,
    pub failure_reason: Option<String>,
}

/// Reconcile the gateway's payment list for an order.
///
/// Priority order: any captured payment wins outright, then any
/// authorized one, then any failed one. An empty or all-`created` list
/// yields `None` — nothing authoritative to say yet.
pub fn reconcile_outcome(payments: &[PaymentEntity]) -> Option<ReconcileOutcome> {
    if let Some(captured) = payments.iter().find(|p| p.is_captured()) {
        return Some(ReconcileOutcome {
            status: PaymentOrderStatus::Success,
            gateway_payment_id: Some(captured.id.clone()),
            failure_reason: None,
        });
    }

    if let Some(authorized) = payments
        .iter()
        .find(|p| p.status == PaymentStatus::Authorized)
    {
        return Some(ReconcileOutcome {
            status: PaymentOrderStatus::ClientAuthorized,
            gateway_payment_id: Some(authorized.id.clone()),
            failure_reason: None,
        });
    }

    if let Some(failed) = payments.iter().find(|p| p.status == PaymentStatus::Failed) {
        return Some(ReconcileOutcome {
            status: PaymentOrderStatus::Failed,
            gateway_payment_id: Some(failed.id.clone()),
            failure_reason: Some(
                failed
                    .error_description
                    .clone()
                    .unwrap_or_else(|| "payment_failed".to_owned()),
            ),
        });
    }

    None
}

// ---------------------------------------------------------------------------
// Audit tagging
// ---------------------------------------------------------------------------

/// Which channel produced a status-affecting write. Diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    Creation,
    ClientSubmission,
    Webhook,
    Reconcile,
}

impl EventSource {
    pub fn as_str(self) -> &'static str {
        match self {
            EventSource::Creation => "creation",
            EventSource::ClientSubmission => "client_submission",
            EventSource::Webhook => "webhook",
            EventSource::Reconcile => "reconcile",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(id: &str, status: PaymentStatus) -> PaymentEntity {
        PaymentEntity {
            id: id.to_owned(),
            order_id: Some("order_a".to_owned()),
            status,
            captured: None,
            amount: None,
            method: None,
            error_description: None,
        }
    }

    #[test]
    fn success_is_sticky_against_everything_but_success() {
        use PaymentOrderStatus::*;
        for incoming in [Created, ClientAuthorized, Failed, Cancelled] {
            assert!(!accepts_write(Success, incoming), "{incoming} overwrote success");
        }
        assert!(accepts_write(Success, Success));
    }

    #[test]
    fn non_success_states_accept_later_evidence() {
        use PaymentOrderStatus::*;
        // Late authoritative webhook flips a local failed/cancelled to success.
        assert!(accepts_write(Failed, Success));
        assert!(accepts_write(Cancelled, Success));
        // Client evidence may supersede a signature-verification failure.
        assert!(accepts_write(Failed, ClientAuthorized));
        assert!(accepts_write(Created, Cancelled));
        assert!(accepts_write(ClientAuthorized, Failed));
    }

    #[test]
    fn verified_submission_never_downgrades_success() {
        use PaymentOrderStatus::*;
        assert_eq!(status_after_verified_submission(Created), ClientAuthorized);
        assert_eq!(status_after_verified_submission(Failed), ClientAuthorized);
        assert_eq!(status_after_verified_submission(Success), Success);
    }

    #[test]
    fn webhook_events_map_to_statuses() {
        use PaymentOrderStatus::*;
        assert_eq!(map_webhook_event("payment.captured"), Some(Success));
        assert_eq!(map_webhook_event("order.paid"), Some(Success));
        assert_eq!(map_webhook_event("payment.failed"), Some(Failed));
        assert_eq!(map_webhook_event("payment.authorized"), Some(ClientAuthorized));
        assert_eq!(map_webhook_event("refund.created"), None);
        assert_eq!(map_webhook_event(""), None);
    }

    #[test]
    fn reconcile_prefers_captured_over_everything() {
        let payments = vec![
            payment("pay_fail", PaymentStatus::Failed),
            payment("pay_auth", PaymentStatus::Authorized),
            payment("pay_cap", PaymentStatus::Captured),
        ];
        assert_eq!(
            reconcile_outcome(&payments),
            Some(ReconcileOutcome {
                status: PaymentOrderStatus::Success,
                gateway_payment_id: Some("pay_cap".to_owned()),
                failure_reason: None,
            })
        );
    }

    #[test]
    fn reconcile_counts_captured_flag_on_authorized_status() {
        let mut flagged = payment("pay_flag", PaymentStatus::Authorized);
        flagged.captured = Some(true);
        assert_eq!(
            reconcile_outcome(&[flagged]),
            Some(ReconcileOutcome {
                status: PaymentOrderStatus::Success,
                gateway_payment_id: Some("pay_flag".to_owned()),
                failure_reason: None,
            })
        );
    }

    #[test]
    fn reconcile_authorized_without_capture() {
        let payments = vec![
            payment("pay_new", PaymentStatus::Created),
            payment("pay_auth", PaymentStatus::Authorized),
        ];
        assert_eq!(
            reconcile_outcome(&payments),
            Some(ReconcileOutcome {
                status: PaymentOrderStatus::ClientAuthorized,
                gateway_payment_id: Some("pay_auth".to_owned()),
                failure_reason: None,
            })
        );
    }

    #[test]
    fn reconcile_failed_carries_the_description() {
        let mut failed = payment("pay_f", PaymentStatus::Failed);
        failed.error_description = Some("Card declined".to_owned());
        assert_eq!(
            reconcile_outcome(&[failed]),
            Some(ReconcileOutcome {
                status: PaymentOrderStatus::Failed,
                gateway_payment_id: Some("pay_f".to_owned()),
                failure_reason: Some("Card declined".to_owned()),
            })
        );
    }

    #[test]
    fn reconcile_failed_defaults_its_reason() {
        let outcome = reconcile_outcome(&[payment("pay_f", PaymentStatus::Failed)]);
        assert_eq!(
            outcome.and_then(|o| o.failure_reason).as_deref(),
            Some("payment_failed")
        );
    }

    #[test]
    fn reconcile_with_nothing_authoritative_is_none() {
        assert_eq!(reconcile_outcome(&[]), None);
        assert_eq!(
            reconcile_outcome(&[payment("pay_new", PaymentStatus::Created)]),
            None
        );
        assert_eq!(
            reconcile_outcome(&[payment("pay_other", PaymentStatus::Other)]),
            None
        );
    }

    #[test]
    fn checkout_event_defaults_to_success() {
        assert_eq!(CheckoutEvent::default(), CheckoutEvent::CheckoutSuccess);
    }

    #[test]
    fn status_serde_uses_snake_case() {
        let json = serde_json::to_string(&PaymentOrderStatus::ClientAuthorized);
        assert!(matches!(json.as_deref(), Ok("\"client_authorized\"")));
    }
}
