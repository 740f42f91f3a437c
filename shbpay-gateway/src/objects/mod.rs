//! Wire objects for the Razorpay Orders, Payments, and webhook APIs.
//!
//! Field names follow the gateway's snake_case JSON. Only the fields this
//! system reads are modeled; everything else in a gateway response is
//! ignored by serde.

pub mod orders;
pub mod payments;
pub mod webhook;

pub use orders::{CreateGatewayOrder, GatewayOrder, OrderNotes};
pub use payments::{PaymentCollection, PaymentEntity, PaymentStatus};
pub use webhook::WebhookEvent;
