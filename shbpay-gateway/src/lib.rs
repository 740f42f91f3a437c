//! Gateway-facing half of the Shabdashri payment core.
//!
//! Contains everything that speaks Razorpay: the HMAC signature
//! algorithms shared by checkout verification and webhook verification,
//! the wire objects for the Orders and Payments APIs, and (behind the
//! `client` feature) the typed HTTP client used for order creation and
//! status reconciliation.

pub mod objects;
pub mod signature;

#[cfg(feature = "client")]
pub mod client;
