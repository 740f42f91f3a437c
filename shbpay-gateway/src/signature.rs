//! Signature algorithms and verification for the Razorpay integration.
//!
//! Razorpay authenticates two things with lowercase hex-encoded
//! HMAC-SHA256:
//!
//! * **Checkout callback** (relayed by the browser after the checkout
//!   widget succeeds):
//!   `HMAC-SHA256("{order_id}|{payment_id}", key_secret)`
//!
//! * **Webhook** (pushed server-to-server):
//!   `HMAC-SHA256(raw_body_bytes, webhook_secret)`
//!
//! The webhook HMAC covers the raw request body bytes, before any JSON
//! parsing, so re-serialization can never change the signed message.
//!
//! Everything in this module is pure and deterministic.

/// Header carrying the webhook signature.
pub const WEBHOOK_SIGNATURE_HEADER: &str = "x-razorpay-signature";

/// Compute the lowercase hex HMAC-SHA256 of `message` keyed by `secret`.
pub fn compute_signature(secret: &[u8], message: &[u8]) -> String {
    let tag = ring::hmac::sign(
        &ring::hmac::Key::new(ring::hmac::HMAC_SHA256, secret),
        message,
    );
    hex::encode(tag.as_ref())
}

/// Constant-time equality for two signature strings.
///
/// Equal-length inputs are compared without a byte-wise short-circuit.
/// Unequal lengths fail immediately; the length of a hex signature is
/// not secret material.
pub fn signatures_equal(a: &str, b: &str) -> bool {
    ring::constant_time::verify_slices_are_equal(a.as_bytes(), b.as_bytes()).is_ok()
}

// ---------------------------------------------------------------------------
// Checkout callback signing
// ---------------------------------------------------------------------------

/// The message signed by the checkout callback: `"{order_id}|{payment_id}"`.
pub fn checkout_signature_message(gateway_order_id: &str, payment_id: &str) -> String {
    format!("{gateway_order_id}|{payment_id}")
}

/// Verify a client-relayed checkout signature for an order+payment pair.
pub fn verify_checkout_signature(
    key_secret: &[u8],
    gateway_order_id: &str,
    payment_id: &str,
    provided: &str,
) -> bool {
    let message = checkout_signature_message(gateway_order_id, payment_id);
    let expected = compute_signature(key_secret, message.as_bytes());
    signatures_equal(&expected, provided)
}

// ---------------------------------------------------------------------------
// Webhook signing
// ---------------------------------------------------------------------------

/// Verify a webhook signature against the raw request body bytes.
pub fn verify_webhook_signature(webhook_secret: &[u8], raw_body: &[u8], provided: &str) -> bool {
    let expected = compute_signature(webhook_secret, raw_body);
    signatures_equal(&expected, provided)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_key_secret";

    #[test]
    fn compute_signature_is_deterministic() {
        let a = compute_signature(SECRET, b"order_abc|pay_123");
        let b = compute_signature(SECRET, b"order_abc|pay_123");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_secret_or_message_changes_signature() {
        let base = compute_signature(SECRET, b"order_abc|pay_123");
        assert_ne!(base, compute_signature(b"other_secret", b"order_abc|pay_123"));
        assert_ne!(base, compute_signature(SECRET, b"order_abc|pay_124"));
    }

    #[test]
    fn signatures_equal_accepts_identical() {
        let sig = compute_signature(SECRET, b"order_abc|pay_123");
        assert!(signatures_equal(&sig, &sig.clone()));
    }

    #[test]
    fn single_character_mutation_is_rejected() {
        let sig = compute_signature(SECRET, b"order_abc|pay_123");
        for i in 0..sig.len() {
            let mut mutated: Vec<u8> = sig.bytes().collect();
            mutated[i] = if mutated[i] == b'0' { b'1' } else { b'0' };
            let mutated = String::from_utf8(mutated).unwrap();
            if mutated != sig {
                assert!(!signatures_equal(&sig, &mutated), "mutation at {i} accepted");
            }
        }
    }

    #[test]
    fn signatures_equal_rejects_different_lengths() {
        let sig = compute_signature(SECRET, b"order_abc|pay_123");
        assert!(!signatures_equal(&sig, &sig[..sig.len() - 1]));
        assert!(!signatures_equal(&sig, ""));
    }

    #[test]
    fn verify_checkout_signature_round_trip() {
        let message = checkout_signature_message("order_abc", "pay_123");
        assert_eq!(message, "order_abc|pay_123");

        let provided = compute_signature(SECRET, message.as_bytes());
        assert!(verify_checkout_signature(SECRET, "order_abc", "pay_123", &provided));
        assert!(!verify_checkout_signature(SECRET, "order_abc", "pay_999", &provided));
        assert!(!verify_checkout_signature(b"wrong", "order_abc", "pay_123", &provided));
    }

    #[test]
    fn verify_webhook_signature_covers_raw_bytes() {
        let body = br#"{"event":"payment.captured","payload":{}}"#;
        let provided = compute_signature(b"webhook_secret", body);

        assert!(verify_webhook_signature(b"webhook_secret", body, &provided));
        // Same JSON with different whitespace is a different message.
        let reserialized = br#"{ "event": "payment.captured", "payload": {} }"#;
        assert!(!verify_webhook_signature(b"webhook_secret", reserialized, &provided));
    }
}
