//! Amount validation for order creation.
//!
//! Catalog prices are decimal currency units; the gateway only accepts
//! integer minor units (paise for INR). Conversion rounds half away from
//! zero, matching how checkout totals are displayed.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;

/// Why a catalog price cannot be charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("invalid product amount")]
    NotPositive,
    /// Gateways refuse sub-minimum charges outright; reject locally with
    /// a descriptive error instead of round-tripping a doomed order.
    #[error("amount of {minor} minor units is below the minimum of {min}")]
    BelowMinimum { minor: i64, min: i64 },
}

/// Convert a decimal currency amount to integer minor units.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Validate a catalog price against the minimum payable amount and
/// return its minor-unit value.
pub fn validate_payable(price: Decimal, min_minor: i64) -> Result<i64, AmountError> {
    if price <= Decimal::ZERO {
        return Err(AmountError::NotPositive);
    }
    let minor = to_minor_units(price).ok_or(AmountError::NotPositive)?;
    if minor < min_minor {
        return Err(AmountError::BelowMinimum {
            minor,
            min: min_minor,
        });
    }
    Ok(minor)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN_MINOR: i64 = 1000;

    #[test]
    fn fifty_rupees_is_five_thousand_paise() {
        assert_eq!(validate_payable(Decimal::new(5000, 2), MIN_MINOR), Ok(5000));
    }

    #[test]
    fn fractional_paise_round_half_away_from_zero() {
        // 10.005 -> 1000.5 -> 1001
        assert_eq!(to_minor_units(Decimal::new(10_005, 3)), Some(1001));
        assert_eq!(to_minor_units(Decimal::new(9_994, 3)), Some(999));
    }

    #[test]
    fn five_rupees_is_below_the_thousand_paise_minimum() {
        assert_eq!(
            validate_payable(Decimal::new(500, 2), MIN_MINOR),
            Err(AmountError::BelowMinimum {
                minor: 500,
                min: MIN_MINOR
            })
        );
    }

    #[test]
    fn exact_minimum_is_payable() {
        assert_eq!(validate_payable(Decimal::new(1000, 2), MIN_MINOR), Ok(1000));
    }

    #[test]
    fn zero_and_negative_prices_are_invalid() {
        assert_eq!(
            validate_payable(Decimal::ZERO, MIN_MINOR),
            Err(AmountError::NotPositive)
        );
        assert_eq!(
            validate_payable(Decimal::new(-5000, 2), MIN_MINOR),
            Err(AmountError::NotPositive)
        );
    }
}
