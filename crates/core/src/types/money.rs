//! Money helpers.
//!
//! Prices are plain [`rust_decimal::Decimal`] values in the currency's
//! standard unit (dollars, not cents); the currency itself is fixed by
//! server configuration. The only conversion the system needs is
//! dollars-to-minor-units for the payment provider, which counts in cents.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Convert a decimal amount to minor currency units (cents).
///
/// Returns `None` if the amount is negative, does not land on a whole
/// number of cents, or overflows `i64`. Payment amounts must always go
/// through this conversion rather than ad hoc float math.
#[must_use]
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    if amount.is_sign_negative() {
        return None;
    }
    let cents = amount.checked_mul(Decimal::ONE_HUNDRED)?;
    if !cents.fract().is_zero() {
        return None;
    }
    cents.to_i64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn test_whole_dollar_amounts() {
        assert_eq!(to_minor_units(dec!(10)), Some(1000));
        assert_eq!(to_minor_units(dec!(0)), Some(0));
    }

    #[test]
    fn test_cent_precision() {
        assert_eq!(to_minor_units(dec!(9.99)), Some(999));
        assert_eq!(to_minor_units(dec!(29.97)), Some(2997));
    }

    #[test]
    fn test_sub_cent_amounts_rejected() {
        assert_eq!(to_minor_units(dec!(1.005)), None);
    }

    #[test]
    fn test_negative_amounts_rejected() {
        assert_eq!(to_minor_units(dec!(-1.00)), None);
    }
}
