use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::ValidationError;

const MONEY_SCALE: u32 = 2;

/// Discounted price for `percent` in `0..=100`, rounded to cents.
///
/// The product is taken in `f64` and rounded from its exact binary value, so
/// cent ties land where float rounding puts them (`2.675` rounds to `2.67`).
pub fn apply_discount(price: f64, percent: f64) -> Result<f64, ValidationError> {
    if !(0.0..=100.0).contains(&percent) {
        return Err(ValidationError::DiscountOutOfRange { percent });
    }

    let discounted = price * (1.0 - percent / 100.0);
    Decimal::from_f64_retain(discounted)
        .map(round_decimal)
        .and_then(|rounded| rounded.to_f64())
        .ok_or(ValidationError::InvalidPrice { price })
}

pub fn round_money(value: f64) -> f64 {
    Decimal::from_f64_retain(value)
        .map(round_decimal)
        .and_then(|rounded| rounded.to_f64())
        .unwrap_or(value)
}

fn round_decimal(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

#[cfg(test)]
mod tests {
    use super::{apply_discount, round_money};
    use crate::errors::ValidationError;

    #[test]
    fn fifteen_percent_off_one_hundred() {
        assert_eq!(apply_discount(100.0, 15.0), Ok(85.0));
    }

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(apply_discount(1500.0, 0.0), Ok(1500.0));
        assert_eq!(apply_discount(1500.0, 100.0), Ok(0.0));
    }

    #[test]
    fn out_of_range_percent_is_rejected() {
        for percent in [-1.0, 101.0, f64::NAN] {
            assert!(matches!(
                apply_discount(100.0, percent),
                Err(ValidationError::DiscountOutOfRange { .. })
            ));
        }
    }

    #[test]
    fn result_is_rounded_to_cents() {
        assert_eq!(apply_discount(99.99, 33.0), Ok(66.99));
        assert_eq!(round_money(1666.666_666), 1666.67);
        assert_eq!(round_money(0.0), 0.0);
    }

    #[test]
    fn cent_ties_follow_the_binary_value() {
        assert_eq!(apply_discount(2.675, 0.0), Ok(2.67));
        assert_eq!(apply_discount(10.05, 50.0), Ok(5.03));
        assert_eq!(apply_discount(4.35, 50.0), Ok(2.17));
        assert_eq!(round_money(2.675), 2.67);
    }

    #[test]
    fn non_finite_price_is_rejected() {
        assert!(matches!(
            apply_discount(f64::INFINITY, 10.0),
            Err(ValidationError::InvalidPrice { .. })
        ));
    }
}
