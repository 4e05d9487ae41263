use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::{AppError, AppResult};

/// Validate a base price. Negative amounts are rejected, never clamped.
pub fn validate_price(price: Decimal) -> AppResult<Decimal> {
    if price.is_sign_negative() {
        return Err(AppError::validation("price", "price must not be negative"));
    }
    Ok(price)
}

/// Validate a percentage discount. 100% or more implies free-or-negative
/// pricing and is rejected as invalid input.
pub fn validate_discount(discount: Decimal) -> AppResult<Decimal> {
    if discount.is_sign_negative() {
        return Err(AppError::validation(
            "discount",
            "discount must not be negative",
        ));
    }
    if discount >= dec!(100) {
        return Err(AppError::validation(
            "discount",
            "discount must be below 100 percent",
        ));
    }
    Ok(discount)
}

/// final_price = price * (1 - discount/100), rounded half-up to cents.
///
/// Inputs are assumed validated; this is a pure function on decimals so
/// cent-level drift from binary floats cannot occur.
pub fn resolve_final_price(price: Decimal, discount: Decimal) -> Decimal {
    if discount.is_zero() {
        return price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    }
    let factor = (dec!(100) - discount) / dec!(100);
    (price * factor).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_discount_returns_price() {
        assert_eq!(resolve_final_price(dec!(100.00), dec!(0)), dec!(100.00));
    }

    #[test]
    fn quarter_off() {
        assert_eq!(resolve_final_price(dec!(100.00), dec!(25)), dec!(75.00));
    }

    #[test]
    fn rounds_half_up_not_truncates() {
        // 99.99 * 0.9 = 89.991 -> 89.99
        assert_eq!(resolve_final_price(dec!(99.99), dec!(10)), dec!(89.99));
        // 10.05 * 0.5 = 5.025 -> 5.03 under half-up; truncation would give 5.02
        assert_eq!(resolve_final_price(dec!(10.05), dec!(50)), dec!(5.03));
    }

    #[test]
    fn full_discount_is_invalid() {
        assert!(validate_discount(dec!(100)).is_err());
        assert!(validate_discount(dec!(150)).is_err());
    }

    #[test]
    fn negative_inputs_are_invalid() {
        assert!(validate_discount(dec!(-1)).is_err());
        assert!(validate_price(dec!(-0.01)).is_err());
    }

    #[test]
    fn boundary_discounts_are_valid() {
        assert!(validate_discount(dec!(0)).is_ok());
        assert!(validate_discount(dec!(99.99)).is_ok());
    }
}
