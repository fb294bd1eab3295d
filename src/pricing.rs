//! Pricing

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};

/// Convert a major-unit amount (e.g. `12.50`) into minor units for `currency`.
///
/// Amounts with more precision than the currency supports are rounded half away from zero.
/// Returns `None` if the result does not fit in an `i64`.
pub fn minor_units(amount: Decimal, currency: &Currency) -> Option<i64> {
    let scale = 10_i64.checked_pow(currency.exponent)?;

    amount
        .checked_mul(Decimal::from(scale))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Build a `Money` value from a major-unit amount.
pub fn money_from_major(amount: Decimal, currency: &Currency) -> Option<Money<'_, Currency>> {
    minor_units(amount, currency).map(|minor| Money::from_minor(minor, currency))
}

/// Whether `amount` is at least `floor`. Amounts in different currencies never compare as met.
pub fn meets_floor(amount: &Money<'_, Currency>, floor: &Money<'_, Currency>) -> bool {
    amount.currency() == floor.currency() && amount.to_minor_units() >= floor.to_minor_units()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::{GBP, INR, JPY, USD};

    use super::*;

    #[test]
    fn minor_units_scales_by_currency_exponent() {
        assert_eq!(minor_units(Decimal::new(1250, 2), GBP), Some(1250));
        assert_eq!(minor_units(Decimal::from(500), INR), Some(50_000));
        assert_eq!(minor_units(Decimal::from(500), JPY), Some(500));
    }

    #[test]
    fn minor_units_rounds_excess_precision() {
        assert_eq!(minor_units(Decimal::new(10_005, 3), USD), Some(1001));
    }

    #[test]
    fn minor_units_overflow_returns_none() {
        assert_eq!(minor_units(Decimal::MAX, GBP), None);
    }

    #[test]
    fn meets_floor_compares_same_currency_only() {
        let floor = Money::from_minor(1000, INR);

        assert!(meets_floor(&Money::from_minor(1000, INR), &floor));
        assert!(!meets_floor(&Money::from_minor(999, INR), &floor));
        assert!(!meets_floor(&Money::from_minor(5000, GBP), &floor));
    }
}
