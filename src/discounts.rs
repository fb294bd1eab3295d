//! Discounts

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    carts::Cart,
    coupons::{Coupon, CouponDiscount},
};

/// Errors specific to discount calculations.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// The coupon's amounts are in a different currency to the cart (coupon, cart).
    #[error("coupon amounts are in {0}, but cart is in {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed")]
    PercentConversion,

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// The discount `coupon` would grant on `cart`.
///
/// Flat discounts are the flat amount; percentage discounts are the percentage of the cart
/// value rounded half away from zero, then limited by the cap. Either way the result never
/// exceeds the cart value, so an empty cart always yields zero.
///
/// # Errors
///
/// Returns a [`DiscountError`] if the coupon and cart currencies differ or the percentage
/// cannot be represented in minor units.
pub fn compute_discount<'a>(
    coupon: &Coupon<'_>,
    cart: &Cart<'a>,
) -> Result<Money<'a, Currency>, DiscountError> {
    let currency = cart.currency();
    let cart_minor = cart.value().to_minor_units();

    let discount_minor = match coupon.discount() {
        CouponDiscount::Flat(amount) => {
            ensure_currency(amount, currency)?;

            amount.to_minor_units()
        }
        CouponDiscount::Percent { percent, cap } => {
            let raw = percent_of_minor(*percent, cart_minor)?;

            match cap {
                Some(cap) => {
                    ensure_currency(cap, currency)?;

                    raw.min(cap.to_minor_units())
                }
                None => raw,
            }
        }
    };

    Ok(Money::from_minor(
        discount_minor.min(cart_minor).max(0),
        currency,
    ))
}

/// `discount` as a percentage of `cart_value`, rounded to two decimal places.
///
/// Zero when the cart value is zero.
pub fn savings_percentage(
    discount: &Money<'_, Currency>,
    cart_value: &Money<'_, Currency>,
) -> Decimal {
    let cart_minor = cart_value.to_minor_units();

    if cart_minor == 0 {
        return Decimal::ZERO;
    }

    let ratio = Decimal::from(discount.to_minor_units()) / Decimal::from(cart_minor);

    (ratio * Decimal::ONE_HUNDRED).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
fn percent_of_minor(percent: Percentage, minor: i64) -> Result<i64, DiscountError> {
    let Some(applied) = (percent * Decimal::ONE).checked_mul(Decimal::from(minor)) else {
        return Err(DiscountError::PercentConversion);
    };

    let rounded = applied.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let Some(rounded) = rounded.to_i64() else {
        return Err(DiscountError::PercentConversion);
    };

    Ok(rounded)
}

fn ensure_currency(amount: &Money<'_, Currency>, currency: &Currency) -> Result<(), DiscountError> {
    let coupon_currency = amount.currency();

    if coupon_currency == currency {
        Ok(())
    } else {
        Err(DiscountError::CurrencyMismatch(
            coupon_currency.iso_alpha_code,
            currency.iso_alpha_code,
        ))
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rusty_money::iso::{GBP, INR};
    use testresult::TestResult;

    use crate::carts::CartItem;

    use super::*;

    fn coupon<'a>(discount: CouponDiscount<'a>) -> Result<Coupon<'a>, crate::coupons::CouponError> {
        Coupon::new(
            "TEST",
            "Test coupon",
            discount,
            Timestamp::UNIX_EPOCH,
            Timestamp::MAX,
        )
    }

    fn cart_of<'a>(minor: i64) -> Result<Cart<'a>, crate::carts::CartError> {
        Cart::with_items([CartItem::new(Money::from_minor(minor, INR), 1, "books")], INR)
    }

    #[test]
    fn percent_discount_with_cap_not_reached() -> TestResult {
        let coupon = coupon(CouponDiscount::percent(
            Decimal::from(20),
            Some(Money::from_minor(50_000, INR)),
        )?)?;

        let discount = compute_discount(&coupon, &cart_of(120_000)?)?;

        assert_eq!(discount, Money::from_minor(24_000, INR));

        Ok(())
    }

    #[test]
    fn percent_discount_is_limited_by_cap() -> TestResult {
        let coupon = coupon(CouponDiscount::percent(
            Decimal::from(20),
            Some(Money::from_minor(50_000, INR)),
        )?)?;

        let discount = compute_discount(&coupon, &cart_of(500_000)?)?;

        assert_eq!(discount, Money::from_minor(50_000, INR));

        Ok(())
    }

    #[test]
    fn uncapped_percent_discount_scales_with_cart() -> TestResult {
        let coupon = coupon(CouponDiscount::percent(Decimal::from(15), None)?)?;

        let discount = compute_discount(&coupon, &cart_of(1_000_000)?)?;

        assert_eq!(discount, Money::from_minor(150_000, INR));

        Ok(())
    }

    #[test]
    fn percent_discount_rounds_half_away_from_zero() -> TestResult {
        let coupon = coupon(CouponDiscount::percent(Decimal::from(50), None)?)?;

        let discount = compute_discount(&coupon, &cart_of(5)?)?;

        assert_eq!(discount, Money::from_minor(3, INR));

        Ok(())
    }

    #[test]
    fn flat_discount_never_exceeds_cart_value() -> TestResult {
        let coupon = coupon(CouponDiscount::flat(Money::from_minor(10_000, INR))?)?;

        assert_eq!(
            compute_discount(&coupon, &cart_of(50_000)?)?,
            Money::from_minor(10_000, INR)
        );
        assert_eq!(
            compute_discount(&coupon, &cart_of(4_000)?)?,
            Money::from_minor(4_000, INR)
        );

        Ok(())
    }

    #[test]
    fn empty_cart_yields_zero_discount() -> TestResult {
        let flat = coupon(CouponDiscount::flat(Money::from_minor(10_000, INR))?)?;
        let percent = coupon(CouponDiscount::percent(Decimal::from(20), None)?)?;
        let empty = Cart::new(INR);

        assert_eq!(compute_discount(&flat, &empty)?, Money::from_minor(0, INR));
        assert_eq!(compute_discount(&percent, &empty)?, Money::from_minor(0, INR));

        Ok(())
    }

    #[test]
    fn currency_mismatch_is_an_error() -> TestResult {
        let coupon = coupon(CouponDiscount::flat(Money::from_minor(10_000, GBP))?)?;

        assert!(matches!(
            compute_discount(&coupon, &cart_of(50_000)?),
            Err(DiscountError::CurrencyMismatch("GBP", "INR"))
        ));

        Ok(())
    }

    #[test]
    fn savings_percentage_rounds_to_two_places() {
        let percentage = savings_percentage(
            &Money::from_minor(100, INR),
            &Money::from_minor(300, INR),
        );

        assert_eq!(percentage, Decimal::new(3333, 2));
    }

    #[test]
    fn savings_percentage_of_empty_cart_is_zero() {
        let percentage = savings_percentage(&Money::from_minor(0, INR), &Money::from_minor(0, INR));

        assert_eq!(percentage, Decimal::ZERO);
    }
}
