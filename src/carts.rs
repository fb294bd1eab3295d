//! Carts

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::{labels::LabelSet, pricing::minor_units};

/// Errors related to cart construction.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// A line item's currency differs from the cart currency (index, item currency, cart currency).
    #[error("Item {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A line item has a negative unit price.
    #[error("Item {0} has a negative unit price")]
    NegativePrice(usize),

    /// A line item's price could not be represented in minor units.
    #[error("Item {0} has a price that cannot be represented")]
    InvalidPrice(usize),

    /// The cart total overflowed.
    #[error("cart value overflowed")]
    Overflow,
}

/// A single cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem<'a> {
    unit_price: Money<'a, Currency>,
    quantity: u32,
    category: String,
}

impl<'a> CartItem<'a> {
    /// Create a new line item.
    pub fn new(unit_price: Money<'a, Currency>, quantity: u32, category: impl Into<String>) -> Self {
        Self {
            unit_price,
            quantity,
            category: category.into(),
        }
    }

    /// Unit price of the line.
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Quantity of the line.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Category of the line.
    pub fn category(&self) -> &str {
        &self.category
    }

    fn line_total_minor(&self) -> Option<i64> {
        self.unit_price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
    }
}

/// Cart snapshot used for eligibility and pricing.
///
/// The value, category set and item count are computed once when the cart is built.
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    items: Vec<CartItem<'a>>,
    currency: &'a Currency,
    value_minor: i64,
    categories: LabelSet,
    item_count: u64,
}

impl<'a> Cart<'a> {
    /// Create an empty cart.
    pub fn new(currency: &'a Currency) -> Self {
        Self {
            items: Vec::new(),
            currency,
            value_minor: 0,
            categories: LabelSet::empty(),
            item_count: 0,
        }
    }

    /// Create a cart with the given line items.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if an item has a different currency or a negative price, or if
    /// the cart value overflows.
    pub fn with_items(
        items: impl Into<Vec<CartItem<'a>>>,
        currency: &'a Currency,
    ) -> Result<Self, CartError> {
        let items = items.into();

        let mut value_minor: i64 = 0;
        let mut item_count: u64 = 0;
        let mut categories = LabelSet::empty();

        for (i, item) in items.iter().enumerate() {
            let item_currency = item.unit_price.currency();

            if item_currency != currency {
                return Err(CartError::CurrencyMismatch(
                    i,
                    item_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            if item.unit_price.to_minor_units() < 0 {
                return Err(CartError::NegativePrice(i));
            }

            value_minor = item
                .line_total_minor()
                .and_then(|line| value_minor.checked_add(line))
                .ok_or(CartError::Overflow)?;

            item_count = item_count.saturating_add(u64::from(item.quantity));
            categories.insert(&item.category);
        }

        Ok(Self {
            items,
            currency,
            value_minor,
            categories,
            item_count,
        })
    }

    /// Build a cart from a raw record whose prices are major-unit amounts in `currency`.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if a price is negative or unrepresentable.
    pub fn try_from_record(record: CartRecord, currency: &'a Currency) -> Result<Self, CartError> {
        let items = record
            .items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                if item.unit_price.is_sign_negative() {
                    return Err(CartError::NegativePrice(i));
                }

                let minor =
                    minor_units(item.unit_price, currency).ok_or(CartError::InvalidPrice(i))?;

                Ok(CartItem::new(
                    Money::from_minor(minor, currency),
                    item.quantity,
                    item.category,
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::with_items(items, currency)
    }

    /// Cart value: sum of unit price × quantity. Zero for an empty cart.
    pub fn value(&self) -> Money<'a, Currency> {
        Money::from_minor(self.value_minor, self.currency)
    }

    /// Distinct categories present in the cart.
    pub fn categories(&self) -> &LabelSet {
        &self.categories
    }

    /// Sum of line-item quantities.
    pub fn item_count(&self) -> u64 {
        self.item_count
    }

    /// Line items in cart order.
    pub fn items(&self) -> &[CartItem<'a>] {
        &self.items
    }

    /// Currency of the cart.
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Whether the cart has no line items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Raw cart as received from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRecord {
    /// Line items; a missing list is an empty cart.
    #[serde(default)]
    pub items: Vec<CartItemRecord>,
}

/// Raw cart line.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRecord {
    /// Unit price in major units.
    pub unit_price: Decimal,

    /// Quantity.
    pub quantity: u32,

    /// Product category.
    pub category: String,
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, INR, USD};
    use testresult::TestResult;

    use super::*;

    fn test_items<'a>() -> [CartItem<'a>; 3] {
        [
            CartItem::new(Money::from_minor(50_000, INR), 2, "electronics"),
            CartItem::new(Money::from_minor(20_000, INR), 1, "fashion"),
            CartItem::new(Money::from_minor(1_000, INR), 3, "electronics"),
        ]
    }

    #[test]
    fn new_cart_is_empty_with_zero_value() {
        let cart = Cart::new(INR);

        assert!(cart.is_empty());
        assert_eq!(cart.value(), Money::from_minor(0, INR));
        assert_eq!(cart.item_count(), 0);
        assert!(cart.categories().is_empty());
    }

    #[test]
    fn with_items_computes_value_count_and_categories() -> TestResult {
        let cart = Cart::with_items(test_items(), INR)?;

        assert_eq!(cart.value(), Money::from_minor(123_000, INR));
        assert_eq!(cart.item_count(), 6);
        assert_eq!(
            cart.categories(),
            &LabelSet::from_strs(&["electronics", "fashion"])
        );

        Ok(())
    }

    #[test]
    fn with_items_currency_mismatch_errors() {
        let items = [
            CartItem::new(Money::from_minor(100, GBP), 1, "books"),
            CartItem::new(Money::from_minor(100, USD), 1, "books"),
        ];

        let result = Cart::with_items(items, GBP);

        assert_eq!(
            result.err(),
            Some(CartError::CurrencyMismatch(
                1,
                USD.iso_alpha_code,
                GBP.iso_alpha_code
            ))
        );
    }

    #[test]
    fn with_items_rejects_negative_prices() {
        let items = [CartItem::new(Money::from_minor(-1, GBP), 1, "books")];

        assert_eq!(
            Cart::with_items(items, GBP).err(),
            Some(CartError::NegativePrice(0))
        );
    }

    #[test]
    fn with_items_detects_overflow() {
        let items = [CartItem::new(Money::from_minor(i64::MAX, GBP), 2, "books")];

        assert_eq!(Cart::with_items(items, GBP).err(), Some(CartError::Overflow));
    }

    #[test]
    fn try_from_record_converts_major_units() -> TestResult {
        let record: CartRecord = serde_norway::from_str(
            r"
items:
  - unitPrice: 999.50
    quantity: 2
    category: electronics
  - unitPrice: 1
    quantity: 1
    category: grocery
",
        )?;

        let cart = Cart::try_from_record(record, INR)?;

        assert_eq!(cart.value(), Money::from_minor(200_000, INR));
        assert_eq!(cart.item_count(), 3);

        Ok(())
    }

    #[test]
    fn missing_items_deserialize_as_empty_cart() -> TestResult {
        let record: CartRecord = serde_norway::from_str("{}")?;
        let cart = Cart::try_from_record(record, INR)?;

        assert!(cart.is_empty());
        assert_eq!(cart.value(), Money::from_minor(0, INR));

        Ok(())
    }
}
