//! Eligibility
//!
//! A coupon's restrictions are a flat list of independent checks that must all pass. Each
//! restriction is evaluated against the user profile and the cart snapshot; an attribute the
//! user did not supply fails any restriction that depends on it.

use std::fmt;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::{
    carts::Cart,
    coupons::{Coupon, CouponError, EligibilityRecord},
    labels::LabelSet,
    pricing::{meets_floor, money_from_major},
    users::UserProfile,
};

/// A single coupon restriction.
#[derive(Debug, Clone, PartialEq)]
pub enum Restriction<'a> {
    /// The user's tier must be one of these labels.
    UserTier(LabelSet),

    /// The user's lifetime spend must be at least this amount.
    MinLifetimeSpend(Money<'a, Currency>),

    /// The user must have placed at least this many orders.
    MinOrdersPlaced(u32),

    /// The user must not have placed any orders.
    FirstOrderOnly,

    /// The user's country must be one of these codes.
    Country(LabelSet),

    /// The cart value must be at least this amount.
    MinCartValue(Money<'a, Currency>),

    /// At least one cart category must be in this set.
    ApplicableCategories(LabelSet),

    /// No cart category may be in this set.
    ExcludedCategories(LabelSet),

    /// The sum of cart quantities must be at least this many.
    MinItemsCount(u32),
}

impl Restriction<'_> {
    /// Short name of the restriction, used when reporting why a coupon does not apply.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserTier(_) => "allowedUserTiers",
            Self::MinLifetimeSpend(_) => "minLifetimeSpend",
            Self::MinOrdersPlaced(_) => "minOrdersPlaced",
            Self::FirstOrderOnly => "firstOrderOnly",
            Self::Country(_) => "allowedCountries",
            Self::MinCartValue(_) => "minCartValue",
            Self::ApplicableCategories(_) => "applicableCategories",
            Self::ExcludedCategories(_) => "excludedCategories",
            Self::MinItemsCount(_) => "minItemsCount",
        }
    }

    /// Whether the user and cart satisfy this restriction.
    pub fn check(&self, user: &UserProfile<'_>, cart: &Cart<'_>) -> bool {
        match self {
            Self::UserTier(tiers) => user.tier().is_some_and(|tier| tiers.contains(tier)),
            Self::MinLifetimeSpend(floor) => user
                .lifetime_spend()
                .is_some_and(|spend| meets_floor(spend, floor)),
            Self::MinOrdersPlaced(min) => user.orders_placed().is_some_and(|orders| orders >= *min),
            Self::FirstOrderOnly => user.orders_placed() == Some(0),
            Self::Country(countries) => user
                .country()
                .is_some_and(|country| countries.contains(country)),
            Self::MinCartValue(floor) => meets_floor(&cart.value(), floor),
            Self::ApplicableCategories(categories) => cart.categories().intersects(categories),
            Self::ExcludedCategories(categories) => !cart.categories().intersects(categories),
            Self::MinItemsCount(min) => cart.item_count() >= u64::from(*min),
        }
    }
}

impl fmt::Display for Restriction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind();

        match self {
            Self::UserTier(labels)
            | Self::Country(labels)
            | Self::ApplicableCategories(labels)
            | Self::ExcludedCategories(labels) => write!(f, "{kind}: {labels}"),
            Self::MinLifetimeSpend(amount) | Self::MinCartValue(amount) => {
                write!(f, "{kind}: {amount}")
            }
            Self::MinOrdersPlaced(count) | Self::MinItemsCount(count) => {
                write!(f, "{kind}: {count}")
            }
            Self::FirstOrderOnly => f.write_str(kind),
        }
    }
}

/// The full set of restrictions on a coupon. No restrictions means everyone qualifies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Eligibility<'a> {
    restrictions: SmallVec<[Restriction<'a>; 4]>,
}

impl<'a> Eligibility<'a> {
    /// No restrictions.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Eligibility from a list of restrictions, evaluated in order.
    pub fn new(restrictions: impl IntoIterator<Item = Restriction<'a>>) -> Self {
        Self {
            restrictions: restrictions.into_iter().collect(),
        }
    }

    /// Build restrictions from a raw record whose amounts are in `currency`.
    ///
    /// Empty lists and `firstOrderOnly: false` add no restriction.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponError`] if a monetary threshold is negative or unrepresentable.
    pub fn try_from_record(
        record: EligibilityRecord,
        currency: &'a Currency,
    ) -> Result<Self, CouponError> {
        let mut restrictions = SmallVec::new();

        if let Some(tiers) = record.allowed_user_tiers
            && !tiers.is_empty()
        {
            restrictions.push(Restriction::UserTier(tiers));
        }

        if let Some(spend) = record.min_lifetime_spend {
            restrictions.push(Restriction::MinLifetimeSpend(threshold(
                spend,
                currency,
                "minLifetimeSpend",
            )?));
        }

        if let Some(orders) = record.min_orders_placed {
            restrictions.push(Restriction::MinOrdersPlaced(orders));
        }

        if record.first_order_only == Some(true) {
            restrictions.push(Restriction::FirstOrderOnly);
        }

        if let Some(countries) = record.allowed_countries
            && !countries.is_empty()
        {
            restrictions.push(Restriction::Country(countries));
        }

        if let Some(value) = record.min_cart_value {
            restrictions.push(Restriction::MinCartValue(threshold(
                value,
                currency,
                "minCartValue",
            )?));
        }

        if let Some(categories) = record.applicable_categories
            && !categories.is_empty()
        {
            restrictions.push(Restriction::ApplicableCategories(categories));
        }

        if let Some(categories) = record.excluded_categories
            && !categories.is_empty()
        {
            restrictions.push(Restriction::ExcludedCategories(categories));
        }

        if let Some(count) = record.min_items_count {
            restrictions.push(Restriction::MinItemsCount(count));
        }

        Ok(Self { restrictions })
    }

    /// Restrictions in evaluation order.
    pub fn restrictions(&self) -> &[Restriction<'a>] {
        &self.restrictions
    }

    /// Whether there are no restrictions.
    pub fn is_unrestricted(&self) -> bool {
        self.restrictions.is_empty()
    }

    /// The user tier labels this coupon is limited to, if any.
    pub fn user_tiers(&self) -> Option<&LabelSet> {
        self.restrictions.iter().find_map(|restriction| match restriction {
            Restriction::UserTier(tiers) => Some(tiers),
            _ => None,
        })
    }

    /// Whether every restriction passes.
    pub fn matches(&self, user: &UserProfile<'_>, cart: &Cart<'_>) -> bool {
        self.first_failure(user, cart).is_none()
    }

    /// The first restriction that fails, if any.
    pub fn first_failure(
        &self,
        user: &UserProfile<'_>,
        cart: &Cart<'_>,
    ) -> Option<&Restriction<'a>> {
        self.restrictions
            .iter()
            .find(|restriction| !restriction.check(user, cart))
    }
}

/// Whether `user` and `cart` satisfy every restriction on `coupon`.
///
/// Time window and usage limits are not considered here.
pub fn is_eligible(coupon: &Coupon<'_>, user: &UserProfile<'_>, cart: &Cart<'_>) -> bool {
    coupon.eligibility().matches(user, cart)
}

fn threshold<'a>(
    value: Decimal,
    currency: &'a Currency,
    field: &'static str,
) -> Result<Money<'a, Currency>, CouponError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(CouponError::NegativeThreshold(field));
    }

    money_from_major(value, currency).ok_or(CouponError::UnrepresentableAmount(field))
}
