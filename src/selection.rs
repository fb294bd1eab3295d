//! Coupon Selection
//!
//! Ranking every applicable coupon for a user and cart, and applying a single coupon by
//! code. Both operations read the catalog and usage store they are given and hold no state
//! of their own.

use std::cmp::Ordering;

use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::{Span, debug, info};

use crate::{
    carts::Cart,
    catalog::CouponCatalog,
    coupons::{Coupon, CouponStatus},
    discounts::{DiscountError, compute_discount, savings_percentage},
    usage::UsageStore,
    users::UserProfile,
};

/// Reasons a coupon cannot be applied.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// No coupon has this code.
    #[error("coupon not found: {0}")]
    NotFound(String),

    /// The coupon's validity window has not started.
    #[error("coupon {code} is not valid until {starts_at}")]
    NotYetStarted {
        /// Coupon code.
        code: String,
        /// Window start.
        starts_at: Timestamp,
    },

    /// The coupon's validity window has ended.
    #[error("coupon {code} expired at {ends_at}")]
    Expired {
        /// Coupon code.
        code: String,
        /// Window end.
        ends_at: Timestamp,
    },

    /// The user has used the coupon as many times as allowed.
    #[error("coupon {code} usage limit reached ({limit} per user)")]
    UsageExceeded {
        /// Coupon code.
        code: String,
        /// Per-user limit.
        limit: u32,
    },

    /// A restriction on the coupon failed.
    #[error("user is not eligible for coupon {code}: {restriction} not met")]
    Ineligible {
        /// Coupon code.
        code: String,
        /// Name of the first failing restriction.
        restriction: &'static str,
    },

    /// Discount calculation failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

impl ApplyError {
    /// Whether the coupon was rejected because of its validity window.
    pub fn is_time_window(&self) -> bool {
        matches!(self, Self::NotYetStarted { .. } | Self::Expired { .. })
    }
}

/// An applicable coupon with its discount on the evaluated cart.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCoupon<'c, 'a> {
    coupon: &'c Coupon<'a>,
    discount: Money<'a, Currency>,
    savings_percentage: Decimal,
}

impl<'c, 'a> RankedCoupon<'c, 'a> {
    /// The coupon.
    pub fn coupon(&self) -> &'c Coupon<'a> {
        self.coupon
    }

    /// Discount on the cart.
    pub fn discount(&self) -> &Money<'a, Currency> {
        &self.discount
    }

    /// Discount as a percentage of the cart value, to two decimal places.
    pub fn savings_percentage(&self) -> Decimal {
        self.savings_percentage
    }
}

/// Ranked applicable coupons, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'c, 'a> {
    cart_value: Money<'a, Currency>,
    ranked: Vec<RankedCoupon<'c, 'a>>,
}

impl<'c, 'a> Selection<'c, 'a> {
    /// Number of applicable coupons.
    pub fn eligible_count(&self) -> usize {
        self.ranked.len()
    }

    /// Value of the evaluated cart.
    pub fn cart_value(&self) -> &Money<'a, Currency> {
        &self.cart_value
    }

    /// All applicable coupons, best first.
    pub fn ranked(&self) -> &[RankedCoupon<'c, 'a>] {
        &self.ranked
    }

    /// The best coupon, if any applies.
    pub fn best(&self) -> Option<&RankedCoupon<'c, 'a>> {
        self.ranked.first()
    }

    /// Whether no coupon applies.
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

/// The outcome of a successful application.
#[derive(Debug, Clone, PartialEq)]
pub struct Application<'c, 'a> {
    coupon: &'c Coupon<'a>,
    discount: Money<'a, Currency>,
    cart_value: Money<'a, Currency>,
    final_amount: Money<'a, Currency>,
    savings_percentage: Decimal,
    usage_count: u32,
    remaining_uses: Option<u32>,
}

impl<'c, 'a> Application<'c, 'a> {
    /// The applied coupon.
    pub fn coupon(&self) -> &'c Coupon<'a> {
        self.coupon
    }

    /// Code of the applied coupon.
    pub fn code(&self) -> &str {
        self.coupon.code()
    }

    /// Description of the applied coupon.
    pub fn description(&self) -> &str {
        self.coupon.description()
    }

    /// Discount granted.
    pub fn discount(&self) -> &Money<'a, Currency> {
        &self.discount
    }

    /// Cart value before the discount.
    pub fn cart_value(&self) -> &Money<'a, Currency> {
        &self.cart_value
    }

    /// Cart value after the discount.
    pub fn final_amount(&self) -> &Money<'a, Currency> {
        &self.final_amount
    }

    /// Discount as a percentage of the cart value, to two decimal places.
    pub fn savings_percentage(&self) -> Decimal {
        self.savings_percentage
    }

    /// How many times the user has now applied this coupon.
    pub fn usage_count(&self) -> u32 {
        self.usage_count
    }

    /// Applications left for the user; `None` when unlimited.
    pub fn remaining_uses(&self) -> Option<u32> {
        self.remaining_uses
    }
}

/// Rank every coupon in `catalog` that `user` can apply to `cart` at `now`.
///
/// A coupon survives if it is inside its validity window, the user has uses left and every
/// restriction passes. Survivors are ordered by discount (largest first), then by the
/// sooner `ends_at`, then by code. A coupon that cannot be priced against the cart, such as
/// one whose amounts are in another currency, is skipped like any other coupon that does not
/// apply. No applicable coupon is an empty selection, not an error.
#[tracing::instrument(
    name = "coupons.selection.select_best",
    skip(catalog, usage, user, cart, now),
    fields(
        user_id = %user.id(),
        cart_value = %cart.value(),
        eligible_count = tracing::field::Empty
    )
)]
pub fn select_best<'c, 'a, C, U>(
    catalog: &'c C,
    usage: &U,
    user: &UserProfile<'_>,
    cart: &Cart<'a>,
    now: Timestamp,
) -> Selection<'c, 'a>
where
    C: CouponCatalog<'a> + ?Sized,
    U: UsageStore + ?Sized,
{
    let cart_value = cart.value();
    let mut ranked = Vec::new();

    for coupon in catalog.coupons() {
        if !coupon.is_active_at(now) {
            debug!(
                code = coupon.code(),
                status = %coupon.status_at(now),
                "skipped coupon outside its window"
            );
            continue;
        }

        if let Some(limit) = coupon.usage_limit_per_user()
            && usage.usage_count(user.id(), coupon.code()) >= limit
        {
            debug!(code = coupon.code(), limit, "skipped coupon with no uses left");
            continue;
        }

        if let Some(restriction) = coupon.eligibility().first_failure(user, cart) {
            debug!(
                code = coupon.code(),
                restriction = restriction.kind(),
                "skipped ineligible coupon"
            );
            continue;
        }

        let discount = match compute_discount(coupon, cart) {
            Ok(discount) => discount,
            Err(error) => {
                debug!(code = coupon.code(), %error, "skipped coupon that cannot be priced");
                continue;
            }
        };

        ranked.push(RankedCoupon {
            coupon,
            savings_percentage: savings_percentage(&discount, &cart_value),
            discount,
        });
    }

    ranked.sort_by(compare_ranked);

    Span::current().record("eligible_count", ranked.len());

    Selection { cart_value, ranked }
}

/// Apply the coupon with `code` for `user` on `cart` at `now`, recording one use.
///
/// Checks run in order: existence, validity window, usage limit, restrictions. Usage is
/// recorded only once every check has passed and the discount has been computed.
///
/// # Errors
///
/// Returns an [`ApplyError`] naming the first failed check; the usage store is unchanged.
#[tracing::instrument(
    name = "coupons.selection.apply",
    skip(catalog, usage, user, cart, now),
    fields(user_id = %user.id(), code = %code),
    err
)]
pub fn apply<'c, 'a, C, U>(
    catalog: &'c C,
    usage: &mut U,
    user: &UserProfile<'_>,
    cart: &Cart<'a>,
    code: &str,
    now: Timestamp,
) -> Result<Application<'c, 'a>, ApplyError>
where
    C: CouponCatalog<'a> + ?Sized,
    U: UsageStore + ?Sized,
{
    let coupon = catalog
        .find_coupon(code)
        .ok_or_else(|| ApplyError::NotFound(code.to_string()))?;

    match coupon.status_at(now) {
        CouponStatus::Upcoming => {
            return Err(ApplyError::NotYetStarted {
                code: code.to_string(),
                starts_at: coupon.starts_at(),
            });
        }
        CouponStatus::Expired => {
            return Err(ApplyError::Expired {
                code: code.to_string(),
                ends_at: coupon.ends_at(),
            });
        }
        CouponStatus::Active => {}
    }

    if let Some(limit) = coupon.usage_limit_per_user()
        && usage.usage_count(user.id(), code) >= limit
    {
        return Err(ApplyError::UsageExceeded {
            code: code.to_string(),
            limit,
        });
    }

    if let Some(restriction) = coupon.eligibility().first_failure(user, cart) {
        return Err(ApplyError::Ineligible {
            code: code.to_string(),
            restriction: restriction.kind(),
        });
    }

    let cart_value = cart.value();
    let discount = compute_discount(coupon, cart)?;
    let final_amount = cart_value.sub(discount).map_err(DiscountError::from)?;

    let usage_count = usage.record_usage(user.id(), code);
    let remaining_uses = coupon
        .usage_limit_per_user()
        .map(|limit| limit.saturating_sub(usage_count));

    info!(%discount, usage_count, "applied coupon");

    Ok(Application {
        coupon,
        savings_percentage: savings_percentage(&discount, &cart_value),
        discount,
        cart_value,
        final_amount,
        usage_count,
        remaining_uses,
    })
}

fn compare_ranked(a: &RankedCoupon<'_, '_>, b: &RankedCoupon<'_, '_>) -> Ordering {
    b.discount
        .to_minor_units()
        .cmp(&a.discount.to_minor_units())
        .then_with(|| a.coupon.ends_at().cmp(&b.coupon.ends_at()))
        .then_with(|| a.coupon.code().cmp(b.coupon.code()))
}
