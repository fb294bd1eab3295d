//! Coupon Records
//!
//! Raw, unvalidated coupon definitions as they arrive from catalogs and fixtures.

use jiff::{Timestamp, civil::Date, tz::TimeZone};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{coupons::CouponError, labels::LabelSet};

/// Raw coupon definition. Every field is optional so that missing fields surface as
/// [`CouponError`]s instead of parse failures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponRecord {
    /// Unique, case-sensitive code.
    pub code: Option<String>,

    /// Display text.
    pub description: Option<String>,

    /// `FLAT` or `PERCENT`.
    pub discount_type: Option<String>,

    /// Flat amount in major units, or percentage points for `PERCENT`.
    pub discount_value: Option<Decimal>,

    /// Cap on a `PERCENT` discount, in major units.
    pub max_discount_amount: Option<Decimal>,

    /// Start of the validity window (`YYYY-MM-DD` or RFC 3339).
    pub start_date: Option<String>,

    /// End of the validity window (`YYYY-MM-DD` or RFC 3339).
    pub end_date: Option<String>,

    /// Maximum applications per user.
    pub usage_limit_per_user: Option<u32>,

    /// Restrictions; absent means everyone qualifies.
    pub eligibility: Option<EligibilityRecord>,
}

/// Raw eligibility restrictions. Each present field adds one restriction.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityRecord {
    /// Tier labels the user must belong to.
    pub allowed_user_tiers: Option<LabelSet>,

    /// Minimum lifetime spend in major units.
    pub min_lifetime_spend: Option<Decimal>,

    /// Minimum orders placed.
    pub min_orders_placed: Option<u32>,

    /// Restrict to users with no prior orders.
    pub first_order_only: Option<bool>,

    /// Country codes the user must belong to.
    pub allowed_countries: Option<LabelSet>,

    /// Minimum cart value in major units.
    pub min_cart_value: Option<Decimal>,

    /// At least one cart line must be in one of these categories.
    pub applicable_categories: Option<LabelSet>,

    /// No cart line may be in one of these categories.
    pub excluded_categories: Option<LabelSet>,

    /// Minimum sum of line quantities.
    pub min_items_count: Option<u32>,
}

/// Parse a coupon date as an RFC 3339 timestamp or a bare `YYYY-MM-DD` date at UTC midnight.
///
/// # Errors
///
/// Returns [`CouponError::InvalidDate`] if the value is neither.
pub fn parse_timestamp(field: &'static str, value: &str) -> Result<Timestamp, CouponError> {
    let invalid = || CouponError::InvalidDate {
        field,
        value: value.to_string(),
    };

    if let Ok(timestamp) = value.parse::<Timestamp>() {
        return Ok(timestamp);
    }

    let date = value.parse::<Date>().map_err(|_err| invalid())?;

    date.to_zoned(TimeZone::UTC)
        .map(|zoned| zoned.timestamp())
        .map_err(|_err| invalid())
}
