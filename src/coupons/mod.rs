//! Coupons
//!
//! Validated, immutable coupon definitions. A [`Coupon`] can only be obtained through
//! [`Coupon::new`] or [`Coupon::try_from_record`], so every instance satisfies the
//! construction invariants: non-empty code and description, a positive discount (at most
//! 100% for percentages) and a start strictly before the end.

use std::{fmt, str::FromStr};

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{eligibility::Eligibility, pricing::money_from_major};

pub mod records;

pub use records::{CouponRecord, EligibilityRecord, parse_timestamp};

/// Coupon validation errors, raised at construction time only.
#[derive(Debug, Error, PartialEq)]
pub enum CouponError {
    /// A required field is absent.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A required text field is empty.
    #[error("field must not be empty: {0}")]
    EmptyField(&'static str),

    /// The discount type is not `FLAT` or `PERCENT`.
    #[error("discountType must be FLAT or PERCENT, got {0}")]
    UnknownDiscountType(String),

    /// The discount value is zero or negative.
    #[error("discountValue must be positive")]
    NonPositiveValue,

    /// A percentage discount above 100%.
    #[error("percent discount cannot exceed 100%, got {0}")]
    PercentOutOfRange(Decimal),

    /// The percentage cap is zero or negative.
    #[error("maxDiscountAmount must be positive")]
    NonPositiveCap,

    /// A date could not be parsed.
    #[error("invalid {field}: {value}; use YYYY-MM-DD or RFC 3339")]
    InvalidDate {
        /// Field name.
        field: &'static str,
        /// Raw value.
        value: String,
    },

    /// The start is not strictly before the end.
    #[error("startDate {starts_at} must be before endDate {ends_at}")]
    InvalidWindow {
        /// Window start.
        starts_at: Timestamp,
        /// Window end.
        ends_at: Timestamp,
    },

    /// A usage limit of zero.
    #[error("usageLimitPerUser must be positive")]
    ZeroUsageLimit,

    /// A monetary threshold is negative.
    #[error("{0} must not be negative")]
    NegativeThreshold(&'static str),

    /// An amount cannot be represented in minor units of the catalog currency.
    #[error("{0} cannot be represented in the catalog currency")]
    UnrepresentableAmount(&'static str),
}

/// Kind of discount a coupon grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscountType {
    /// Fixed amount off the cart.
    Flat,

    /// Percentage of the cart value, optionally capped.
    Percent,
}

impl DiscountType {
    /// Wire name of the discount type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flat => "FLAT",
            Self::Percent => "PERCENT",
        }
    }
}

impl FromStr for DiscountType {
    type Err = CouponError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FLAT" => Ok(Self::Flat),
            "PERCENT" => Ok(Self::Percent),
            other => Err(CouponError::UnknownDiscountType(other.to_string())),
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The discount rule of a coupon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CouponDiscount<'a> {
    /// Fixed amount off (e.g. "₹100 off").
    Flat(Money<'a, Currency>),

    /// Percentage of the cart value (e.g. "20% off, max ₹500").
    Percent {
        /// Fraction of the cart value.
        percent: Percentage,

        /// Upper bound on the absolute discount.
        cap: Option<Money<'a, Currency>>,
    },
}

impl<'a> CouponDiscount<'a> {
    /// A flat discount.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::NonPositiveValue`] if `amount` is not positive.
    pub fn flat(amount: Money<'a, Currency>) -> Result<Self, CouponError> {
        if amount.to_minor_units() <= 0 {
            return Err(CouponError::NonPositiveValue);
        }

        Ok(Self::Flat(amount))
    }

    /// A percentage discount expressed in percentage points (`20` for 20%).
    ///
    /// # Errors
    ///
    /// Returns a [`CouponError`] if `points` is not in `(0, 100]` or `cap` is not positive.
    pub fn percent(
        points: Decimal,
        cap: Option<Money<'a, Currency>>,
    ) -> Result<Self, CouponError> {
        if points <= Decimal::ZERO {
            return Err(CouponError::NonPositiveValue);
        }

        if points > Decimal::ONE_HUNDRED {
            return Err(CouponError::PercentOutOfRange(points));
        }

        if cap.is_some_and(|cap| cap.to_minor_units() <= 0) {
            return Err(CouponError::NonPositiveCap);
        }

        Ok(Self::Percent {
            percent: Percentage::from(points / Decimal::ONE_HUNDRED),
            cap,
        })
    }

    /// The discount type.
    #[must_use]
    pub const fn discount_type(&self) -> DiscountType {
        match self {
            Self::Flat(_) => DiscountType::Flat,
            Self::Percent { .. } => DiscountType::Percent,
        }
    }

    /// The most this discount can ever be worth, if bounded: the flat amount or the cap.
    pub fn max_value(&self) -> Option<&Money<'a, Currency>> {
        match self {
            Self::Flat(amount) => Some(amount),
            Self::Percent { cap, .. } => cap.as_ref(),
        }
    }
}

impl fmt::Display for CouponDiscount<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat(amount) => write!(f, "{amount} off"),
            Self::Percent { percent, cap } => {
                let points = (*percent * Decimal::ONE_HUNDRED).normalize();

                match cap {
                    Some(cap) => write!(f, "{points}% off (capped at {cap})"),
                    None => write!(f, "{points}% off"),
                }
            }
        }
    }
}

/// Where `now` falls relative to a coupon's validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CouponStatus {
    /// `now` is before the start.
    Upcoming,

    /// `starts_at ≤ now ≤ ends_at`.
    Active,

    /// `now` is after the end.
    Expired,
}

impl CouponStatus {
    /// Lowercase name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for CouponStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated coupon.
#[derive(Debug, Clone, PartialEq)]
pub struct Coupon<'a> {
    code: String,
    description: String,
    discount: CouponDiscount<'a>,
    starts_at: Timestamp,
    ends_at: Timestamp,
    usage_limit_per_user: Option<u32>,
    eligibility: Eligibility<'a>,
}

impl<'a> Coupon<'a> {
    /// Create an unrestricted coupon with no usage limit.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponError`] if the code or description is empty, or if `starts_at` is
    /// not strictly before `ends_at`.
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        discount: CouponDiscount<'a>,
        starts_at: Timestamp,
        ends_at: Timestamp,
    ) -> Result<Self, CouponError> {
        let code = code.into();
        let description = description.into();

        if code.is_empty() {
            return Err(CouponError::EmptyField("code"));
        }

        if description.is_empty() {
            return Err(CouponError::EmptyField("description"));
        }

        if starts_at >= ends_at {
            return Err(CouponError::InvalidWindow { starts_at, ends_at });
        }

        Ok(Self {
            code,
            description,
            discount,
            starts_at,
            ends_at,
            usage_limit_per_user: None,
            eligibility: Eligibility::unrestricted(),
        })
    }

    /// Limit how many times each user may apply the coupon.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::ZeroUsageLimit`] if `limit` is zero.
    pub fn with_usage_limit(mut self, limit: u32) -> Result<Self, CouponError> {
        if limit == 0 {
            return Err(CouponError::ZeroUsageLimit);
        }

        self.usage_limit_per_user = Some(limit);

        Ok(self)
    }

    /// Attach eligibility restrictions.
    #[must_use]
    pub fn with_eligibility(mut self, eligibility: Eligibility<'a>) -> Self {
        self.eligibility = eligibility;
        self
    }

    /// Validate a raw record and build a coupon whose amounts are in `currency`.
    ///
    /// `maxDiscountAmount` only applies to `PERCENT` coupons and is ignored for `FLAT`.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponError`] describing the first failed check.
    pub fn try_from_record(
        record: CouponRecord,
        currency: &'a Currency,
    ) -> Result<Self, CouponError> {
        let code = record.code.ok_or(CouponError::MissingField("code"))?;
        let description = record
            .description
            .ok_or(CouponError::MissingField("description"))?;
        let discount_type = record
            .discount_type
            .ok_or(CouponError::MissingField("discountType"))?
            .parse::<DiscountType>()?;
        let value = record
            .discount_value
            .ok_or(CouponError::MissingField("discountValue"))?;

        let discount = match discount_type {
            DiscountType::Flat => {
                if value <= Decimal::ZERO {
                    return Err(CouponError::NonPositiveValue);
                }

                CouponDiscount::flat(amount(value, currency, "discountValue")?)?
            }
            DiscountType::Percent => {
                let cap = record
                    .max_discount_amount
                    .map(|cap| {
                        if cap <= Decimal::ZERO {
                            return Err(CouponError::NonPositiveCap);
                        }

                        amount(cap, currency, "maxDiscountAmount")
                    })
                    .transpose()?;

                CouponDiscount::percent(value, cap)?
            }
        };

        let start_date = record
            .start_date
            .ok_or(CouponError::MissingField("startDate"))?;
        let end_date = record
            .end_date
            .ok_or(CouponError::MissingField("endDate"))?;

        let starts_at = parse_timestamp("startDate", &start_date)?;
        let ends_at = parse_timestamp("endDate", &end_date)?;

        let mut coupon = Self::new(code, description, discount, starts_at, ends_at)?;

        if let Some(limit) = record.usage_limit_per_user {
            coupon = coupon.with_usage_limit(limit)?;
        }

        if let Some(eligibility) = record.eligibility {
            coupon = coupon.with_eligibility(Eligibility::try_from_record(eligibility, currency)?);
        }

        Ok(coupon)
    }

    /// Unique, case-sensitive code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Display text.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Discount rule.
    pub fn discount(&self) -> &CouponDiscount<'a> {
        &self.discount
    }

    /// Discount type.
    pub fn discount_type(&self) -> DiscountType {
        self.discount.discount_type()
    }

    /// Start of the validity window (inclusive).
    pub fn starts_at(&self) -> Timestamp {
        self.starts_at
    }

    /// End of the validity window (inclusive).
    pub fn ends_at(&self) -> Timestamp {
        self.ends_at
    }

    /// Per-user application limit; `None` is unlimited.
    pub fn usage_limit_per_user(&self) -> Option<u32> {
        self.usage_limit_per_user
    }

    /// Eligibility restrictions.
    pub fn eligibility(&self) -> &Eligibility<'a> {
        &self.eligibility
    }

    /// Status of the coupon at `now`.
    pub fn status_at(&self, now: Timestamp) -> CouponStatus {
        if now < self.starts_at {
            CouponStatus::Upcoming
        } else if now > self.ends_at {
            CouponStatus::Expired
        } else {
            CouponStatus::Active
        }
    }

    /// Whether `starts_at ≤ now ≤ ends_at`.
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        self.status_at(now) == CouponStatus::Active
    }
}

fn amount<'a>(
    value: Decimal,
    currency: &'a Currency,
    field: &'static str,
) -> Result<Money<'a, Currency>, CouponError> {
    money_from_major(value, currency).ok_or(CouponError::UnrepresentableAmount(field))
}
