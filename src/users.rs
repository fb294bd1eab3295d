//! Users

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::pricing::money_from_major;

/// Errors related to user profile construction.
#[derive(Debug, Error, PartialEq)]
pub enum UserError {
    /// The user identifier is empty.
    #[error("user id must not be empty")]
    MissingId,

    /// Lifetime spend is negative or cannot be represented.
    #[error("invalid lifetime spend: {0}")]
    InvalidLifetimeSpend(Decimal),
}

/// The user attributes that coupon restrictions are evaluated against.
///
/// Every attribute except the identifier is optional; a missing attribute fails any
/// restriction that depends on it.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile<'a> {
    id: String,
    tier: Option<String>,
    lifetime_spend: Option<Money<'a, Currency>>,
    orders_placed: Option<u32>,
    country: Option<String>,
}

impl<'a> UserProfile<'a> {
    /// Create a profile with only an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tier: None,
            lifetime_spend: None,
            orders_placed: None,
            country: None,
        }
    }

    /// Set the user tier label.
    #[must_use]
    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = Some(tier.into());
        self
    }

    /// Set the lifetime spend.
    #[must_use]
    pub fn with_lifetime_spend(mut self, spend: Money<'a, Currency>) -> Self {
        self.lifetime_spend = Some(spend);
        self
    }

    /// Set the number of orders placed.
    #[must_use]
    pub fn with_orders_placed(mut self, orders: u32) -> Self {
        self.orders_placed = Some(orders);
        self
    }

    /// Set the country code.
    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Build a profile from a raw record whose monetary amounts are in `currency`.
    ///
    /// # Errors
    ///
    /// Returns a [`UserError`] if the id is empty or the lifetime spend is invalid.
    pub fn try_from_record(record: UserRecord, currency: &'a Currency) -> Result<Self, UserError> {
        if record.user_id.is_empty() {
            return Err(UserError::MissingId);
        }

        let lifetime_spend = record
            .lifetime_spend
            .map(|spend| {
                if spend.is_sign_negative() {
                    return Err(UserError::InvalidLifetimeSpend(spend));
                }

                money_from_major(spend, currency).ok_or(UserError::InvalidLifetimeSpend(spend))
            })
            .transpose()?;

        Ok(Self {
            id: record.user_id,
            tier: record.user_tier,
            lifetime_spend,
            orders_placed: record.orders_placed,
            country: record.country,
        })
    }

    /// User identifier, the key for usage tracking.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// User tier label, if known.
    pub fn tier(&self) -> Option<&str> {
        self.tier.as_deref()
    }

    /// Lifetime spend, if known.
    pub fn lifetime_spend(&self) -> Option<&Money<'a, Currency>> {
        self.lifetime_spend.as_ref()
    }

    /// Number of orders placed, if known.
    pub fn orders_placed(&self) -> Option<u32> {
        self.orders_placed
    }

    /// Country code, if known.
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }
}

/// Raw user profile as received from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// User identifier.
    pub user_id: String,

    /// Tier label such as `NEW`, `REGULAR` or `GOLD`.
    #[serde(default)]
    pub user_tier: Option<String>,

    /// Lifetime spend in major units.
    #[serde(default)]
    pub lifetime_spend: Option<Decimal>,

    /// Orders placed so far.
    #[serde(default)]
    pub orders_placed: Option<u32>,

    /// Country code.
    #[serde(default)]
    pub country: Option<String>,
}
