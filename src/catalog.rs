//! Coupon Catalogs

use jiff::Timestamp;
use thiserror::Error;
use tracing::debug;

use crate::coupons::{Coupon, CouponStatus, DiscountType};

/// Errors related to catalog maintenance.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// A coupon with this code already exists.
    #[error("coupon code already exists: {0}")]
    DuplicateCode(String),

    /// No coupon has this code.
    #[error("coupon not found: {0}")]
    NotFound(String),
}

/// Read access to an ordered set of coupons with unique codes.
pub trait CouponCatalog<'a> {
    /// All coupons in catalog order.
    fn coupons(&self) -> &[Coupon<'a>];

    /// Find a coupon by its exact, case-sensitive code.
    fn find_coupon(&self, code: &str) -> Option<&Coupon<'a>> {
        self.coupons().iter().find(|coupon| coupon.code() == code)
    }
}

impl<'a> CouponCatalog<'a> for [Coupon<'a>] {
    fn coupons(&self) -> &[Coupon<'a>] {
        self
    }
}

impl<'a> CouponCatalog<'a> for Vec<Coupon<'a>> {
    fn coupons(&self) -> &[Coupon<'a>] {
        self
    }
}

/// Optional criteria for listing coupons. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogFilter {
    /// Only coupons with this status at the evaluation time.
    pub status: Option<CouponStatus>,

    /// Only coupons of this discount type.
    pub discount_type: Option<DiscountType>,

    /// Only coupons usable by this tier. Matching ignores case; coupons without a tier
    /// restriction match every tier.
    pub user_tier: Option<String>,
}

impl CatalogFilter {
    /// Whether `coupon` meets every set criterion at `now`.
    pub fn matches(&self, coupon: &Coupon<'_>, now: Timestamp) -> bool {
        if let Some(status) = self.status
            && coupon.status_at(now) != status
        {
            return false;
        }

        if let Some(discount_type) = self.discount_type
            && coupon.discount_type() != discount_type
        {
            return false;
        }

        if let Some(tier) = &self.user_tier
            && let Some(tiers) = coupon.eligibility().user_tiers()
        {
            return tiers.contains(&tier.to_uppercase());
        }

        true
    }
}

/// An in-memory catalog that keeps coupons in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog<'a> {
    coupons: Vec<Coupon<'a>>,
}

impl<'a> InMemoryCatalog<'a> {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a coupon.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateCode`] if a coupon with the same code exists.
    pub fn insert(&mut self, coupon: Coupon<'a>) -> Result<(), CatalogError> {
        if self.find_coupon(coupon.code()).is_some() {
            return Err(CatalogError::DuplicateCode(coupon.code().to_string()));
        }

        debug!(code = coupon.code(), "inserted coupon");

        self.coupons.push(coupon);

        Ok(())
    }

    /// Remove and return the coupon with `code`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no coupon has that code.
    pub fn remove(&mut self, code: &str) -> Result<Coupon<'a>, CatalogError> {
        let position = self
            .coupons
            .iter()
            .position(|coupon| coupon.code() == code)
            .ok_or_else(|| CatalogError::NotFound(code.to_string()))?;

        debug!(code, "removed coupon");

        Ok(self.coupons.remove(position))
    }

    /// Coupons matching `filter` at `now`, in catalog order.
    pub fn list(&self, filter: &CatalogFilter, now: Timestamp) -> Vec<&Coupon<'a>> {
        self.coupons
            .iter()
            .filter(|coupon| filter.matches(coupon, now))
            .collect()
    }

    /// Number of coupons.
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }
}

impl<'a> CouponCatalog<'a> for InMemoryCatalog<'a> {
    fn coupons(&self) -> &[Coupon<'a>] {
        &self.coupons
    }
}
