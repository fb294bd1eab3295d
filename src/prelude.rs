//! Coupons prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    analytics::{ActiveCoupon, CatalogSummary, CouponReport, report, summarize},
    carts::{Cart, CartError, CartItem},
    catalog::{CatalogError, CatalogFilter, CouponCatalog, InMemoryCatalog},
    coupons::{Coupon, CouponDiscount, CouponError, CouponRecord, CouponStatus, DiscountType},
    discounts::{DiscountError, compute_discount, savings_percentage},
    eligibility::{Eligibility, Restriction, is_eligible},
    fixtures::{Fixture, FixtureError, Request},
    labels::LabelSet,
    selection::{Application, ApplyError, RankedCoupon, Selection, apply, select_best},
    usage::{UsageStore, UsageTracker},
    users::{UserError, UserProfile},
};
