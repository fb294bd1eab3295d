//! Coupons
//!
//! Coupons is a coupon eligibility, discount and best-coupon selection engine. Given a
//! catalog of validated coupons, a user profile, a cart and a point in time, it ranks every
//! coupon the user can apply and applies coupons by code against an injectable usage store.

pub mod analytics;
pub mod carts;
pub mod catalog;
pub mod coupons;
pub mod discounts;
pub mod eligibility;
pub mod fixtures;
pub mod labels;
pub mod prelude;
pub mod pricing;
pub mod selection;
pub mod usage;
pub mod users;
