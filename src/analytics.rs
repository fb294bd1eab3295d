//! Catalog Analytics
//!
//! Read-only summaries of a coupon catalog at a point in time.

use jiff::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy};
use rustc_hash::FxHashMap;
use rusty_money::{Money, MoneyError, iso::Currency};

use crate::{
    catalog::CouponCatalog,
    coupons::{Coupon, CouponStatus, DiscountType},
    eligibility::Restriction,
};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// An active coupon and the whole days left until it expires, rounded up.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveCoupon<'c, 'a> {
    /// The coupon.
    pub coupon: &'c Coupon<'a>,

    /// Days until `ends_at`, rounded up.
    pub days_until_expiry: i64,
}

/// Counts and highlights across a whole catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSummary<'c, 'a> {
    /// Number of coupons.
    pub total: usize,

    /// Coupons inside their window.
    pub active: usize,

    /// Coupons whose window has not started.
    pub upcoming: usize,

    /// Coupons whose window has ended.
    pub expired: usize,

    /// `FLAT` coupons.
    pub flat: usize,

    /// `PERCENT` coupons.
    pub percent: usize,

    /// Coupons per allowed tier, sorted by tier.
    pub tier_distribution: Vec<(String, usize)>,

    /// Coupons without a tier restriction.
    pub unrestricted_tiers: usize,

    /// Coupons per applicable category, sorted by category.
    pub category_counts: Vec<(String, usize)>,

    /// Sum of flat values and percentage caps. `None` for an empty catalog.
    pub potential_max_savings: Option<Money<'a, Currency>>,

    /// The coupon with the largest flat value or cap; the first wins ties.
    pub most_generous: Option<&'c Coupon<'a>>,

    /// Active coupons in catalog order.
    pub active_coupons: Vec<ActiveCoupon<'c, 'a>>,
}

/// Summarize `catalog` at `now`.
///
/// # Errors
///
/// Returns a [`MoneyError`] if coupon amounts are in more than one currency.
pub fn summarize<'c, 'a, C>(
    catalog: &'c C,
    now: Timestamp,
) -> Result<CatalogSummary<'c, 'a>, MoneyError>
where
    C: CouponCatalog<'a> + ?Sized,
{
    let coupons = catalog.coupons();

    let mut summary = CatalogSummary {
        total: coupons.len(),
        active: 0,
        upcoming: 0,
        expired: 0,
        flat: 0,
        percent: 0,
        tier_distribution: Vec::new(),
        unrestricted_tiers: 0,
        category_counts: Vec::new(),
        potential_max_savings: None,
        most_generous: None,
        active_coupons: Vec::new(),
    };

    let mut tiers: FxHashMap<&str, usize> = FxHashMap::default();
    let mut categories: FxHashMap<&str, usize> = FxHashMap::default();
    let mut most_generous_minor = 0;

    for coupon in coupons {
        match coupon.status_at(now) {
            CouponStatus::Active => {
                summary.active += 1;
                summary.active_coupons.push(ActiveCoupon {
                    coupon,
                    days_until_expiry: days_ceil(now, coupon.ends_at()),
                });
            }
            CouponStatus::Upcoming => summary.upcoming += 1,
            CouponStatus::Expired => summary.expired += 1,
        }

        match coupon.discount_type() {
            DiscountType::Flat => summary.flat += 1,
            DiscountType::Percent => summary.percent += 1,
        }

        match coupon.eligibility().user_tiers() {
            Some(allowed) => {
                for tier in allowed {
                    *tiers.entry(tier).or_default() += 1;
                }
            }
            None => summary.unrestricted_tiers += 1,
        }

        for restriction in coupon.eligibility().restrictions() {
            if let Restriction::ApplicableCategories(applicable) = restriction {
                for category in applicable {
                    *categories.entry(category).or_default() += 1;
                }
            }
        }

        let max_value = coupon.discount().max_value();
        let max_minor = max_value.map_or(0, Money::to_minor_units);

        if summary.most_generous.is_none() || max_minor > most_generous_minor {
            summary.most_generous = Some(coupon);
            most_generous_minor = max_minor;
        }

        if let Some(value) = max_value {
            summary.potential_max_savings = Some(match summary.potential_max_savings {
                Some(total) => total.add(*value)?,
                None => *value,
            });
        }
    }

    summary.tier_distribution = sorted_counts(tiers);
    summary.category_counts = sorted_counts(categories);

    Ok(summary)
}

/// Timeline details for a single coupon.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponReport<'c, 'a> {
    /// The coupon.
    pub coupon: &'c Coupon<'a>,

    /// Status at the report time.
    pub status: CouponStatus,

    /// Whole days left, rounded up. Zero unless active.
    pub days_remaining: i64,

    /// Length of the validity window in days, rounded up.
    pub total_duration_days: i64,

    /// Share of the window already elapsed, clamped to `0..=100` and rounded to one place.
    pub percentage_elapsed: Decimal,
}

impl CouponReport<'_, '_> {
    /// Per-user usage limit; `None` is unlimited.
    pub fn usage_limit(&self) -> Option<u32> {
        self.coupon.usage_limit_per_user()
    }
}

/// Report on `coupon` at `now`.
pub fn report<'c, 'a>(coupon: &'c Coupon<'a>, now: Timestamp) -> CouponReport<'c, 'a> {
    let status = coupon.status_at(now);
    let remaining = days_ceil(now, coupon.ends_at());
    let total = days_ceil(coupon.starts_at(), coupon.ends_at());

    let percentage_elapsed = if total > 0 {
        let elapsed = Decimal::from(total - remaining) / Decimal::from(total);

        (elapsed * Decimal::ONE_HUNDRED)
            .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    } else {
        Decimal::ZERO
    };

    CouponReport {
        coupon,
        status,
        days_remaining: if status == CouponStatus::Active {
            remaining
        } else {
            0
        },
        total_duration_days: total,
        percentage_elapsed,
    }
}

/// Whole days from `from` to `to`, rounded towards positive infinity.
fn days_ceil(from: Timestamp, to: Timestamp) -> i64 {
    let millis = to.as_millisecond() - from.as_millisecond();
    let days = millis / MILLIS_PER_DAY;

    if millis % MILLIS_PER_DAY > 0 {
        days + 1
    } else {
        days
    }
}

fn sorted_counts(counts: FxHashMap<&str, usize>) -> Vec<(String, usize)> {
    let mut counts: Vec<_> = counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();

    counts.sort();

    counts
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;
    use testresult::TestResult;

    use crate::{
        coupons::CouponDiscount,
        eligibility::Eligibility,
        labels::LabelSet,
    };

    use super::*;

    fn ts(value: &str) -> Result<Timestamp, jiff::Error> {
        value.parse()
    }

    fn catalog<'a>() -> TestResult<Vec<Coupon<'a>>> {
        Ok(vec![
            Coupon::new(
                "WELCOME100",
                "Flat 100 off",
                CouponDiscount::flat(Money::from_minor(10_000, INR))?,
                ts("2025-01-01T00:00:00Z")?,
                ts("2025-12-31T00:00:00Z")?,
            )?
            .with_eligibility(Eligibility::new([Restriction::UserTier(
                LabelSet::from_strs(&["NEW"]),
            )])),
            Coupon::new(
                "GOLD20",
                "20% off for gold",
                CouponDiscount::percent(
                    Decimal::from(20),
                    Some(Money::from_minor(50_000, INR)),
                )?,
                ts("2025-01-01T00:00:00Z")?,
                ts("2025-12-31T00:00:00Z")?,
            )?
            .with_eligibility(Eligibility::new([
                Restriction::UserTier(LabelSet::from_strs(&["GOLD", "PLATINUM"])),
                Restriction::ApplicableCategories(LabelSet::from_strs(&["electronics"])),
            ])),
            Coupon::new(
                "MEGA",
                "Flat 500 off",
                CouponDiscount::flat(Money::from_minor(50_000, INR))?,
                ts("2026-01-01T00:00:00Z")?,
                ts("2026-02-01T00:00:00Z")?,
            )?,
            Coupon::new(
                "OPEN15",
                "15% off",
                CouponDiscount::percent(Decimal::from(15), None)?,
                ts("2024-01-01T00:00:00Z")?,
                ts("2024-06-01T00:00:00Z")?,
            )?
            .with_eligibility(Eligibility::new([Restriction::ApplicableCategories(
                LabelSet::from_strs(&["electronics", "fashion"]),
            )])),
        ])
    }

    #[test]
    fn summarize_counts_statuses_types_and_labels() -> TestResult {
        let coupons = catalog()?;
        let summary = summarize(&coupons, ts("2025-06-01T00:00:00Z")?)?;

        assert_eq!(summary.total, 4);
        assert_eq!(
            (summary.active, summary.upcoming, summary.expired),
            (2, 1, 1)
        );
        assert_eq!((summary.flat, summary.percent), (2, 2));
        assert_eq!(
            summary.tier_distribution,
            [
                ("GOLD".to_string(), 1),
                ("NEW".to_string(), 1),
                ("PLATINUM".to_string(), 1),
            ]
        );
        assert_eq!(summary.unrestricted_tiers, 2);
        assert_eq!(
            summary.category_counts,
            [("electronics".to_string(), 2), ("fashion".to_string(), 1)]
        );

        Ok(())
    }

    #[test]
    fn summarize_sums_savings_and_keeps_first_most_generous() -> TestResult {
        let coupons = catalog()?;
        let summary = summarize(&coupons, ts("2025-06-01T00:00:00Z")?)?;

        assert_eq!(
            summary.potential_max_savings,
            Some(Money::from_minor(110_000, INR))
        );
        assert_eq!(
            summary.most_generous.map(Coupon::code),
            Some("GOLD20")
        );

        Ok(())
    }

    #[test]
    fn summarize_lists_active_coupons_with_days_left() -> TestResult {
        let coupons = catalog()?;
        let summary = summarize(&coupons, ts("2025-12-29T12:00:00Z")?)?;

        let active: Vec<_> = summary
            .active_coupons
            .iter()
            .map(|active| (active.coupon.code(), active.days_until_expiry))
            .collect();

        assert_eq!(active, [("WELCOME100", 2), ("GOLD20", 2)]);

        Ok(())
    }

    #[test]
    fn summarize_empty_catalog() -> TestResult {
        let coupons: Vec<Coupon<'_>> = Vec::new();
        let summary = summarize(&coupons, ts("2025-06-01T00:00:00Z")?)?;

        assert_eq!(summary.total, 0);
        assert_eq!(summary.potential_max_savings, None);
        assert_eq!(summary.most_generous, None);

        Ok(())
    }

    #[test]
    fn report_active_coupon_timeline() -> TestResult {
        let coupons = catalog()?;
        let mega = coupons.find_coupon("MEGA").ok_or("missing coupon")?;

        let report = report(mega, ts("2026-01-11T00:00:00Z")?);

        assert_eq!(report.status, CouponStatus::Active);
        assert_eq!(report.total_duration_days, 31);
        assert_eq!(report.days_remaining, 21);
        assert_eq!(report.percentage_elapsed, Decimal::new(323, 1));
        assert_eq!(report.usage_limit(), None);

        Ok(())
    }

    #[test]
    fn report_clamps_elapsed_outside_window() -> TestResult {
        let coupons = catalog()?;
        let mega = coupons.find_coupon("MEGA").ok_or("missing coupon")?;

        let before = report(mega, ts("2025-06-01T00:00:00Z")?);
        let after = report(mega, ts("2026-06-01T00:00:00Z")?);

        assert_eq!(before.status, CouponStatus::Upcoming);
        assert_eq!(before.days_remaining, 0);
        assert_eq!(before.percentage_elapsed, Decimal::ZERO);

        assert_eq!(after.status, CouponStatus::Expired);
        assert_eq!(after.days_remaining, 0);
        assert_eq!(after.percentage_elapsed, Decimal::ONE_HUNDRED);

        Ok(())
    }

    #[test]
    fn days_ceil_rounds_partial_days_up() -> TestResult {
        let from = ts("2025-01-01T00:00:00Z")?;

        assert_eq!(days_ceil(from, ts("2025-01-01T00:00:00Z")?), 0);
        assert_eq!(days_ceil(from, ts("2025-01-01T00:00:01Z")?), 1);
        assert_eq!(days_ceil(from, ts("2025-01-03T00:00:00Z")?), 2);
        assert_eq!(days_ceil(ts("2025-01-03T12:00:00Z")?, from), -2);

        Ok(())
    }
}
