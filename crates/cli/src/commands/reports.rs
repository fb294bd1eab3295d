//! `summary` and `report` commands.

use std::io;

use anyhow::Result;
use jiff::Timestamp;
use tabled::builder::Builder;

use coupons::{
    analytics::{report as coupon_report, summarize},
    catalog::{CatalogError, CouponCatalog, InMemoryCatalog},
};

use super::{field_table, limit_label, write_table};

pub(super) fn summary(
    catalog: &InMemoryCatalog<'_>,
    now: Timestamp,
    out: &mut impl io::Write,
) -> Result<()> {
    let summary = summarize(catalog, now)?;

    let overview = field_table([
        ("Total", summary.total.to_string()),
        ("Active", summary.active.to_string()),
        ("Upcoming", summary.upcoming.to_string()),
        ("Expired", summary.expired.to_string()),
        ("Flat", summary.flat.to_string()),
        ("Percent", summary.percent.to_string()),
        ("Any tier", summary.unrestricted_tiers.to_string()),
        (
            "Potential max savings",
            summary
                .potential_max_savings
                .map_or_else(|| "-".to_string(), |amount| amount.to_string()),
        ),
        (
            "Most generous",
            summary
                .most_generous
                .map_or_else(|| "-".to_string(), |coupon| coupon.code().to_string()),
        ),
    ]);

    write_table(out, overview, Some(1..2))?;

    if !summary.tier_distribution.is_empty() {
        write_table(
            out,
            counts_table("Tier", &summary.tier_distribution),
            Some(1..2),
        )?;
    }

    if !summary.category_counts.is_empty() {
        write_table(
            out,
            counts_table("Category", &summary.category_counts),
            Some(1..2),
        )?;
    }

    if !summary.active_coupons.is_empty() {
        let mut builder = Builder::default();

        builder.push_record(["Active coupon", "Days left"]);

        for active in &summary.active_coupons {
            builder.push_record([
                active.coupon.code().to_string(),
                active.days_until_expiry.to_string(),
            ]);
        }

        write_table(out, builder, Some(1..2))?;
    }

    Ok(())
}

pub(super) fn report(
    catalog: &InMemoryCatalog<'_>,
    code: &str,
    now: Timestamp,
    out: &mut impl io::Write,
) -> Result<()> {
    let coupon = catalog
        .find_coupon(code)
        .ok_or_else(|| CatalogError::NotFound(code.to_string()))?;

    let report = coupon_report(coupon, now);

    let table = field_table([
        ("Code", report.coupon.code().to_string()),
        ("Status", report.status.to_string()),
        ("Discount", report.coupon.discount().to_string()),
        ("Days remaining", report.days_remaining.to_string()),
        ("Duration (days)", report.total_duration_days.to_string()),
        ("Elapsed", format!("{}%", report.percentage_elapsed)),
        ("Uses per user", limit_label(report.usage_limit())),
    ]);

    write_table(out, table, None)?;

    Ok(())
}

fn counts_table(label: &str, counts: &[(String, usize)]) -> Builder {
    let mut builder = Builder::default();

    builder.push_record([label, "Coupons"]);

    for (name, count) in counts {
        builder.push_record([name.clone(), count.to_string()]);
    }

    builder
}
