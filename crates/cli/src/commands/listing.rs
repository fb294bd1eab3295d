//! `list` and `show` commands.

use std::io;

use anyhow::Result;
use jiff::Timestamp;
use tabled::builder::Builder;

use coupons::catalog::{CatalogError, CatalogFilter, CouponCatalog, InMemoryCatalog};

use super::{field_table, limit_label, write_table};

pub(super) fn list(
    catalog: &InMemoryCatalog<'_>,
    filter: &CatalogFilter,
    now: Timestamp,
    out: &mut impl io::Write,
) -> Result<()> {
    let coupons = catalog.list(filter, now);

    if coupons.is_empty() {
        writeln!(out, "No coupons match")?;

        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["Code", "Description", "Type", "Discount", "Status", "Ends"]);

    for coupon in &coupons {
        builder.push_record([
            coupon.code().to_string(),
            coupon.description().to_string(),
            coupon.discount_type().to_string(),
            coupon.discount().to_string(),
            coupon.status_at(now).to_string(),
            coupon.ends_at().to_string(),
        ]);
    }

    write_table(out, builder, None)?;

    writeln!(out, "{} of {} coupons", coupons.len(), catalog.len())?;

    Ok(())
}

pub(super) fn show(
    catalog: &InMemoryCatalog<'_>,
    code: &str,
    now: Timestamp,
    out: &mut impl io::Write,
) -> Result<()> {
    let coupon = catalog
        .find_coupon(code)
        .ok_or_else(|| CatalogError::NotFound(code.to_string()))?;

    let mut rows = vec![
        ("Code", coupon.code().to_string()),
        ("Description", coupon.description().to_string()),
        ("Discount", coupon.discount().to_string()),
        ("Status", coupon.status_at(now).to_string()),
        ("Starts", coupon.starts_at().to_string()),
        ("Ends", coupon.ends_at().to_string()),
        ("Uses per user", limit_label(coupon.usage_limit_per_user())),
    ];

    if coupon.eligibility().is_unrestricted() {
        rows.push(("Restriction", "none".to_string()));
    }

    for restriction in coupon.eligibility().restrictions() {
        rows.push(("Restriction", restriction.to_string()));
    }

    write_table(out, field_table(rows), None)?;

    Ok(())
}
