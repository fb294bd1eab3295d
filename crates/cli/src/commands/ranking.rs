//! `best` and `apply` commands.

use std::io;

use anyhow::Result;
use jiff::Timestamp;
use tabled::builder::Builder;
use tracing::info;

use coupons::{
    catalog::InMemoryCatalog,
    fixtures::Request,
    selection::{apply, select_best},
    usage::UsageTracker,
};

use super::{limit_label, write_table};

/// Rank every applicable coupon for the request.
pub(super) fn best<'a>(
    catalog: &InMemoryCatalog<'a>,
    request: &Request<'a>,
    now: Timestamp,
    out: &mut impl io::Write,
) -> Result<()> {
    let selection = select_best(
        catalog,
        &UsageTracker::new(),
        &request.user,
        &request.cart,
        now,
    );

    writeln!(
        out,
        "User {} · cart value {} · {} applicable",
        request.user.id(),
        selection.cart_value(),
        selection.eligible_count()
    )?;

    let Some(top) = selection.best() else {
        writeln!(out, "No applicable coupons")?;

        return Ok(());
    };

    let mut builder = Builder::default();

    builder.push_record(["#", "Code", "Description", "Discount", "Savings"]);

    for (rank, ranked) in selection.ranked().iter().enumerate() {
        builder.push_record([
            (rank + 1).to_string(),
            ranked.coupon().code().to_string(),
            ranked.coupon().description().to_string(),
            ranked.discount().to_string(),
            format!("{}%", ranked.savings_percentage()),
        ]);
    }

    write_table(out, builder, Some(3..5))?;

    writeln!(
        out,
        "Best: {} saves {} ({}%)",
        top.coupon().code(),
        top.discount(),
        top.savings_percentage()
    )?;

    Ok(())
}

/// Apply `code` up to `times` times against a fresh usage tracker.
///
/// Rejected attempts are reported in the table rather than failing the command.
pub(super) fn apply_repeatedly<'a>(
    catalog: &InMemoryCatalog<'a>,
    request: &Request<'a>,
    code: &str,
    times: u32,
    now: Timestamp,
    out: &mut impl io::Write,
) -> Result<()> {
    let mut usage = UsageTracker::new();
    let mut builder = Builder::default();
    let mut applied = 0_u32;

    builder.push_record(["Attempt", "Outcome", "Discount", "Final", "Uses left"]);

    for attempt in 1..=times {
        match apply(
            catalog,
            &mut usage,
            &request.user,
            &request.cart,
            code,
            now,
        ) {
            Ok(application) => {
                applied += 1;

                builder.push_record([
                    attempt.to_string(),
                    "applied".to_string(),
                    application.discount().to_string(),
                    application.final_amount().to_string(),
                    limit_label(application.remaining_uses()),
                ]);
            }
            Err(error) => {
                builder.push_record([
                    attempt.to_string(),
                    error.to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                ]);
            }
        }
    }

    info!(code, attempts = times, applied, "finished applying coupon");

    write_table(out, builder, Some(2..5))?;

    writeln!(out, "{applied} of {times} attempts applied")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::{
        super::test_helpers::{fixture, mid_june, render, seed},
        *,
    };

    #[test]
    fn best_lists_ranked_coupons_in_order() -> TestResult {
        let catalog = seed()?;
        let request = fixture().load_request("bulk_fashion")?;
        let now = mid_june()?;

        let rendered = render(|out| best(&catalog, &request, now, out))?;

        let positions: Vec<_> = ["BIGSPENDER", "FASHION25", "ELECTRONICS15", "SAVE5"]
            .iter()
            .map(|code| rendered.find(code))
            .collect();

        assert!(
            positions.iter().all(Option::is_some),
            "missing codes in:\n{rendered}"
        );
        assert!(
            positions.is_sorted(),
            "codes out of order in:\n{rendered}"
        );
        assert!(rendered.contains("Best: BIGSPENDER"), "{rendered}");
        assert!(rendered.contains("6 applicable"), "{rendered}");

        Ok(())
    }

    #[test]
    fn best_reports_empty_cart() -> TestResult {
        let catalog = seed()?;
        let request = fixture().load_request("empty_cart")?;
        let now = mid_june()?;

        let rendered = render(|out| best(&catalog, &request, now, out))?;

        assert!(rendered.contains("No applicable coupons"), "{rendered}");
        assert!(rendered.contains("0 applicable"), "{rendered}");

        Ok(())
    }

    #[test]
    fn apply_repeatedly_stops_at_usage_limit() -> TestResult {
        let catalog = seed()?;
        let request = fixture().load_request("new_user")?;
        let now = mid_june()?;

        let rendered = render(|out| {
            apply_repeatedly(&catalog, &request, "WELCOME100", 2, now, out)
        })?;

        assert!(rendered.contains("applied"), "{rendered}");
        assert!(rendered.contains("usage limit"), "{rendered}");
        assert!(rendered.contains("1 of 2 attempts applied"), "{rendered}");

        Ok(())
    }

    #[test]
    fn apply_repeatedly_reports_unknown_code() -> TestResult {
        let catalog = seed()?;
        let request = fixture().load_request("new_user")?;
        let now = mid_june()?;

        let rendered = render(|out| apply_repeatedly(&catalog, &request, "NOPE", 1, now, out))?;

        assert!(rendered.contains("NOPE"), "{rendered}");
        assert!(rendered.contains("0 of 1 attempts applied"), "{rendered}");

        Ok(())
    }
}
