//! Command dispatch and table rendering.

use std::{io, ops::Range};

use anyhow::Result;
use jiff::Timestamp;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};

use coupons::{catalog::CatalogFilter, fixtures::Fixture};

use crate::config::{CliConfig, Command};

mod listing;
mod ranking;
mod reports;

/// Run the configured command, writing its output to `out`.
///
/// # Errors
///
/// Returns an error if a fixture cannot be loaded, a coupon is missing, or output fails.
pub fn run(config: &CliConfig, now: Timestamp, out: &mut impl io::Write) -> Result<()> {
    let fixture = Fixture::with_base_path(config.fixtures.clone());
    let catalog = fixture.load_catalog(&config.catalog)?;

    match &config.command {
        Command::Best { request } => {
            ranking::best(&catalog, &fixture.load_request(request)?, now, out)
        }
        Command::Apply {
            request,
            code,
            times,
        } => ranking::apply_repeatedly(
            &catalog,
            &fixture.load_request(request)?,
            code,
            *times,
            now,
            out,
        ),
        Command::List {
            status,
            discount_type,
            tier,
        } => {
            let filter = CatalogFilter {
                status: status.map(Into::into),
                discount_type: discount_type.map(Into::into),
                user_tier: tier.clone(),
            };

            listing::list(&catalog, &filter, now, out)
        }
        Command::Show { code } => listing::show(&catalog, code, now, out),
        Command::Summary => reports::summary(&catalog, now, out),
        Command::Report { code } => reports::report(&catalog, code, now, out),
    }
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    right_aligned: Option<Range<usize>>,
) -> io::Result<()> {
    let mut table = builder.build();

    table.with(Theme::from(Style::modern_rounded()));
    table.modify(Rows::first(), Color::BOLD);

    if let Some(columns) = right_aligned {
        table.modify(Columns::new(columns), Alignment::right());
    }

    writeln!(out, "\n{table}")
}

fn field_table(rows: impl IntoIterator<Item = (&'static str, String)>) -> Builder {
    let mut builder = Builder::default();

    builder.push_record(["Field", "Value"]);

    for (field, value) in rows {
        builder.push_record([field.to_string(), value]);
    }

    builder
}

fn limit_label(limit: Option<u32>) -> String {
    limit.map_or_else(|| "unlimited".to_string(), |limit| limit.to_string())
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use std::path::PathBuf;

    use jiff::Timestamp;
    use testresult::TestResult;

    use coupons::{catalog::InMemoryCatalog, fixtures::Fixture};

    pub(crate) fn fixture() -> Fixture {
        Fixture::with_base_path(
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures"),
        )
    }

    pub(crate) fn seed() -> TestResult<InMemoryCatalog<'static>> {
        Ok(fixture().load_catalog("seed")?)
    }

    pub(crate) fn mid_june() -> Result<Timestamp, jiff::Error> {
        "2025-06-15T12:00:00Z".parse()
    }

    pub(crate) fn render(
        write: impl FnOnce(&mut Vec<u8>) -> anyhow::Result<()>,
    ) -> TestResult<String> {
        let mut out = Vec::new();

        write(&mut out)?;

        Ok(String::from_utf8(out)?)
    }
}
