//! CLI configuration module

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use jiff::Timestamp;

use coupons::coupons::{CouponStatus, DiscountType};

use crate::config::logging::LoggingConfig;

pub(crate) mod logging;

/// Coupons CLI configuration
#[derive(Debug, Parser)]
#[command(
    name = "coupons",
    about = "Coupon eligibility, discounts and best-coupon selection",
    long_about = None
)]
pub struct CliConfig {
    /// Directory holding `catalogs/` and `requests/` fixtures
    #[arg(long, env = "COUPONS_FIXTURES", default_value = "./fixtures", global = true)]
    pub fixtures: PathBuf,

    /// Catalog fixture name
    #[arg(short, long, env = "COUPONS_CATALOG", default_value = "seed", global = true)]
    pub catalog: String,

    /// Evaluation time (RFC 3339); defaults to the current time
    #[arg(long, env = "COUPONS_NOW", global = true)]
    pub now: Option<Timestamp>,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// The evaluation time: `--now` if given, otherwise the current time.
    pub fn evaluation_time(&self) -> Timestamp {
        self.now.unwrap_or_else(Timestamp::now)
    }
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rank every applicable coupon for a request
    Best {
        /// Request fixture name
        request: String,
    },

    /// Apply a coupon to a request, recording usage in memory
    Apply {
        /// Request fixture name
        request: String,

        /// Coupon code (case-sensitive)
        code: String,

        /// Number of consecutive applications to attempt
        #[arg(long, default_value_t = 1)]
        times: u32,
    },

    /// List catalog coupons
    List {
        /// Only coupons with this status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        /// Only coupons of this discount type
        #[arg(long = "type", value_enum)]
        discount_type: Option<DiscountTypeArg>,

        /// Only coupons usable by this user tier
        #[arg(long)]
        tier: Option<String>,
    },

    /// Show a single coupon
    Show {
        /// Coupon code (case-sensitive)
        code: String,
    },

    /// Summarize the catalog
    Summary,

    /// Timeline report for a single coupon
    Report {
        /// Coupon code (case-sensitive)
        code: String,
    },
}

/// Coupon status filter.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StatusArg {
    /// Not yet started.
    Upcoming,

    /// Inside the validity window.
    Active,

    /// Past the end date.
    Expired,
}

impl From<StatusArg> for CouponStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Upcoming => CouponStatus::Upcoming,
            StatusArg::Active => CouponStatus::Active,
            StatusArg::Expired => CouponStatus::Expired,
        }
    }
}

/// Discount type filter.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DiscountTypeArg {
    /// Fixed amount off.
    Flat,

    /// Percentage of the cart value.
    Percent,
}

impl From<DiscountTypeArg> for DiscountType {
    fn from(discount_type: DiscountTypeArg) -> Self {
        match discount_type {
            DiscountTypeArg::Flat => DiscountType::Flat,
            DiscountTypeArg::Percent => DiscountType::Percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_best_with_explicit_time() -> TestResult {
        let config = CliConfig::try_parse_from([
            "coupons",
            "best",
            "gold_electronics",
            "--now",
            "2025-06-15T12:00:00Z",
        ])?;

        assert!(matches!(config.command, Command::Best { ref request } if request == "gold_electronics"));
        assert_eq!(
            config.evaluation_time(),
            "2025-06-15T12:00:00Z".parse::<Timestamp>()?
        );

        Ok(())
    }

    #[test]
    fn parses_list_filters() -> TestResult {
        let config = CliConfig::try_parse_from([
            "coupons", "list", "--status", "active", "--type", "percent", "--tier", "gold",
        ])?;

        assert!(
            matches!(config.command, Command::List { .. }),
            "expected list command, got {:?}",
            config.command
        );

        if let Command::List {
            status,
            discount_type,
            tier,
        } = config.command
        {
            assert_eq!(status.map(CouponStatus::from), Some(CouponStatus::Active));
            assert_eq!(
                discount_type.map(DiscountType::from),
                Some(DiscountType::Percent)
            );
            assert_eq!(tier.as_deref(), Some("gold"));
        }

        Ok(())
    }

    #[test]
    fn apply_defaults_to_one_attempt() -> TestResult {
        let config = CliConfig::try_parse_from(["coupons", "apply", "new_user", "WELCOME100"])?;

        assert!(matches!(config.command, Command::Apply { times: 1, .. }));

        Ok(())
    }

    #[test]
    fn rejects_malformed_time() {
        let result = CliConfig::try_parse_from(["coupons", "summary", "--now", "yesterday"]);

        assert!(result.is_err());
    }
}
