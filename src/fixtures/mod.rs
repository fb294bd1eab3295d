//! Fixtures
//!
//! YAML catalogs and evaluation requests read from `<base>/catalogs/<name>.yml` and
//! `<base>/requests/<name>.yml`.

use std::{fs, path::PathBuf};

use rusty_money::iso::{Currency, EUR, GBP, INR, USD};
use serde::Deserialize;
use thiserror::Error;
use tracing::{Span, warn};

use crate::{
    carts::{Cart, CartError, CartRecord},
    catalog::InMemoryCatalog,
    coupons::{Coupon, CouponRecord},
    users::{UserError, UserProfile, UserRecord},
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Invalid user profile
    #[error("Invalid user: {0}")]
    User(#[from] UserError),

    /// Invalid cart
    #[error("Invalid cart: {0}")]
    Cart(#[from] CartError),
}

/// Catalog fixture file.
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// ISO code of the currency every amount is expressed in.
    pub currency: String,

    /// Raw coupon definitions in catalog order.
    #[serde(default)]
    pub coupons: Vec<CouponRecord>,
}

/// Request fixture file: one user and one cart.
#[derive(Debug, Deserialize)]
pub struct RequestFixture {
    /// ISO code of the currency every amount is expressed in.
    pub currency: String,

    /// User profile.
    pub user: UserRecord,

    /// Cart; a missing cart is empty.
    #[serde(default)]
    pub cart: CartRecord,
}

/// A validated user and cart pair.
#[derive(Debug, Clone)]
pub struct Request<'a> {
    /// User profile.
    pub user: UserProfile<'a>,

    /// Cart.
    pub cart: Cart<'a>,
}

/// Fixture loader
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,
}

impl Fixture {
    /// Create a loader with the default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a loader with a custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load a catalog fixture by name.
    ///
    /// Coupons that fail validation or repeat an earlier code are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or names an unknown currency.
    #[tracing::instrument(
        name = "coupons.fixtures.load_catalog",
        skip(self),
        fields(coupon_count = tracing::field::Empty),
        err
    )]
    pub fn load_catalog(&self, name: &str) -> Result<InMemoryCatalog<'static>, FixtureError> {
        let file_path = self.base_path.join("catalogs").join(format!("{name}.yml"));
        let contents = fs::read_to_string(file_path)?;
        let catalog = parse_catalog(&contents)?;

        Span::current().record("coupon_count", catalog.len());

        Ok(catalog)
    }

    /// Load a request fixture by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the user or cart is invalid.
    pub fn load_request(&self, name: &str) -> Result<Request<'static>, FixtureError> {
        let file_path = self.base_path.join("requests").join(format!("{name}.yml"));
        let contents = fs::read_to_string(file_path)?;

        parse_request(&contents)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a YAML catalog.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or names an unknown currency.
pub fn parse_catalog(contents: &str) -> Result<InMemoryCatalog<'static>, FixtureError> {
    let fixture: CatalogFixture = serde_norway::from_str(contents)?;
    let currency = parse_currency(&fixture.currency)?;

    let mut catalog = InMemoryCatalog::new();

    for record in fixture.coupons {
        let code = record.code.clone().unwrap_or_default();

        let coupon = match Coupon::try_from_record(record, currency) {
            Ok(coupon) => coupon,
            Err(error) => {
                warn!(%code, %error, "skipped invalid coupon");
                continue;
            }
        };

        if let Err(error) = catalog.insert(coupon) {
            warn!(%code, %error, "skipped duplicate coupon");
        }
    }

    Ok(catalog)
}

/// Parse a YAML request.
///
/// # Errors
///
/// Returns an error if the YAML is malformed, names an unknown currency, or the user or
/// cart is invalid.
pub fn parse_request(contents: &str) -> Result<Request<'static>, FixtureError> {
    let fixture: RequestFixture = serde_norway::from_str(contents)?;
    let currency = parse_currency(&fixture.currency)?;

    Ok(Request {
        user: UserProfile::try_from_record(fixture.user, currency)?,
        cart: Cart::try_from_record(fixture.cart, currency)?,
    })
}

/// Resolve an ISO currency code.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for codes outside the supported set.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "INR" => Ok(INR),
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs, path::Path};

    use rusty_money::Money;
    use testresult::TestResult;

    use crate::catalog::CouponCatalog;

    use super::*;

    fn write_fixture(base: &Path, category: &str, name: &str, contents: &str) -> TestResult {
        let dir = base.join(category);

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    fn unique_base(label: &str) -> TestResult<PathBuf> {
        let unique = format!(
            "coupons-fixtures-{label}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)?
                .as_nanos()
        );

        Ok(env::temp_dir().join(unique))
    }

    #[test]
    fn fixture_loads_seed_catalog() -> TestResult {
        let catalog = Fixture::new().load_catalog("seed")?;

        assert_eq!(catalog.len(), 10);
        assert!(catalog.find_coupon("GOLD20").is_some());
        assert!(catalog.find_coupon("WELCOME100").is_some());

        Ok(())
    }

    #[test]
    fn fixture_loads_request() -> TestResult {
        let request = Fixture::new().load_request("gold_electronics")?;

        assert_eq!(request.user.tier(), Some("GOLD"));
        assert_eq!(request.cart.value(), Money::from_minor(120_000, INR));

        Ok(())
    }

    #[test]
    fn parse_catalog_skips_invalid_and_duplicate_coupons() -> TestResult {
        let catalog = parse_catalog(
            r"
currency: INR
coupons:
  - code: GOOD
    description: Flat 50 off
    discountType: FLAT
    discountValue: 50
    startDate: 2025-01-01
    endDate: 2025-12-31
  - code: BAD
    description: Broken
    discountType: BOGO
    discountValue: 50
    startDate: 2025-01-01
    endDate: 2025-12-31
  - code: GOOD
    description: Again
    discountType: FLAT
    discountValue: 10
    startDate: 2025-01-01
    endDate: 2025-12-31
",
        )?;

        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.find_coupon("GOOD").map(Coupon::description),
            Some("Flat 50 off")
        );

        Ok(())
    }

    #[test]
    fn parse_currency_rejects_unknown_codes() {
        let result = parse_currency("ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn load_catalog_reads_from_custom_base_path() -> TestResult {
        let base_path = unique_base("custom")?;

        write_fixture(
            &base_path,
            "catalogs",
            "tiny",
            "currency: GBP\ncoupons:\n  - code: TENOFF\n    description: Ten off\n    discountType: FLAT\n    discountValue: 10\n    startDate: 2025-01-01\n    endDate: 2025-02-01\n",
        )?;

        let catalog = Fixture::with_base_path(&base_path).load_catalog("tiny")?;

        assert_eq!(catalog.len(), 1);

        fs::remove_dir_all(base_path)?;

        Ok(())
    }

    #[test]
    fn load_catalog_missing_file_is_io_error() {
        let result = Fixture::with_base_path("./does-not-exist").load_catalog("seed");

        assert!(matches!(result, Err(FixtureError::Io(_))));
    }

    #[test]
    fn parse_request_rejects_invalid_cart() {
        let result = parse_request(
            "currency: INR\nuser:\n  userId: u-1\ncart:\n  items:\n    - unitPrice: -1\n      quantity: 1\n      category: books\n",
        );

        assert!(matches!(
            result,
            Err(FixtureError::Cart(CartError::NegativePrice(0)))
        ));
    }
}
