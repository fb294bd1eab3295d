//! Coupons CLI
//!
//! Loads a YAML coupon catalog and request fixtures, then ranks, applies, lists or reports
//! on coupons at a chosen evaluation time.

use std::io;

use anyhow::Result;
use tracing::debug;

use crate::config::CliConfig;

mod commands;
mod config;
mod observability;

/// Coupons CLI entry point
///
/// # Errors
///
/// Returns an error if logging cannot be initialized or the command fails.
pub fn main() -> Result<()> {
    let config = match CliConfig::load() {
        Ok(config) => config,
        Err(error) => error.exit(),
    };

    observability::init_subscriber(&config.logging)?;

    let now = config.evaluation_time();

    debug!(%now, catalog = %config.catalog, "evaluating");

    let mut out = io::stdout().lock();

    commands::run(&config, now, &mut out)
}
