//! Tender CLI
//!
//! Reads orders and payment methods, allocates payments and prints how much
//! was spent with each method.

use std::{
    io::{self, Write},
    process::ExitCode,
    time::Instant,
};

use clap::Parser;
use humanize_duration::{Truncate, prelude::DurationExt};
use tender::{
    allocator::Allocator,
    config::{ConfigError, OutputFormat, TenderConfig},
    fixtures::{self, FixtureError},
    observability::{self, ObservabilityError},
    report::{Report, ReportError},
};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Observability(#[from] ObservabilityError),

    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

#[expect(clippy::print_stderr, reason = "Errors are reported to the user on stderr")]
fn main() -> ExitCode {
    let config = TenderConfig::parse();

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "allocation failed");
            eprintln!("{error}");

            ExitCode::FAILURE
        }
    }
}

fn run(config: &TenderConfig) -> Result<(), CliError> {
    config.validate()?;
    observability::init_subscriber(&config.logging)?;

    let currency = config.currency()?;
    let orders = fixtures::load_orders(&config.orders)?;
    let methods = fixtures::load_payment_methods(&config.payment_methods)?;

    if methods.key(&config.points_id).is_none() {
        warn!(points_id = %config.points_id, "points method not found, skipping points phases");
    }

    let start = Instant::now();
    let allocation = Allocator::new(config.points_id.as_str()).optimize(&orders, &methods);
    let elapsed = start.elapsed();

    info!(
        elapsed = %elapsed.human(Truncate::Nano),
        orders = orders.len(),
        methods = methods.len(),
        "allocation finished"
    );

    let report = Report::new(&allocation, &methods).with_currency(currency);
    let mut out = io::stdout().lock();

    match config.format {
        OutputFormat::Plain => report.write_plain(&mut out)?,
        OutputFormat::Table => report.write_table(&mut out)?,
    }

    out.flush().map_err(ReportError::from)?;

    Ok(())
}
