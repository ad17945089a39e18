//! Command line configuration

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use rusty_money::iso::{self, Currency};
use thiserror::Error;

use crate::methods::DEFAULT_POINTS_ID;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Currency code is not an ISO 4217 currency
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Points method id is blank
    #[error("Points method id cannot be empty")]
    EmptyPointsId,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One `<method> <amount>` line per payment method.
    Plain,

    /// Tables of totals and charges with a summary.
    Table,
}

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Tender configuration
#[derive(Debug, Parser)]
#[command(
    name = "tender",
    about = "Allocate orders to payment methods for the largest discount",
    long_about = None
)]
pub struct TenderConfig {
    /// Orders file (.json, .yml or .yaml)
    pub orders: PathBuf,

    /// Payment methods file (.json, .yml or .yaml)
    pub payment_methods: PathBuf,

    /// Id of the loyalty points payment method
    #[arg(long, env = "TENDER_POINTS_ID", default_value = DEFAULT_POINTS_ID)]
    pub points_id: String,

    /// Report format (plain, table)
    #[arg(short, long, env = "TENDER_FORMAT", value_enum, default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,

    /// ISO 4217 currency used to format amounts in tables
    #[arg(long, env = "TENDER_CURRENCY", default_value = "PLN")]
    pub currency: String,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl TenderConfig {
    /// Check settings clap cannot validate on its own.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the points id is blank or the currency is unknown.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.points_id.trim().is_empty() {
            return Err(ConfigError::EmptyPointsId);
        }

        self.currency().map(|_| ())
    }

    /// Resolve the configured currency code.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] if the code is not an ISO 4217 currency.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        let code = self.currency.trim().to_ascii_uppercase();

        iso::find(&code).ok_or(ConfigError::UnknownCurrency(code))
    }
}
