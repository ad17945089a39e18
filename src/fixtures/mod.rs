//! Fixtures
//!
//! Loads orders and payment methods from JSON or YAML documents. Both are
//! top-level arrays of records; the format is chosen from the file extension.

use std::{fs, path::Path};

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::{
    fixtures::{methods::PaymentMethodFixture, orders::OrderFixture},
    methods::{PaymentMethod, PaymentMethods},
    orders::Order,
};

pub mod methods;
pub mod orders;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// File extension is not a supported format
    #[error("Unsupported fixture format: {0}")]
    UnsupportedFormat(String),

    /// Negative order value or spending limit
    #[error("Invalid amount for {id}: {amount}")]
    InvalidAmount {
        /// Order or payment method id
        id: String,

        /// Rejected amount
        amount: Decimal,
    },

    /// Discount outside 0..=100 or not a whole number
    #[error("Invalid discount for {id}: {discount}")]
    InvalidDiscount {
        /// Payment method id
        id: String,

        /// Rejected discount as written in the fixture
        discount: String,
    },

    /// Two orders share an id
    #[error("Duplicate order id: {0}")]
    DuplicateOrder(String),

    /// Two payment methods share an id
    #[error("Duplicate payment method id: {0}")]
    DuplicateMethod(String),
}

/// Supported fixture document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureFormat {
    /// `.json`
    Json,

    /// `.yml` or `.yaml`
    Yaml,
}

impl FixtureFormat {
    /// Pick the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, FixtureError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yml" | "yaml") => Ok(Self::Yaml),
            _ => Err(FixtureError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn parse<T: DeserializeOwned>(self, contents: &str) -> Result<T, FixtureError> {
        match self {
            Self::Json => Ok(serde_json::from_str(contents)?),
            Self::Yaml => Ok(serde_norway::from_str(contents)?),
        }
    }
}

/// Load orders from a JSON or YAML file
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, if an order value is
/// negative, or if two orders share an id.
pub fn load_orders(path: impl AsRef<Path>) -> Result<Vec<Order>, FixtureError> {
    let path = path.as_ref();
    let format = FixtureFormat::from_path(path)?;
    let contents = fs::read_to_string(path)?;

    let orders = parse_orders(&contents, format)?;

    debug!(path = %path.display(), count = orders.len(), "loaded orders");

    Ok(orders)
}

/// Load payment methods from a JSON or YAML file
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, if a discount or
/// limit is out of range, or if two methods share an id.
pub fn load_payment_methods(path: impl AsRef<Path>) -> Result<PaymentMethods, FixtureError> {
    let path = path.as_ref();
    let format = FixtureFormat::from_path(path)?;
    let contents = fs::read_to_string(path)?;

    let methods = parse_payment_methods(&contents, format)?;

    debug!(path = %path.display(), count = methods.len(), "loaded payment methods");

    Ok(methods)
}

/// Parse orders from a document in the given format
///
/// # Errors
///
/// Returns an error if the document cannot be parsed, if an order value is
/// negative, or if two orders share an id.
pub fn parse_orders(contents: &str, format: FixtureFormat) -> Result<Vec<Order>, FixtureError> {
    let fixtures: Vec<OrderFixture> = format.parse(contents)?;
    let mut seen = FxHashSet::default();

    fixtures
        .into_iter()
        .map(|fixture| {
            if !seen.insert(fixture.id.clone()) {
                return Err(FixtureError::DuplicateOrder(fixture.id));
            }

            Order::try_from(fixture)
        })
        .collect()
}

/// Parse payment methods from a document in the given format
///
/// # Errors
///
/// Returns an error if the document cannot be parsed, if a discount or limit
/// is out of range, or if two methods share an id.
pub fn parse_payment_methods(
    contents: &str,
    format: FixtureFormat,
) -> Result<PaymentMethods, FixtureError> {
    let fixtures: Vec<PaymentMethodFixture> = format.parse(contents)?;
    let mut seen = FxHashSet::default();

    fixtures
        .into_iter()
        .map(|fixture| {
            if !seen.insert(fixture.id.clone()) {
                return Err(FixtureError::DuplicateMethod(fixture.id));
            }

            PaymentMethod::try_from(fixture)
        })
        .collect()
}
