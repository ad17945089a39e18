//! Payment Method Fixtures

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{fixtures::FixtureError, methods::PaymentMethod, money};

/// Payment method record as written in a fixture file
#[derive(Debug, Deserialize)]
pub struct PaymentMethodFixture {
    /// Payment method id
    pub id: String,

    /// Discount in whole percent points, as a string or a number
    pub discount: DiscountFixture,

    /// Spending limit, as a string or a number
    pub limit: Decimal,
}

/// Discount written either as a number or as a string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DiscountFixture {
    /// `"discount": 10`
    Number(i64),

    /// `"discount": "10"`
    Text(String),
}

impl DiscountFixture {
    /// Parse into whole percent points in `0..=100`.
    fn points(&self) -> Option<u8> {
        let points = match self {
            Self::Number(points) => *points,
            Self::Text(text) => text.trim().parse().ok()?,
        };

        u8::try_from(points).ok().filter(|points| *points <= 100)
    }

    fn as_written(&self) -> String {
        match self {
            Self::Number(points) => points.to_string(),
            Self::Text(text) => text.clone(),
        }
    }
}

impl TryFrom<PaymentMethodFixture> for PaymentMethod {
    type Error = FixtureError;

    fn try_from(fixture: PaymentMethodFixture) -> Result<Self, Self::Error> {
        let Some(discount) = fixture.discount.points() else {
            return Err(FixtureError::InvalidDiscount {
                discount: fixture.discount.as_written(),
                id: fixture.id,
            });
        };

        if fixture.limit.is_sign_negative() && !fixture.limit.is_zero() {
            return Err(FixtureError::InvalidAmount {
                id: fixture.id,
                amount: fixture.limit,
            });
        }

        Ok(PaymentMethod::new(
            fixture.id,
            discount,
            money::round(fixture.limit),
        ))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn parse(json: &str) -> Result<PaymentMethod, Box<dyn std::error::Error>> {
        let fixture: PaymentMethodFixture = serde_json::from_str(json)?;

        Ok(PaymentMethod::try_from(fixture)?)
    }

    #[test]
    fn accepts_string_and_numeric_fields() -> TestResult {
        let text = parse(r#"{"id": "A", "discount": "15", "limit": "100.00"}"#)?;
        let number = parse(r#"{"id": "B", "discount": 15, "limit": 100}"#)?;

        assert_eq!(text.discount_points(), 15);
        assert_eq!(number.discount_points(), 15);
        assert_eq!(text.limit(), number.limit());
        assert_eq!(number.limit().to_string(), "100.00");

        Ok(())
    }

    #[test]
    fn rejects_out_of_range_discounts() {
        for json in [
            r#"{"id": "A", "discount": 101, "limit": 1}"#,
            r#"{"id": "A", "discount": -1, "limit": 1}"#,
            r#"{"id": "A", "discount": "ten", "limit": 1}"#,
            r#"{"id": "A", "discount": "7.5", "limit": 1}"#,
        ] {
            let result = parse(json);

            assert!(
                result
                    .as_ref()
                    .is_err_and(|err| err.to_string().starts_with("Invalid discount for A")),
                "{json} should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn rejects_negative_limit() {
        let result = parse(r#"{"id": "A", "discount": 5, "limit": "-0.01"}"#);

        assert!(
            result
                .as_ref()
                .is_err_and(|err| err.to_string().starts_with("Invalid amount for A")),
            "negative limit should be rejected, got {result:?}"
        );
    }
}
