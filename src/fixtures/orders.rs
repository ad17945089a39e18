//! Order Fixtures

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{fixtures::FixtureError, money, orders::Order};

/// Order record as written in a fixture file
#[derive(Debug, Deserialize)]
pub struct OrderFixture {
    /// Order id
    pub id: String,

    /// Order value, as a string or a number
    pub value: Decimal,

    /// Payment method ids eligible for a discount; may be missing or null
    #[serde(default)]
    pub promotions: Option<Vec<String>>,
}

impl TryFrom<OrderFixture> for Order {
    type Error = FixtureError;

    fn try_from(fixture: OrderFixture) -> Result<Self, Self::Error> {
        if fixture.value.is_sign_negative() && !fixture.value.is_zero() {
            return Err(FixtureError::InvalidAmount {
                id: fixture.id,
                amount: fixture.value,
            });
        }

        Ok(Order::with_promotions(
            fixture.id,
            money::round(fixture.value),
            fixture.promotions.unwrap_or_default(),
        ))
    }
}
