//! Orders

use rust_decimal::Decimal;
use smallvec::SmallVec;

/// Promotion ids attached to a single order.
pub type PromotionIds = SmallVec<[String; 4]>;

/// A customer order waiting to be paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: String,
    value: Decimal,
    promotions: PromotionIds,
}

impl Order {
    /// Creates an order without any eligible promotions.
    pub fn new(id: impl Into<String>, value: Decimal) -> Self {
        Self {
            id: id.into(),
            value,
            promotions: SmallVec::new(),
        }
    }

    /// Creates an order eligible for the given promotion ids.
    ///
    /// The ids are kept in the given order; it breaks ties between equally
    /// cheap promotional cards.
    pub fn with_promotions<I, S>(id: impl Into<String>, value: Decimal, promotions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            value,
            promotions: promotions.into_iter().map(Into::into).collect(),
        }
    }

    /// Order identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Undiscounted order value
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Payment method ids that grant a discount on this order
    pub fn promotions(&self) -> &[String] {
        &self.promotions
    }
}
