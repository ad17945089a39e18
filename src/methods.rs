//! Payment Methods

use std::collections::BTreeMap;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use crate::money;

/// Identifier conventionally reserved for the loyalty points method.
pub const DEFAULT_POINTS_ID: &str = "PUNKTY";

new_key_type! {
    /// Payment Method Key
    pub struct PaymentMethodKey;
}

/// A card or points account an order can be charged to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMethod {
    id: String,
    discount: u8,
    limit: Decimal,
}

impl PaymentMethod {
    /// Creates a payment method granting `discount` percent off, up to `limit` in total spend.
    pub fn new(id: impl Into<String>, discount: u8, limit: Decimal) -> Self {
        Self {
            id: id.into(),
            discount,
            limit,
        }
    }

    /// Method identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Discount in whole percent points
    pub fn discount_points(&self) -> u8 {
        self.discount
    }

    /// Discount as a fractional percentage
    pub fn discount(&self) -> Percentage {
        money::percent(self.discount)
    }

    /// Maximum total amount that can be charged to this method
    pub fn limit(&self) -> Decimal {
        self.limit
    }

    /// Price of `value` when paid in full with this method.
    pub fn discounted(&self, value: Decimal) -> Decimal {
        money::apply_discount(value, self.discount())
    }
}

/// Payment methods ordered by id.
///
/// Iteration always follows ascending id order so searches that take the
/// first matching method are reproducible.
#[derive(Debug, Clone, Default)]
pub struct PaymentMethods {
    methods: SlotMap<PaymentMethodKey, PaymentMethod>,
    keys: FxHashMap<String, PaymentMethodKey>,
    ordered: Vec<PaymentMethodKey>,
}

impl PaymentMethods {
    /// Create an empty set of payment methods.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a method key by id.
    pub fn key(&self, id: &str) -> Option<PaymentMethodKey> {
        self.keys.get(id).copied()
    }

    /// Look up a method by key.
    pub fn get(&self, key: PaymentMethodKey) -> Option<&PaymentMethod> {
        self.methods.get(key)
    }

    /// Look up a method by id.
    pub fn by_id(&self, id: &str) -> Option<&PaymentMethod> {
        self.key(id).and_then(|key| self.get(key))
    }

    /// Iterate methods in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (PaymentMethodKey, &PaymentMethod)> {
        self.ordered
            .iter()
            .filter_map(|&key| self.methods.get(key).map(|method| (key, method)))
    }

    /// Number of methods.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Check if there are no methods.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

impl FromIterator<PaymentMethod> for PaymentMethods {
    /// Later methods replace earlier ones sharing the same id.
    fn from_iter<T: IntoIterator<Item = PaymentMethod>>(iter: T) -> Self {
        let by_id: BTreeMap<String, PaymentMethod> = iter
            .into_iter()
            .map(|method| (method.id.clone(), method))
            .collect();

        let mut methods = SlotMap::with_capacity_and_key(by_id.len());
        let mut keys = FxHashMap::default();
        let mut ordered = Vec::with_capacity(by_id.len());

        for (id, method) in by_id {
            let key = methods.insert(method);

            keys.insert(id, key);
            ordered.push(key);
        }

        Self {
            methods,
            keys,
            ordered,
        }
    }
}
