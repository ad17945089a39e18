//! Allocator
//!
//! Assigns every order to one or more payment methods, preferring the
//! assignment that saves the most, while keeping each method within its
//! spending limit.
//!
//! The allocator is a greedy heuristic run in fixed phases. Each phase takes
//! the orders the previous one could not place:
//!
//! 1. **Promotional cards.** Orders are ranked by the largest saving any of
//!    their promotional cards could grant, then each is paid in full with the
//!    cheapest promotional card whose balance covers it.
//! 2. **Points.** Remaining orders are paid entirely from the points method at
//!    its discount, while the points balance lasts.
//! 3. **Mixed payment.** Remaining orders are split: up to 90% of the order
//!    value comes from points (provided at least 10% is available) and the rest
//!    from the first other method that covers it. Failing that, the order goes
//!    back to the best promotional card, and finally to any method that covers
//!    the full undiscounted value. Orders nothing can pay are left unpaid.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, info, info_span, warn};

use crate::{
    methods::{DEFAULT_POINTS_ID, PaymentMethod, PaymentMethodKey, PaymentMethods},
    money,
    orders::Order,
};

use self::{
    ledger::Ledger,
    observer::{AllocationObserver, NoopObserver},
    search::{find_best_card, find_fallback, max_card_savings},
};

pub mod ledger;
pub mod observer;
mod search;

/// Share of a mixed payment that must be available in points, in percent points.
pub const MIXED_POINTS_THRESHOLD: u8 = 10;

/// Share of the order value charged by a mixed payment, in percent points.
pub const MIXED_PAYMENT_SHARE: u8 = 90;

/// Allocation phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Full payment with the best promotional card
    PromoCard,

    /// Full payment from the points method
    FullPoints,

    /// Points plus another method, with card and full-price escapes
    Mixed,
}

/// How a charge came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeKind {
    /// Discounted order paid in full with a promotional card
    PromoCard,

    /// Discounted order paid in full from points
    FullPoints,

    /// Points portion of a mixed payment
    MixedPoints,

    /// Non-points remainder of a mixed payment
    MixedRemainder,

    /// Promotional card used after a mixed payment was not possible
    EscapeCard,

    /// Undiscounted order paid with any method that covers it
    FullPrice,
}

/// A single amount committed to a payment method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charge {
    /// Order being paid
    pub order_id: String,

    /// Method charged
    pub method_id: String,

    /// Amount charged
    pub amount: Decimal,

    /// How the charge came about
    pub kind: ChargeKind,
}

/// Outcome of an allocation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    spent: BTreeMap<String, Decimal>,
    charges: Vec<Charge>,
    unpaid: Vec<String>,
    paid_value: Option<Decimal>,
}

impl Allocation {
    /// Total charged to each payment method, keyed by method id.
    ///
    /// Every method passed to the allocator is present, including those
    /// that were never charged.
    pub fn spent(&self) -> &BTreeMap<String, Decimal> {
        &self.spent
    }

    /// Total charged to a single payment method.
    pub fn spent_for(&self, method_id: &str) -> Option<Decimal> {
        self.spent.get(method_id).copied()
    }

    /// Charges in the order they were committed.
    pub fn charges(&self) -> &[Charge] {
        &self.charges
    }

    /// Charges that paid the given order.
    pub fn charges_for_order<'a>(&'a self, order_id: &'a str) -> impl Iterator<Item = &'a Charge> {
        self.charges
            .iter()
            .filter(move |charge| charge.order_id == order_id)
    }

    /// Ids of orders no phase could pay.
    pub fn unpaid(&self) -> &[String] {
        &self.unpaid
    }

    /// Sum of all charges, or `None` if it does not fit in a [`Decimal`].
    pub fn total_charged(&self) -> Option<Decimal> {
        self.spent
            .values()
            .try_fold(Decimal::ZERO, |total, spent| total.checked_add(*spent))
            .map(money::round)
    }

    /// Undiscounted value of every order that was paid, or `None` if it does
    /// not fit in a [`Decimal`].
    pub fn paid_value(&self) -> Option<Decimal> {
        self.paid_value
    }

    /// Difference between the undiscounted value of paid orders and what was charged for them.
    ///
    /// `None` when either total overflows.
    pub fn discount_granted(&self) -> Option<Decimal> {
        self.paid_value?
            .checked_sub(self.total_charged()?)
            .map(money::round)
    }

    /// Consume the allocation, keeping only the per-method totals.
    pub fn into_spent(self) -> BTreeMap<String, Decimal> {
        self.spent
    }
}

/// Greedy payment allocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocator {
    points_id: String,
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new(DEFAULT_POINTS_ID)
    }
}

impl Allocator {
    /// Create an allocator treating `points_id` as the points method.
    pub fn new(points_id: impl Into<String>) -> Self {
        Self {
            points_id: points_id.into(),
        }
    }

    /// Id of the points method.
    pub fn points_id(&self) -> &str {
        &self.points_id
    }

    /// Allocate orders to payment methods.
    ///
    /// Inputs are never rejected: unknown promotion ids are ignored, a missing
    /// points method disables the points phases, and orders that cannot be paid
    /// are reported in [`Allocation::unpaid`] without contributing to any total.
    pub fn optimize(&self, orders: &[Order], methods: &PaymentMethods) -> Allocation {
        self.optimize_with_observer(orders, methods, &mut NoopObserver)
    }

    /// Allocate orders to payment methods, reporting progress to an observer.
    pub fn optimize_with_observer<O: AllocationObserver + ?Sized>(
        &self,
        orders: &[Order],
        methods: &PaymentMethods,
        observer: &mut O,
    ) -> Allocation {
        let span = info_span!("allocate", orders = orders.len(), methods = methods.len());
        let _entered = span.enter();

        let points = methods.key(&self.points_id);

        if points.is_none() {
            debug!(points_id = %self.points_id, "points method not present; points phases disabled");
        }

        let mut run = Run::new(methods, points, observer);

        let deferred = run.promo_cards(orders);
        let deferred = run.full_points(deferred);
        run.mixed(deferred);

        let allocation = run.finish();

        info!(
            charged = ?allocation.total_charged(),
            discount = ?allocation.discount_granted(),
            unpaid = allocation.unpaid.len(),
            "allocation complete"
        );

        allocation
    }
}

/// State for a single allocation run.
struct Run<'a, O: AllocationObserver + ?Sized> {
    methods: &'a PaymentMethods,
    points: Option<PaymentMethodKey>,
    ledger: Ledger,
    observer: &'a mut O,
    charges: Vec<Charge>,
    unpaid: Vec<String>,
    paid_value: Option<Decimal>,
}

impl<'a, O: AllocationObserver + ?Sized> Run<'a, O> {
    fn new(
        methods: &'a PaymentMethods,
        points: Option<PaymentMethodKey>,
        observer: &'a mut O,
    ) -> Self {
        Self {
            methods,
            points,
            ledger: Ledger::open(methods),
            observer,
            charges: Vec::new(),
            unpaid: Vec::new(),
            paid_value: Some(Decimal::ZERO),
        }
    }

    fn points_method(&self) -> Option<(PaymentMethodKey, &'a PaymentMethod)> {
        let key = self.points?;

        self.methods.get(key).map(|method| (key, method))
    }

    /// Pay orders in full with their best promotional card, highest potential saving first.
    fn promo_cards<'o>(&mut self, orders: &'o [Order]) -> Vec<&'o Order> {
        let mut ranked: Vec<(Decimal, &'o Order)> = orders
            .iter()
            .map(|order| (max_card_savings(order, self.methods), order))
            .collect();

        // Stable, so equal savings keep their input order.
        ranked.sort_by(|(a, _), (b, _)| b.cmp(a));

        self.observer.on_phase_start(Phase::PromoCard, ranked.len());

        let mut deferred = Vec::new();

        for (_, order) in ranked {
            if let Some((key, cost)) = find_best_card(order, self.methods, &self.ledger) {
                self.commit(order, key, cost, ChargeKind::PromoCard);
                self.settle(order);
            } else {
                debug!(order = order.id(), "no promotional card covers order");
                deferred.push(order);
            }
        }

        deferred
    }

    /// Pay orders in full from points at the points discount.
    fn full_points<'o>(&mut self, pending: Vec<&'o Order>) -> Vec<&'o Order> {
        self.observer.on_phase_start(Phase::FullPoints, pending.len());

        let Some((points, method)) = self.points_method() else {
            return pending;
        };

        let mut deferred = Vec::new();

        for order in pending {
            let cost = method.discounted(order.value());

            if self.ledger.covers(points, cost) {
                self.commit(order, points, cost, ChargeKind::FullPoints);
                self.settle(order);
            } else {
                debug!(order = order.id(), %cost, "points balance does not cover order");
                deferred.push(order);
            }
        }

        deferred
    }

    /// Split orders between points and another method, or fall back to a single method.
    fn mixed(&mut self, pending: Vec<&Order>) {
        self.observer.on_phase_start(Phase::Mixed, pending.len());

        for order in pending {
            if self.try_split(order) || self.try_escape(order) {
                self.settle(order);
            } else {
                warn!(order = order.id(), value = %order.value(), "order left unpaid");

                self.observer.on_unpaid(order);
                self.unpaid.push(order.id().to_string());
            }
        }
    }

    /// Points for up to 90% of the order value, the rest from the first method that covers it.
    ///
    /// The split is taken from the raw order value, independent of the points discount.
    fn try_split(&mut self, order: &Order) -> bool {
        let Some(points) = self.points else {
            return false;
        };

        let threshold = money::percent_of(order.value(), money::percent(MIXED_POINTS_THRESHOLD));
        let payable = money::percent_of(order.value(), money::percent(MIXED_PAYMENT_SHARE));
        let available = self.ledger.balance(points);

        if available < threshold {
            return false;
        }

        let from_points = available.min(payable);
        let remainder = payable - from_points;

        let Some(fallback) = find_fallback(remainder, self.methods, &self.ledger, Some(points))
        else {
            debug!(order = order.id(), %remainder, "no method covers mixed payment remainder");
            return false;
        };

        self.commit(order, points, from_points, ChargeKind::MixedPoints);
        self.commit(order, fallback, remainder, ChargeKind::MixedRemainder);

        true
    }

    /// Best promotional card at current balances, then any method at full price.
    fn try_escape(&mut self, order: &Order) -> bool {
        if let Some((key, cost)) = find_best_card(order, self.methods, &self.ledger) {
            self.commit(order, key, cost, ChargeKind::EscapeCard);
            return true;
        }

        if let Some(key) = find_fallback(order.value(), self.methods, &self.ledger, self.points) {
            self.commit(order, key, order.value(), ChargeKind::FullPrice);
            return true;
        }

        false
    }

    fn commit(&mut self, order: &Order, key: PaymentMethodKey, amount: Decimal, kind: ChargeKind) {
        let Some(method) = self.methods.get(key) else {
            return;
        };

        let Some(account) = self.ledger.charge(key, amount) else {
            return;
        };

        debug!(
            order = order.id(),
            method = method.id(),
            %amount,
            balance = %account.balance(),
            ?kind,
            "charged"
        );

        let charge = Charge {
            order_id: order.id().to_string(),
            method_id: method.id().to_string(),
            amount,
            kind,
        };

        self.observer.on_charge(&charge, account);
        self.charges.push(charge);
    }

    fn settle(&mut self, order: &Order) {
        self.paid_value = self
            .paid_value
            .and_then(|paid| paid.checked_add(order.value()));
    }

    fn finish(self) -> Allocation {
        let spent = self
            .ledger
            .spent_by_id(self.methods)
            .into_iter()
            .map(|(id, spent)| (id, money::round(spent)))
            .collect();

        Allocation {
            spent,
            charges: self.charges,
            unpaid: self.unpaid,
            paid_value: self.paid_value.map(money::round),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use testresult::TestResult;

    use super::*;

    fn dec(s: &str) -> Result<Decimal, rust_decimal::Error> {
        Decimal::from_str(s)
    }

    fn methods(list: &[(&str, u8, &str)]) -> Result<PaymentMethods, rust_decimal::Error> {
        list.iter()
            .map(|&(id, discount, limit)| {
                dec(limit).map(|limit| PaymentMethod::new(id, discount, limit))
            })
            .collect()
    }

    #[test]
    fn every_method_appears_in_the_result() -> TestResult {
        let methods = methods(&[("PUNKTY", 10, "10.00"), ("CARD", 0, "10.00"), ("IDLE", 0, "0")])?;

        let allocation = Allocator::default().optimize(&[], &methods);

        assert_eq!(allocation.spent().len(), 3);
        assert_eq!(allocation.spent_for("IDLE"), Some(Decimal::ZERO));
        assert!(allocation.charges().is_empty());

        Ok(())
    }

    #[test]
    fn exact_balance_is_accepted_by_promo_card() -> TestResult {
        let methods = methods(&[("CARD", 10, "90.00")])?;
        let orders = [Order::with_promotions("O1", dec("100.00")?, ["CARD"])];

        let allocation = Allocator::default().optimize(&orders, &methods);

        assert_eq!(allocation.spent_for("CARD"), Some(dec("90.00")?));
        assert!(allocation.unpaid().is_empty());

        Ok(())
    }

    #[test]
    fn exact_balance_is_accepted_by_points() -> TestResult {
        let methods = methods(&[("PUNKTY", 10, "45.00")])?;
        let orders = [Order::new("O1", dec("50.00")?)];

        let allocation = Allocator::default().optimize(&orders, &methods);

        assert_eq!(allocation.spent_for("PUNKTY"), Some(dec("45.00")?));
        assert_eq!(allocation.charges().len(), 1);

        Ok(())
    }

    #[test]
    fn higher_savings_are_served_first() -> TestResult {
        // Both orders want CARD; only the one saving more fits.
        let methods = methods(&[("CARD", 20, "160.00"), ("OTHER", 0, "1000.00")])?;
        let orders = [
            Order::with_promotions("SMALL", dec("100.00")?, ["CARD"]),
            Order::with_promotions("LARGE", dec("200.00")?, ["CARD"]),
        ];

        let allocation = Allocator::default().optimize(&orders, &methods);

        let large: Vec<_> = allocation.charges_for_order("LARGE").collect();
        let small: Vec<_> = allocation.charges_for_order("SMALL").collect();

        assert_eq!(large.len(), 1);
        assert_eq!(large.first().map(|c| c.kind), Some(ChargeKind::PromoCard));
        assert_eq!(small.first().map(|c| c.kind), Some(ChargeKind::FullPrice));
        assert_eq!(allocation.spent_for("CARD"), Some(dec("160.00")?));
        assert_eq!(allocation.spent_for("OTHER"), Some(dec("100.00")?));

        Ok(())
    }

    #[test]
    fn unknown_promotions_are_ignored() -> TestResult {
        let methods = methods(&[("CARD", 0, "100.00")])?;
        let orders = [Order::with_promotions("O1", dec("40.00")?, ["NOPE"])];

        let allocation = Allocator::default().optimize(&orders, &methods);

        assert_eq!(allocation.spent_for("CARD"), Some(dec("40.00")?));
        assert_eq!(allocation.spent_for("NOPE"), None);

        Ok(())
    }

    #[test]
    fn missing_points_method_skips_points_phases() -> TestResult {
        let methods = methods(&[("CARD", 5, "100.00")])?;
        let orders = [Order::new("O1", dec("60.00")?)];

        let allocation = Allocator::default().optimize(&orders, &methods);

        let kinds: Vec<ChargeKind> = allocation.charges().iter().map(|c| c.kind).collect();

        assert_eq!(kinds, [ChargeKind::FullPrice]);
        assert_eq!(allocation.spent_for("CARD"), Some(dec("60.00")?));

        Ok(())
    }

    #[test]
    fn mixed_payment_splits_points_and_remainder() -> TestResult {
        let methods = methods(&[("PUNKTY", 15, "20.00"), ("CARD", 0, "100.00")])?;
        let orders = [Order::new("O1", dec("100.00")?)];

        let allocation = Allocator::default().optimize(&orders, &methods);

        let kinds: Vec<ChargeKind> = allocation.charges().iter().map(|c| c.kind).collect();

        assert_eq!(kinds, [ChargeKind::MixedPoints, ChargeKind::MixedRemainder]);
        assert_eq!(allocation.spent_for("PUNKTY"), Some(dec("20.00")?));
        assert_eq!(allocation.spent_for("CARD"), Some(dec("70.00")?));
        assert_eq!(allocation.discount_granted(), Some(dec("10.00")?));

        Ok(())
    }

    #[test]
    fn mixed_split_ignores_the_points_discount() -> TestResult {
        // 50% points discount, but the split is still 90% of the raw value.
        let methods = methods(&[("PUNKTY", 50, "30.00"), ("CARD", 0, "100.00")])?;
        let orders = [Order::new("O1", dec("80.00")?)];

        let allocation = Allocator::default().optimize(&orders, &methods);

        assert_eq!(allocation.spent_for("PUNKTY"), Some(dec("30.00")?));
        assert_eq!(allocation.spent_for("CARD"), Some(dec("42.00")?));

        Ok(())
    }

    #[test]
    fn uncovered_remainder_commits_nothing() -> TestResult {
        let methods = methods(&[("PUNKTY", 10, "15.00"), ("CARD", 0, "50.00")])?;
        let orders = [Order::new("O1", dec("100.00")?)];

        let allocation = Allocator::default().optimize(&orders, &methods);

        assert_eq!(allocation.unpaid(), ["O1"]);
        assert!(allocation.charges().is_empty());
        assert_eq!(allocation.spent_for("PUNKTY"), Some(Decimal::ZERO));

        Ok(())
    }

    #[test]
    fn full_price_is_the_last_resort() -> TestResult {
        // CARD cannot cover the discounted 90.00 and points are below the
        // 10% threshold, so OTHER pays the undiscounted value.
        let methods = methods(&[
            ("PUNKTY", 10, "5.00"),
            ("CARD", 10, "50.00"),
            ("OTHER", 0, "100.00"),
        ])?;
        let orders = [Order::with_promotions("O1", dec("100.00")?, ["CARD"])];

        let allocation = Allocator::default().optimize(&orders, &methods);

        let kinds: Vec<ChargeKind> = allocation.charges().iter().map(|c| c.kind).collect();

        assert_eq!(kinds, [ChargeKind::FullPrice]);
        assert_eq!(allocation.spent_for("OTHER"), Some(dec("100.00")?));
        assert_eq!(allocation.spent_for("CARD"), Some(Decimal::ZERO));

        Ok(())
    }

    #[test]
    fn unpayable_orders_are_dropped_silently() -> TestResult {
        let methods = methods(&[("PUNKTY", 10, "0.50"), ("CARD", 0, "10.00")])?;
        let orders = [
            Order::new("BIG", dec("500.00")?),
            Order::new("OK", dec("10.00")?),
        ];

        let allocation = Allocator::default().optimize(&orders, &methods);

        assert_eq!(allocation.unpaid(), ["BIG"]);
        assert_eq!(allocation.charges_for_order("BIG").count(), 0);
        assert_eq!(allocation.spent_for("CARD"), Some(dec("10.00")?));
        assert_eq!(allocation.paid_value(), Some(dec("10.00")?));

        Ok(())
    }

    #[test]
    fn custom_points_id() -> TestResult {
        let methods = methods(&[("LOYALTY", 10, "100.00"), ("PUNKTY", 0, "100.00")])?;
        let orders = [Order::new("O1", dec("50.00")?)];

        let allocation = Allocator::new("LOYALTY").optimize(&orders, &methods);

        assert_eq!(allocation.spent_for("LOYALTY"), Some(dec("45.00")?));
        assert_eq!(allocation.spent_for("PUNKTY"), Some(Decimal::ZERO));

        Ok(())
    }

    #[test]
    fn into_spent_keeps_totals() -> TestResult {
        let methods = methods(&[("PUNKTY", 10, "100.00")])?;
        let orders = [Order::new("O1", dec("10.00")?)];

        let spent = Allocator::default().optimize(&orders, &methods).into_spent();

        assert_eq!(spent.get("PUNKTY"), Some(&dec("9.00")?));

        Ok(())
    }

    #[test]
    fn card_retry_pays_order_once_balance_recovers() -> TestResult {
        let methods = methods(&[("CARD", 10, "80.00")])?;
        let orders = [
            Order::with_promotions("A", dec("100.00")?, ["CARD"]),
            Order::with_promotions("REFUND", dec("-50.00")?, ["CARD"]),
        ];

        let allocation = Allocator::default().optimize(&orders, &methods);

        let kinds: Vec<(&str, ChargeKind)> = allocation
            .charges()
            .iter()
            .map(|charge| (charge.order_id.as_str(), charge.kind))
            .collect();

        assert_eq!(
            kinds,
            [("REFUND", ChargeKind::PromoCard), ("A", ChargeKind::EscapeCard)]
        );
        assert_eq!(allocation.spent_for("CARD"), Some(dec("45.00")?));
        assert!(allocation.unpaid().is_empty());

        Ok(())
    }

    #[test]
    fn oversized_totals_do_not_panic() -> TestResult {
        let methods = methods(&[
            ("CARD_A", 0, "50000000000000000000000000000"),
            ("CARD_B", 0, "50000000000000000000000000000"),
        ])?;
        let orders = [
            Order::new("O1", dec("50000000000000000000000000000")?),
            Order::new("O2", dec("50000000000000000000000000000")?),
        ];

        let allocation = Allocator::default().optimize(&orders, &methods);

        assert_eq!(allocation.charges().len(), 2);
        assert!(allocation.unpaid().is_empty());
        assert_eq!(allocation.spent_for("CARD_A"), Some(dec("50000000000000000000000000000")?));
        assert_eq!(allocation.spent_for("CARD_B"), Some(dec("50000000000000000000000000000")?));
        assert_eq!(allocation.paid_value(), None);
        assert_eq!(allocation.total_charged(), None);
        assert_eq!(allocation.discount_granted(), None);

        Ok(())
    }
}
