//! Payment method searches shared by the allocation phases.

use rust_decimal::Decimal;

use crate::{
    allocator::ledger::Ledger,
    methods::{PaymentMethodKey, PaymentMethods},
    money,
    orders::Order,
};

/// Largest saving any of the order's promotional cards could grant, ignoring balances.
pub(crate) fn max_card_savings(order: &Order, methods: &PaymentMethods) -> Decimal {
    order
        .promotions()
        .iter()
        .filter_map(|id| methods.by_id(id))
        .map(|method| money::percent_of(order.value(), method.discount()))
        .fold(Decimal::ZERO, Decimal::max)
}

/// Cheapest promotional card that can pay the whole discounted order right now.
///
/// Ties keep the card listed first on the order.
pub(crate) fn find_best_card(
    order: &Order,
    methods: &PaymentMethods,
    ledger: &Ledger,
) -> Option<(PaymentMethodKey, Decimal)> {
    let mut best: Option<(PaymentMethodKey, Decimal)> = None;

    for id in order.promotions() {
        let Some(key) = methods.key(id) else {
            continue;
        };

        let Some(method) = methods.get(key) else {
            continue;
        };

        let cost = method.discounted(order.value());

        if ledger.covers(key, cost) && best.is_none_or(|(_, best_cost)| cost < best_cost) {
            best = Some((key, cost));
        }
    }

    best
}

/// First method, in id order, whose balance covers `amount`, skipping `excluded`.
pub(crate) fn find_fallback(
    amount: Decimal,
    methods: &PaymentMethods,
    ledger: &Ledger,
    excluded: Option<PaymentMethodKey>,
) -> Option<PaymentMethodKey> {
    methods
        .iter()
        .map(|(key, _)| key)
        .filter(|&key| Some(key) != excluded)
        .find(|&key| ledger.covers(key, amount))
}
