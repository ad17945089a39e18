//! Allocation Ledger

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use slotmap::SecondaryMap;

use crate::methods::{PaymentMethodKey, PaymentMethods};

/// Running totals for one payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Account {
    limit: Decimal,
    spent: Decimal,
    balance: Decimal,
}

impl Account {
    /// Open an account with nothing spent and the full limit available.
    pub fn open(limit: Decimal) -> Self {
        Self {
            limit,
            spent: Decimal::ZERO,
            balance: limit,
        }
    }

    /// Spending limit the account was opened with
    pub fn limit(&self) -> Decimal {
        self.limit
    }

    /// Amount charged so far
    pub fn spent(&self) -> Decimal {
        self.spent
    }

    /// Amount still available
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Whether the remaining balance covers `amount`.
    pub fn covers(&self, amount: Decimal) -> bool {
        self.balance >= amount
    }

    /// `spent + balance == limit` and the balance is not overdrawn.
    pub fn is_consistent(&self) -> bool {
        self.spent + self.balance == self.limit && self.balance >= Decimal::ZERO
    }

    fn charge(&mut self, amount: Decimal) {
        self.spent += amount;
        self.balance -= amount;
    }
}

/// Per-method accounts for a single allocation run.
#[derive(Debug, Clone)]
pub struct Ledger {
    accounts: SecondaryMap<PaymentMethodKey, Account>,
}

impl Ledger {
    /// Open an account for every payment method.
    pub fn open(methods: &PaymentMethods) -> Self {
        let accounts = methods
            .iter()
            .map(|(key, method)| (key, Account::open(method.limit())))
            .collect();

        Self { accounts }
    }

    /// Account for a method, if it was part of the run.
    pub fn account(&self, key: PaymentMethodKey) -> Option<&Account> {
        self.accounts.get(key)
    }

    /// Remaining balance, zero for unknown methods.
    pub fn balance(&self, key: PaymentMethodKey) -> Decimal {
        self.account(key).map_or(Decimal::ZERO, Account::balance)
    }

    /// Whether the method's remaining balance covers `amount`.
    pub fn covers(&self, key: PaymentMethodKey, amount: Decimal) -> bool {
        self.balance(key) >= amount
    }

    /// Move `amount` from the method's balance to its spent total.
    ///
    /// Returns the updated account, or `None` if the method is not part of
    /// this ledger, in which case nothing is recorded.
    pub fn charge(&mut self, key: PaymentMethodKey, amount: Decimal) -> Option<&Account> {
        let account = self.accounts.get_mut(key)?;

        account.charge(amount);

        Some(account)
    }

    /// Spent totals keyed by method id.
    pub fn spent_by_id(&self, methods: &PaymentMethods) -> BTreeMap<String, Decimal> {
        methods
            .iter()
            .map(|(key, method)| {
                let spent = self.account(key).map_or(Decimal::ZERO, Account::spent);

                (method.id().to_string(), spent)
            })
            .collect()
    }
}
