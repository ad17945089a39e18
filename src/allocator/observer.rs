//! Allocation Observer

use crate::{
    allocator::{Charge, Phase, ledger::Account},
    orders::Order,
};

/// Observer trait for following an allocation run as it happens.
///
/// Callbacks fire in commit order, so an observer sees every intermediate
/// ledger state without the allocator having to expose it.
pub trait AllocationObserver {
    /// Called when a phase starts with the number of orders it will consider.
    fn on_phase_start(&mut self, _phase: Phase, _pending: usize) {}

    /// Called after a charge has been committed to the ledger.
    ///
    /// # Parameters
    ///
    /// - `charge`: The committed charge
    /// - `account`: The charged method's account after the commit
    fn on_charge(&mut self, charge: &Charge, account: &Account);

    /// Called when an order could not be paid by any phase.
    fn on_unpaid(&mut self, _order: &Order) {}
}

/// Observer that ignores every callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl AllocationObserver for NoopObserver {
    fn on_charge(&mut self, _charge: &Charge, _account: &Account) {}
}
