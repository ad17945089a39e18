//! Tender prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    allocator::{
        Allocation, Allocator, Charge, ChargeKind, Phase,
        ledger::{Account, Ledger},
        observer::{AllocationObserver, NoopObserver},
    },
    fixtures::{FixtureError, FixtureFormat, load_orders, load_payment_methods},
    methods::{DEFAULT_POINTS_ID, PaymentMethod, PaymentMethodKey, PaymentMethods},
    orders::Order,
    report::{Report, ReportError},
};
