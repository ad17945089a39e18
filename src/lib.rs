//! Tender
//!
//! Tender decides how to pay a batch of orders with a set of payment methods
//! (promotional cards and loyalty points) so that the total discount is as
//! large as possible while every method stays within its spending limit.
//!
//! ```
//! use rust_decimal::Decimal;
//! use tender::prelude::*;
//!
//! let methods: PaymentMethods = [
//!     PaymentMethod::new("PUNKTY", 10, Decimal::ONE_HUNDRED),
//!     PaymentMethod::new("CARD", 5, Decimal::ONE_HUNDRED),
//! ]
//! .into_iter()
//! .collect();
//!
//! let orders = [
//!     Order::with_promotions("O1", Decimal::new(50, 0), ["CARD"]),
//!     Order::new("O2", Decimal::new(50, 0)),
//! ];
//!
//! let allocation = Allocator::default().optimize(&orders, &methods);
//!
//! assert_eq!(allocation.spent_for("CARD"), Some(Decimal::new(4750, 2)));
//! assert_eq!(allocation.spent_for("PUNKTY"), Some(Decimal::new(4500, 2)));
//! ```

pub mod allocator;
pub mod config;
pub mod fixtures;
pub mod methods;
pub mod money;
pub mod observability;
pub mod orders;
pub mod prelude;
pub mod report;
