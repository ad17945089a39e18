//! Money
//!
//! Every amount the allocator produces is rounded to two fractional digits,
//! half-up, at the point where it is computed rather than only on output.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fractional digits kept for monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Round an amount to two fractional digits, half-up.
///
/// The result always carries a scale of two, so `100` renders as `100.00`.
pub fn round(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);

    rounded.rescale(MONEY_SCALE);

    rounded
}

/// Build a fractional percentage from whole percent points (`15` -> `0.15`).
pub fn percent(points: u8) -> Percentage {
    Percentage::from(Decimal::new(i64::from(points), 2))
}

/// The rounded share of `value` covered by `percent`.
pub fn percent_of(value: Decimal, percent: Percentage) -> Decimal {
    round(percent * value)
}

/// The rounded price of `value` after taking `percent` off.
pub fn apply_discount(value: Decimal, percent: Percentage) -> Decimal {
    round(value * (Decimal::ONE - percent * Decimal::ONE))
}
