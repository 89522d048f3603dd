//! Monetary precision rules.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` everywhere; these helpers pin the
//! scales that persisted values are rounded to.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for monetary amounts (journal lines, totals).
pub const MONEY_SCALE: u32 = 4;

/// Decimal places kept for per-unit costs.
pub const UNIT_COST_SCALE: u32 = 6;

/// Decimal places kept for stock quantities.
pub const QUANTITY_SCALE: u32 = 6;

/// Rounds a monetary amount to [`MONEY_SCALE`] using Banker's Rounding.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Rounds a unit cost to [`UNIT_COST_SCALE`] using Banker's Rounding.
#[must_use]
pub fn round_unit_cost(unit_cost: Decimal) -> Decimal {
    unit_cost.round_dp_with_strategy(UNIT_COST_SCALE, RoundingStrategy::MidpointNearestEven)
}
