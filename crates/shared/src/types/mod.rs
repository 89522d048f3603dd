//! Common types used across the application.

pub mod id;
pub mod money;

pub use id::*;
pub use money::{MONEY_SCALE, QUANTITY_SCALE, UNIT_COST_SCALE, round_money, round_unit_cost};
