//! FIFO inventory costing.
//!
//! - Warehouses, items, cost layers and movements
//! - Pure consumption planning over cost layers
//! - The costing engine, which applies plans under row locks

pub mod error;
pub mod fifo;
pub mod service;
pub mod types;

#[cfg(test)]
mod fifo_props;

pub use error::InventoryError;
pub use fifo::{ConsumptionPlan, check_quantity, fifo_order, plan_consumption, shortfall_unit_cost};
pub use service::{FifoCostingEngine, ReverseLayersInput};
pub use types::{
    CostLayer, CostSlice, InboundInput, InboundResult, InventoryMovement, Item, MovementType,
    NegativeInventoryPolicy, NewCostLayer, OutboundInput, OutboundPreview, OutboundResult,
    StockPosition, Warehouse,
};
