//! Inventory domain types: warehouses, items, cost layers and movements.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{
    AccountId, CostLayerId, ItemId, MovementId, OrganizationId, WarehouseId,
};
use uuid::Uuid;

/// Kind of stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Goods received from a supplier.
    Purchase,
    /// Goods shipped to a customer.
    Sale,
    /// Goods received from another warehouse.
    TransferIn,
    /// Goods shipped to another warehouse.
    TransferOut,
    /// Stock count correction.
    Adjustment,
}

impl MovementType {
    /// Returns the string representation of the movement type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Sale => "sale",
            Self::TransferIn => "transfer_in",
            Self::TransferOut => "transfer_out",
            Self::Adjustment => "adjustment",
        }
    }
}

/// How an outbound movement is costed when the open layers run out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeInventoryPolicy {
    /// Reject the movement with `InsufficientInventory`.
    #[default]
    Disallow,
    /// Cost the shortfall at the unit cost of the newest layer.
    LastKnownCost,
    /// Cost the shortfall at zero.
    ZeroCost,
}

impl NegativeInventoryPolicy {
    /// Returns the string representation of the policy.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disallow => "disallow",
            Self::LastKnownCost => "last_known_cost",
            Self::ZeroCost => "zero_cost",
        }
    }
}

/// A stock location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    /// The warehouse ID.
    pub id: WarehouseId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Short code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Whether stock may move in or out.
    pub is_active: bool,
    /// Cost center the warehouse reports to.
    pub cost_center: Option<String>,
    /// Ledger account carrying the warehouse's stock value.
    pub inventory_account_id: Option<AccountId>,
    /// Costing of outbound quantities beyond the open layers.
    pub negative_inventory_policy: NegativeInventoryPolicy,
}

/// A stocked item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// The item ID.
    pub id: ItemId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Stock keeping unit.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Whether the item may move.
    pub is_active: bool,
}

/// A FIFO cost layer.
///
/// `0 <= quantity_remaining <= quantity_original` always holds; exhausted
/// layers are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostLayer {
    /// The layer ID.
    pub id: CostLayerId,
    /// Storage-assigned insertion sequence, the FIFO tie-breaker.
    pub sequence: i64,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// The item.
    pub item_id: ItemId,
    /// The warehouse.
    pub warehouse_id: WarehouseId,
    /// Quantity received.
    pub quantity_original: Decimal,
    /// Quantity not yet consumed.
    pub quantity_remaining: Decimal,
    /// Cost per unit.
    pub unit_cost: Decimal,
    /// Movement that created the layer.
    pub movement_type: MovementType,
    /// Source document that created the layer.
    pub reference_id: Option<Uuid>,
    /// Creation time, the primary FIFO key.
    pub created_at: DateTime<Utc>,
}

impl CostLayer {
    /// Value of the unconsumed quantity.
    #[must_use]
    pub fn remaining_value(&self) -> Decimal {
        self.quantity_remaining * self.unit_cost
    }

    /// True when nothing has been consumed yet.
    #[must_use]
    pub fn is_untouched(&self) -> bool {
        self.quantity_remaining == self.quantity_original
    }
}

/// A layer about to be inserted; the store assigns the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCostLayer {
    /// The layer ID.
    pub id: CostLayerId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// The item.
    pub item_id: ItemId,
    /// The warehouse.
    pub warehouse_id: WarehouseId,
    /// Quantity received.
    pub quantity: Decimal,
    /// Cost per unit.
    pub unit_cost: Decimal,
    /// Movement that creates the layer.
    pub movement_type: MovementType,
    /// Source document.
    pub reference_id: Option<Uuid>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl NewCostLayer {
    /// Completes the layer with its storage sequence.
    #[must_use]
    pub fn into_layer(self, sequence: i64) -> CostLayer {
        CostLayer {
            id: self.id,
            sequence,
            organization_id: self.organization_id,
            item_id: self.item_id,
            warehouse_id: self.warehouse_id,
            quantity_original: self.quantity,
            quantity_remaining: self.quantity,
            unit_cost: self.unit_cost,
            movement_type: self.movement_type,
            reference_id: self.reference_id,
            created_at: self.created_at,
        }
    }
}

/// An append-only stock movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryMovement {
    /// The movement ID.
    pub id: MovementId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// The item.
    pub item_id: ItemId,
    /// The warehouse.
    pub warehouse_id: WarehouseId,
    /// Signed quantity: positive in, negative out.
    pub quantity: Decimal,
    /// Unit cost (weighted average for outbound).
    pub unit_cost: Decimal,
    /// Total cost, always non-negative.
    pub total_cost: Decimal,
    /// Movement type.
    pub movement_type: MovementType,
    /// Source document.
    pub reference_id: Option<Uuid>,
    /// Accounting date.
    pub posting_date: NaiveDate,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Input for an inbound movement.
#[derive(Debug, Clone)]
pub struct InboundInput {
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// The item.
    pub item_id: ItemId,
    /// The receiving warehouse.
    pub warehouse_id: WarehouseId,
    /// Quantity received (> 0).
    pub quantity: Decimal,
    /// Cost per unit (>= 0).
    pub unit_cost: Decimal,
    /// Movement type.
    pub movement_type: MovementType,
    /// Source document.
    pub reference_id: Option<Uuid>,
    /// Accounting date.
    pub posting_date: NaiveDate,
}

/// Input for an outbound movement.
#[derive(Debug, Clone)]
pub struct OutboundInput {
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// The item.
    pub item_id: ItemId,
    /// The shipping warehouse.
    pub warehouse_id: WarehouseId,
    /// Quantity shipped (> 0).
    pub quantity: Decimal,
    /// Movement type.
    pub movement_type: MovementType,
    /// Source document.
    pub reference_id: Option<Uuid>,
    /// Accounting date.
    pub posting_date: NaiveDate,
}

/// Quantity taken from one layer (or from the shortfall) at one unit cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSlice {
    /// The layer consumed; `None` for a shortfall slice.
    pub layer_id: Option<CostLayerId>,
    /// Quantity taken.
    pub quantity: Decimal,
    /// Unit cost of the layer.
    pub unit_cost: Decimal,
}

impl CostSlice {
    /// `quantity * unit_cost`.
    #[must_use]
    pub fn cost(&self) -> Decimal {
        self.quantity * self.unit_cost
    }
}

/// Result of an inbound movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundResult {
    /// The layer created.
    pub layer: CostLayer,
    /// The movement recorded.
    pub movement: InventoryMovement,
}

/// Result of an outbound movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundResult {
    /// The movement recorded.
    pub movement: InventoryMovement,
    /// Sum of slice costs.
    pub total_cost: Decimal,
    /// `total_cost / quantity`, rounded to the unit cost scale.
    pub average_unit_cost: Decimal,
    /// Layers consumed, oldest first, then any shortfall slice.
    pub slices: Vec<CostSlice>,
    /// Quantity not covered by open layers (zero unless the policy allows).
    pub shortfall: Decimal,
}

/// Dry-run costing of an outbound quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundPreview {
    /// Quantity asked for.
    pub requested: Decimal,
    /// Quantity in open layers.
    pub available: Decimal,
    /// True when the movement would be accepted.
    pub sufficient: bool,
    /// Cost of the quantity that would be consumed.
    pub total_cost: Decimal,
    /// Weighted unit cost, rounded to the unit cost scale.
    pub average_unit_cost: Decimal,
}

/// On-hand quantity and value of one item in one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockPosition {
    /// The item.
    pub item_id: ItemId,
    /// The warehouse.
    pub warehouse_id: WarehouseId,
    /// Sum of remaining quantities.
    pub quantity: Decimal,
    /// Sum of remaining values.
    pub value: Decimal,
    /// Number of open layers.
    pub open_layers: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_into_layer_starts_full() {
        let new = NewCostLayer {
            id: CostLayerId::new(),
            organization_id: OrganizationId::new(),
            item_id: ItemId::new(),
            warehouse_id: WarehouseId::new(),
            quantity: dec!(10),
            unit_cost: dec!(2.5),
            movement_type: MovementType::Purchase,
            reference_id: None,
            created_at: Utc::now(),
        };
        let layer = new.into_layer(7);
        assert_eq!(layer.sequence, 7);
        assert_eq!(layer.quantity_original, dec!(10));
        assert_eq!(layer.quantity_remaining, dec!(10));
        assert!(layer.is_untouched());
        assert_eq!(layer.remaining_value(), dec!(25));
    }

    #[test]
    fn test_policy_defaults_to_disallow() {
        assert_eq!(NegativeInventoryPolicy::default(), NegativeInventoryPolicy::Disallow);
    }
}
