//! FIFO costing engine.

use chrono::Utc;
use rust_decimal::Decimal;
use tally_shared::types::{
    CostLayerId, ItemId, MovementId, OrganizationId, WarehouseId, round_unit_cost,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::error::InventoryError;
use super::fifo::{ConsumptionPlan, check_quantity, plan_consumption, shortfall_unit_cost};
use super::types::{
    CostSlice, InboundInput, InboundResult, InventoryMovement, Item, MovementType,
    NegativeInventoryPolicy, NewCostLayer, OutboundInput, OutboundPreview, OutboundResult,
    StockPosition, Warehouse,
};
use crate::invariant::layer_within_bounds;
use crate::store::{InventoryStore, Store, finish};

/// Input for reversing the layers a source document created.
#[derive(Debug, Clone)]
pub struct ReverseLayersInput {
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// The item.
    pub item_id: ItemId,
    /// Warehouse holding the layers.
    pub warehouse_id: WarehouseId,
    /// Source document that created the layers.
    pub reference_id: Uuid,
    /// Movement type of the reversing movement.
    pub movement_type: MovementType,
    /// Accounting date of the reversing movement.
    pub posting_date: chrono::NaiveDate,
}

/// Creates and consumes FIFO cost layers.
///
/// Every operation runs in one store transaction; the `_in` variants run
/// inside the caller's so that workflows compose them atomically.
#[derive(Debug, Clone, Copy, Default)]
pub struct FifoCostingEngine;

impl FifoCostingEngine {
    /// Creates the engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    // ========== Inbound ==========

    /// Records an inbound movement in its own transaction.
    pub async fn record_inbound<S: Store>(
        &self,
        store: &S,
        input: InboundInput,
    ) -> Result<InboundResult, InventoryError> {
        let mut tx = store.begin().await?;
        let result = self.record_inbound_in(&mut tx, input).await;
        finish(tx, result).await
    }

    /// Creates one layer and one positive movement.
    pub async fn record_inbound_in<T: InventoryStore>(
        &self,
        tx: &mut T,
        input: InboundInput,
    ) -> Result<InboundResult, InventoryError> {
        check_quantity(input.quantity)?;
        if input.unit_cost < Decimal::ZERO {
            return Err(InventoryError::NegativeUnitCost(input.unit_cost));
        }

        let org = input.organization_id;
        active_warehouse(tx, org, input.warehouse_id).await?;
        active_item(tx, org, input.item_id).await?;

        let unit_cost = round_unit_cost(input.unit_cost);
        let now = Utc::now();

        let layer = tx
            .insert_layer(NewCostLayer {
                id: CostLayerId::new(),
                organization_id: org,
                item_id: input.item_id,
                warehouse_id: input.warehouse_id,
                quantity: input.quantity,
                unit_cost,
                movement_type: input.movement_type,
                reference_id: input.reference_id,
                created_at: now,
            })
            .await?;

        let movement = tx
            .insert_movement(InventoryMovement {
                id: MovementId::new(),
                organization_id: org,
                item_id: input.item_id,
                warehouse_id: input.warehouse_id,
                quantity: input.quantity,
                unit_cost,
                total_cost: input.quantity * unit_cost,
                movement_type: input.movement_type,
                reference_id: input.reference_id,
                posting_date: input.posting_date,
                created_at: now,
            })
            .await?;

        info!(
            organization_id = %org,
            item_id = %input.item_id,
            warehouse_id = %input.warehouse_id,
            layer_id = %layer.id,
            quantity = %input.quantity,
            unit_cost = %unit_cost,
            movement_type = input.movement_type.as_str(),
            "inbound recorded"
        );

        Ok(InboundResult { layer, movement })
    }

    // ========== Outbound ==========

    /// Records an outbound movement in its own transaction.
    pub async fn record_outbound<S: Store>(
        &self,
        store: &S,
        input: OutboundInput,
    ) -> Result<OutboundResult, InventoryError> {
        let mut tx = store.begin().await?;
        let result = self.record_outbound_in(&mut tx, input).await;
        finish(tx, result).await
    }

    /// Consumes locked layers oldest first and records one negative
    /// movement.
    ///
    /// Nothing is written when the open layers cannot cover the quantity
    /// and the warehouse policy refuses a shortfall.
    pub async fn record_outbound_in<T: InventoryStore>(
        &self,
        tx: &mut T,
        input: OutboundInput,
    ) -> Result<OutboundResult, InventoryError> {
        check_quantity(input.quantity)?;

        let org = input.organization_id;
        let warehouse = active_warehouse(tx, org, input.warehouse_id).await?;
        active_item(tx, org, input.item_id).await?;

        let layers = tx
            .lock_open_layers(org, input.item_id, input.warehouse_id)
            .await?;
        let mut plan = plan_consumption(&layers, input.quantity)?;

        if plan.shortfall > Decimal::ZERO {
            if !cover_shortfall(tx, &warehouse, input.item_id, &mut plan).await? {
                return Err(InventoryError::InsufficientInventory {
                    item_id: input.item_id,
                    warehouse_id: input.warehouse_id,
                    available: plan.available,
                    requested: plan.requested,
                });
            }
            warn!(
                organization_id = %org,
                item_id = %input.item_id,
                warehouse_id = %input.warehouse_id,
                shortfall = %plan.shortfall,
                policy = warehouse.negative_inventory_policy.as_str(),
                "outbound exceeds open layers"
            );
        }

        for slice in &plan.slices {
            let Some(layer_id) = slice.layer_id else {
                continue;
            };
            let layer = layers
                .iter()
                .find(|l| l.id == layer_id)
                .ok_or(InventoryError::LayerOutOfBounds(layer_id))?;
            let remaining = layer.quantity_remaining - slice.quantity;
            if !layer_within_bounds(layer.quantity_original, remaining) {
                return Err(InventoryError::LayerOutOfBounds(layer_id));
            }
            tx.set_layer_remaining(org, layer_id, remaining).await?;
        }

        let total_cost = plan.total_cost();
        let average_unit_cost = plan.average_unit_cost();

        let movement = tx
            .insert_movement(InventoryMovement {
                id: MovementId::new(),
                organization_id: org,
                item_id: input.item_id,
                warehouse_id: input.warehouse_id,
                quantity: -input.quantity,
                unit_cost: average_unit_cost,
                total_cost,
                movement_type: input.movement_type,
                reference_id: input.reference_id,
                posting_date: input.posting_date,
                created_at: Utc::now(),
            })
            .await?;

        info!(
            organization_id = %org,
            item_id = %input.item_id,
            warehouse_id = %input.warehouse_id,
            quantity = %input.quantity,
            total_cost = %total_cost,
            layers = plan.slices.iter().filter(|s| s.layer_id.is_some()).count(),
            movement_type = input.movement_type.as_str(),
            "outbound recorded"
        );

        Ok(OutboundResult {
            movement,
            total_cost,
            average_unit_cost,
            slices: plan.slices,
            shortfall: plan.shortfall,
        })
    }

    // ========== Read-only ==========

    /// Costs an outbound quantity without locking or writing anything.
    pub async fn preview_outbound<S: Store>(
        &self,
        store: &S,
        organization_id: OrganizationId,
        item_id: ItemId,
        warehouse_id: WarehouseId,
        quantity: Decimal,
    ) -> Result<OutboundPreview, InventoryError> {
        let mut tx = store.begin_read_only().await?;
        let result = self
            .preview_outbound_in(&mut tx, organization_id, item_id, warehouse_id, quantity)
            .await;
        finish(tx, result).await
    }

    /// Costs an outbound quantity inside the caller's transaction.
    pub async fn preview_outbound_in<T: InventoryStore>(
        &self,
        tx: &mut T,
        organization_id: OrganizationId,
        item_id: ItemId,
        warehouse_id: WarehouseId,
        quantity: Decimal,
    ) -> Result<OutboundPreview, InventoryError> {
        let warehouse = active_warehouse(tx, organization_id, warehouse_id).await?;
        active_item(tx, organization_id, item_id).await?;

        let layers = tx
            .open_layers(organization_id, item_id, warehouse_id)
            .await?;
        let mut plan = plan_consumption(&layers, quantity)?;
        let sufficient = plan.shortfall.is_zero()
            || cover_shortfall(tx, &warehouse, item_id, &mut plan).await?;

        Ok(OutboundPreview {
            requested: plan.requested,
            available: plan.available,
            sufficient,
            total_cost: plan.total_cost(),
            average_unit_cost: plan.average_unit_cost(),
        })
    }

    /// On-hand quantity and value from the open layers.
    pub async fn stock_position<S: Store>(
        &self,
        store: &S,
        organization_id: OrganizationId,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<StockPosition, InventoryError> {
        let mut tx = store.begin_read_only().await?;
        let result = tx
            .open_layers(organization_id, item_id, warehouse_id)
            .await
            .map_err(InventoryError::from)
            .map(|layers| StockPosition {
                item_id,
                warehouse_id,
                quantity: layers.iter().map(|l| l.quantity_remaining).sum(),
                value: layers.iter().map(|l| l.remaining_value()).sum(),
                open_layers: layers.len(),
            });
        finish(tx, result).await
    }

    // ========== Reversal ==========

    /// Zeroes every layer `reference_id` created for the item and records
    /// one negative movement for the total.
    ///
    /// Returns the reversed quantities at their unit costs, oldest first.
    /// Fails without writing if any of the layers was already consumed.
    pub async fn reverse_layers_in<T: InventoryStore>(
        &self,
        tx: &mut T,
        input: ReverseLayersInput,
    ) -> Result<Vec<CostSlice>, InventoryError> {
        let org = input.organization_id;
        let layers = tx
            .lock_layers_by_reference(org, input.item_id, input.warehouse_id, input.reference_id)
            .await?;

        if let Some(consumed) = layers.iter().find(|l| !l.is_untouched()) {
            return Err(InventoryError::LayerAlreadyConsumed {
                layer_id: consumed.id,
                remaining: consumed.quantity_remaining,
                original: consumed.quantity_original,
            });
        }

        let mut slices = Vec::with_capacity(layers.len());
        for layer in layers.iter().filter(|l| l.quantity_original > Decimal::ZERO) {
            tx.set_layer_remaining(org, layer.id, Decimal::ZERO).await?;
            slices.push(CostSlice {
                layer_id: Some(layer.id),
                quantity: layer.quantity_original,
                unit_cost: layer.unit_cost,
            });
        }

        if slices.is_empty() {
            return Ok(slices);
        }

        let quantity: Decimal = slices.iter().map(|s| s.quantity).sum();
        let total_cost: Decimal = slices.iter().map(CostSlice::cost).sum();

        tx.insert_movement(InventoryMovement {
            id: MovementId::new(),
            organization_id: org,
            item_id: input.item_id,
            warehouse_id: input.warehouse_id,
            quantity: -quantity,
            unit_cost: round_unit_cost(total_cost / quantity),
            total_cost,
            movement_type: input.movement_type,
            reference_id: Some(input.reference_id),
            posting_date: input.posting_date,
            created_at: Utc::now(),
        })
        .await?;

        info!(
            organization_id = %org,
            item_id = %input.item_id,
            warehouse_id = %input.warehouse_id,
            reference_id = %input.reference_id,
            quantity = %quantity,
            layers = slices.len(),
            "layers reversed"
        );

        Ok(slices)
    }
}

/// Applies the warehouse policy to a plan with a shortfall.
///
/// Returns false when the policy refuses the shortfall.
async fn cover_shortfall<T: InventoryStore>(
    tx: &mut T,
    warehouse: &Warehouse,
    item_id: ItemId,
    plan: &mut ConsumptionPlan,
) -> Result<bool, InventoryError> {
    let policy = warehouse.negative_inventory_policy;
    let last_known = if policy == NegativeInventoryPolicy::LastKnownCost {
        let cost = tx
            .latest_unit_cost(warehouse.organization_id, item_id, warehouse.id)
            .await?;
        if cost.is_none() {
            warn!(
                item_id = %item_id,
                warehouse_id = %warehouse.id,
                "no known cost for shortfall, costing at zero"
            );
        }
        cost
    } else {
        None
    };

    match shortfall_unit_cost(policy, last_known) {
        Some(unit_cost) => {
            plan.cover_shortfall(unit_cost);
            Ok(true)
        }
        None => Ok(false),
    }
}

pub(crate) async fn active_warehouse<T: InventoryStore>(
    tx: &mut T,
    organization_id: OrganizationId,
    warehouse_id: WarehouseId,
) -> Result<Warehouse, InventoryError> {
    let warehouse = tx
        .find_warehouse(organization_id, warehouse_id)
        .await?
        .ok_or(InventoryError::WarehouseNotFound(warehouse_id))?;
    if !warehouse.is_active {
        return Err(InventoryError::WarehouseInactive(warehouse_id));
    }
    Ok(warehouse)
}

pub(crate) async fn active_item<T: InventoryStore>(
    tx: &mut T,
    organization_id: OrganizationId,
    item_id: ItemId,
) -> Result<Item, InventoryError> {
    let item = tx
        .find_item(organization_id, item_id)
        .await?
        .ok_or(InventoryError::ItemNotFound(item_id))?;
    if !item.is_active {
        return Err(InventoryError::ItemInactive(item_id));
    }
    Ok(item)
}
