//! [`InventoryStore`] on PostgreSQL.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select};
use tally_core::inventory::{CostLayer, InventoryMovement, Item, NewCostLayer, Warehouse};
use tally_core::store::{InventoryStore, StoreError};
use tally_shared::types::{CostLayerId, ItemId, OrganizationId, WarehouseId};
use uuid::Uuid;

use super::convert::{layer_active_model, movement_active_model};
use super::{PgTx, db_err};
use crate::entities::{inventory_layers, inventory_movements, items, warehouses};

/// Layers of one item in one warehouse, oldest first.
fn layers_of(
    organization_id: OrganizationId,
    item_id: ItemId,
    warehouse_id: WarehouseId,
) -> Select<inventory_layers::Entity> {
    inventory_layers::Entity::find()
        .filter(inventory_layers::Column::OrganizationId.eq(organization_id.into_inner()))
        .filter(inventory_layers::Column::ItemId.eq(item_id.into_inner()))
        .filter(inventory_layers::Column::WarehouseId.eq(warehouse_id.into_inner()))
        .order_by_asc(inventory_layers::Column::CreatedAt)
        .order_by_asc(inventory_layers::Column::Sequence)
}

fn open_layers_of(
    organization_id: OrganizationId,
    item_id: ItemId,
    warehouse_id: WarehouseId,
) -> Select<inventory_layers::Entity> {
    layers_of(organization_id, item_id, warehouse_id)
        .filter(inventory_layers::Column::QuantityRemaining.gt(Decimal::ZERO))
}

#[async_trait]
impl InventoryStore for PgTx {
    async fn find_warehouse(
        &mut self,
        organization_id: OrganizationId,
        warehouse_id: WarehouseId,
    ) -> Result<Option<Warehouse>, StoreError> {
        let model = warehouses::Entity::find_by_id(warehouse_id.into_inner())
            .filter(warehouses::Column::OrganizationId.eq(organization_id.into_inner()))
            .one(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(model.map(Into::into))
    }

    async fn find_item(
        &mut self,
        organization_id: OrganizationId,
        item_id: ItemId,
    ) -> Result<Option<Item>, StoreError> {
        let model = items::Entity::find_by_id(item_id.into_inner())
            .filter(items::Column::OrganizationId.eq(organization_id.into_inner()))
            .one(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(model.map(Into::into))
    }

    async fn open_layers(
        &mut self,
        organization_id: OrganizationId,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<CostLayer>, StoreError> {
        let models = open_layers_of(organization_id, item_id, warehouse_id)
            .all(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn lock_open_layers(
        &mut self,
        organization_id: OrganizationId,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<CostLayer>, StoreError> {
        let models = open_layers_of(organization_id, item_id, warehouse_id)
            .lock_exclusive()
            .all(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn lock_layers_by_reference(
        &mut self,
        organization_id: OrganizationId,
        item_id: ItemId,
        warehouse_id: WarehouseId,
        reference_id: Uuid,
    ) -> Result<Vec<CostLayer>, StoreError> {
        let models = layers_of(organization_id, item_id, warehouse_id)
            .filter(inventory_layers::Column::ReferenceId.eq(reference_id))
            .lock_exclusive()
            .all(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn latest_unit_cost(
        &mut self,
        organization_id: OrganizationId,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<Option<Decimal>, StoreError> {
        let model = inventory_layers::Entity::find()
            .filter(inventory_layers::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(inventory_layers::Column::ItemId.eq(item_id.into_inner()))
            .filter(inventory_layers::Column::WarehouseId.eq(warehouse_id.into_inner()))
            .order_by_desc(inventory_layers::Column::CreatedAt)
            .order_by_desc(inventory_layers::Column::Sequence)
            .one(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(model.map(|layer| layer.unit_cost))
    }

    async fn insert_layer(&mut self, layer: NewCostLayer) -> Result<CostLayer, StoreError> {
        let model = inventory_layers::Entity::insert(layer_active_model(&layer))
            .exec_with_returning(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(model.into())
    }

    async fn set_layer_remaining(
        &mut self,
        organization_id: OrganizationId,
        layer_id: CostLayerId,
        quantity_remaining: Decimal,
    ) -> Result<(), StoreError> {
        let result = inventory_layers::Entity::update_many()
            .col_expr(
                inventory_layers::Column::QuantityRemaining,
                Expr::value(quantity_remaining),
            )
            .filter(inventory_layers::Column::Id.eq(layer_id.into_inner()))
            .filter(inventory_layers::Column::OrganizationId.eq(organization_id.into_inner()))
            .exec(&self.txn)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(StoreError::Internal(format!("cost layer {layer_id} not found")));
        }
        Ok(())
    }

    async fn insert_movement(
        &mut self,
        movement: InventoryMovement,
    ) -> Result<InventoryMovement, StoreError> {
        inventory_movements::Entity::insert(movement_active_model(&movement))
            .exec_without_returning(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(movement)
    }

    async fn list_layers(
        &mut self,
        organization_id: OrganizationId,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<CostLayer>, StoreError> {
        let models = layers_of(organization_id, item_id, warehouse_id)
            .all(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_movements(
        &mut self,
        organization_id: OrganizationId,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<InventoryMovement>, StoreError> {
        let models = inventory_movements::Entity::find()
            .filter(inventory_movements::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(inventory_movements::Column::ItemId.eq(item_id.into_inner()))
            .filter(inventory_movements::Column::WarehouseId.eq(warehouse_id.into_inner()))
            .order_by_asc(inventory_movements::Column::Sequence)
            .all(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}
