//! [`TransferStore`] on PostgreSQL.

use async_trait::async_trait;
use sea_orm::ActiveValue::{NotSet, Unchanged};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect};
use tally_core::store::{StoreError, TransferStore};
use tally_core::transfer::Transfer;
use tally_shared::types::{OrganizationId, TransferId};

use super::convert::{transfer_active_model, transfer_from_models, transfer_item_active_model};
use super::{PgTx, db_err};
use crate::entities::{transfer_items, transfers};

impl PgTx {
    async fn load_transfer(
        &self,
        organization_id: OrganizationId,
        transfer_id: TransferId,
        lock: bool,
    ) -> Result<Option<Transfer>, StoreError> {
        let mut query = transfers::Entity::find_by_id(transfer_id.into_inner())
            .filter(transfers::Column::OrganizationId.eq(organization_id.into_inner()));
        if lock {
            query = query.lock_exclusive();
        }
        let Some(header) = query.one(&self.txn).await.map_err(db_err)? else {
            return Ok(None);
        };

        let items = transfer_items::Entity::find()
            .filter(transfer_items::Column::TransferId.eq(header.id))
            .all(&self.txn)
            .await
            .map_err(db_err)?;

        Ok(Some(transfer_from_models(header, items)))
    }
}

#[async_trait]
impl TransferStore for PgTx {
    async fn insert_transfer(&mut self, transfer: Transfer) -> Result<Transfer, StoreError> {
        transfers::Entity::insert(transfer_active_model(&transfer))
            .exec_without_returning(&self.txn)
            .await
            .map_err(db_err)?;

        if !transfer.items.is_empty() {
            let items = (1..)
                .zip(&transfer.items)
                .map(|(line, item)| transfer_item_active_model(line, item));
            transfer_items::Entity::insert_many(items)
                .exec_without_returning(&self.txn)
                .await
                .map_err(db_err)?;
        }

        Ok(transfer)
    }

    async fn find_transfer(
        &mut self,
        organization_id: OrganizationId,
        transfer_id: TransferId,
    ) -> Result<Option<Transfer>, StoreError> {
        self.load_transfer(organization_id, transfer_id, false).await
    }

    async fn lock_transfer(
        &mut self,
        organization_id: OrganizationId,
        transfer_id: TransferId,
    ) -> Result<Option<Transfer>, StoreError> {
        self.load_transfer(organization_id, transfer_id, true).await
    }

    async fn update_transfer(&mut self, transfer: &Transfer) -> Result<(), StoreError> {
        let mut header = transfer_active_model(transfer);
        // Identity columns stay as inserted.
        header.id = Unchanged(transfer.id.into_inner());
        header.organization_id = NotSet;
        header.transfer_number = NotSet;
        header.created_at = NotSet;
        header.update(&self.txn).await.map_err(db_err)?;

        for item in &transfer.items {
            transfer_items::Entity::update_many()
                .col_expr(transfer_items::Column::UnitCost, Expr::value(item.unit_cost))
                .col_expr(
                    transfer_items::Column::TotalValue,
                    Expr::value(item.total_value),
                )
                .filter(transfer_items::Column::Id.eq(item.id.into_inner()))
                .exec(&self.txn)
                .await
                .map_err(db_err)?;
        }

        Ok(())
    }

    async fn delete_transfer(
        &mut self,
        organization_id: OrganizationId,
        transfer_id: TransferId,
    ) -> Result<(), StoreError> {
        transfer_items::Entity::delete_many()
            .filter(transfer_items::Column::TransferId.eq(transfer_id.into_inner()))
            .exec(&self.txn)
            .await
            .map_err(db_err)?;
        transfers::Entity::delete_many()
            .filter(transfers::Column::Id.eq(transfer_id.into_inner()))
            .filter(transfers::Column::OrganizationId.eq(organization_id.into_inner()))
            .exec(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
