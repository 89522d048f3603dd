//! `SeaORM` Entity for transfers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TransferStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub transfer_number: String,
    pub source_warehouse_id: Uuid,
    pub destination_warehouse_id: Uuid,
    pub transfer_date: Date,
    pub status: TransferStatus,
    pub notes: Option<String>,
    #[sea_orm(column_type = "Decimal(None)")]
    pub total_value: Decimal,
    pub journal_id: Option<Uuid>,
    pub reversal_journal_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub confirmed_at: Option<DateTimeWithTimeZone>,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub cancelled_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transfer_items::Entity")]
    TransferItems,
}

impl Related<super::transfer_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransferItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
