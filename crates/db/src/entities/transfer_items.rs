//! `SeaORM` Entity for transfer_items table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transfer_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub transfer_id: Uuid,
    pub line_number: i32,
    pub item_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub unit_cost: Decimal,
    #[sea_orm(column_type = "Decimal(None)")]
    pub total_value: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transfers::Entity",
        from = "Column::TransferId",
        to = "super::transfers::Column::Id",
        on_delete = "Cascade"
    )]
    Transfers,
}

impl Related<super::transfers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transfers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
