//! `SeaORM` Entity for warehouses table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::NegativeInventoryPolicy;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "warehouses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub code: String,
    pub name: String,
    pub is_active: bool,
    pub cost_center: Option<String>,
    pub inventory_account_id: Option<Uuid>,
    pub negative_inventory_policy: NegativeInventoryPolicy,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::InventoryAccountId",
        to = "super::accounts::Column::Id"
    )]
    InventoryAccount,
    #[sea_orm(has_many = "super::inventory_layers::Entity")]
    InventoryLayers,
}

impl Related<super::inventory_layers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryLayers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
