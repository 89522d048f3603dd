//! `SeaORM` entity definitions.

pub mod accounts;
pub mod document_sequences;
pub mod inventory_layers;
pub mod inventory_movements;
pub mod items;
pub mod journal_lines;
pub mod journals;
pub mod sea_orm_active_enums;
pub mod transfer_items;
pub mod transfers;
pub mod warehouses;
