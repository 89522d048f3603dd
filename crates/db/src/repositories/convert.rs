//! Conversions between `SeaORM` models and core types.

use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};

use tally_core::inventory::{CostLayer, InventoryMovement, Item, NewCostLayer, Warehouse};
use tally_core::ledger::{Account, Journal, JournalLine};
use tally_core::transfer::{Transfer, TransferItem};

use crate::entities::{
    accounts, inventory_layers, inventory_movements, items, journal_lines, journals,
    transfer_items, transfers, warehouses,
};

// ========== Ledger ==========

impl From<accounts::Model> for Account {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: model.id.into(),
            organization_id: model.organization_id.into(),
            code: model.code,
            name: model.name,
            account_type: model.account_type.into(),
            account_subtype: model.account_subtype.map(Into::into),
            is_active: model.is_active,
            is_system: model.is_system,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

pub(crate) fn account_active_model(account: &Account) -> accounts::ActiveModel {
    accounts::ActiveModel {
        id: Set(account.id.into_inner()),
        organization_id: Set(account.organization_id.into_inner()),
        code: Set(account.code.clone()),
        name: Set(account.name.clone()),
        account_type: Set(account.account_type.into()),
        account_subtype: Set(account.account_subtype.map(Into::into)),
        is_active: Set(account.is_active),
        is_system: Set(account.is_system),
        created_at: Set(account.created_at.into()),
    }
}

impl From<journal_lines::Model> for JournalLine {
    fn from(model: journal_lines::Model) -> Self {
        Self {
            id: model.id.into(),
            journal_id: model.journal_id.into(),
            line_number: model.line_number,
            account_id: model.account_id.into(),
            debit: model.debit,
            credit: model.credit,
            memo: model.memo,
        }
    }
}

/// Builds a journal from its header and lines; lines are sorted by number.
pub(crate) fn journal_from_models(
    header: journals::Model,
    mut lines: Vec<journal_lines::Model>,
) -> Journal {
    lines.sort_by_key(|line| line.line_number);
    Journal {
        id: header.id.into(),
        organization_id: header.organization_id.into(),
        journal_number: header.journal_number,
        date: header.journal_date,
        reference: header.reference,
        source: header.source.into(),
        total_debit: header.total_debit,
        total_credit: header.total_credit,
        created_by: header.created_by.map(Into::into),
        created_at: header.created_at.with_timezone(&Utc),
        lines: lines.into_iter().map(Into::into).collect(),
    }
}

pub(crate) fn journal_active_model(journal: &Journal) -> journals::ActiveModel {
    journals::ActiveModel {
        id: Set(journal.id.into_inner()),
        organization_id: Set(journal.organization_id.into_inner()),
        journal_number: Set(journal.journal_number.clone()),
        journal_date: Set(journal.date),
        reference: Set(journal.reference.clone()),
        source: Set(journal.source.into()),
        total_debit: Set(journal.total_debit),
        total_credit: Set(journal.total_credit),
        created_by: Set(journal.created_by.map(|id| id.into_inner())),
        created_at: Set(journal.created_at.into()),
    }
}

pub(crate) fn journal_line_active_model(
    journal: &Journal,
    line: &JournalLine,
) -> journal_lines::ActiveModel {
    journal_lines::ActiveModel {
        id: Set(line.id.into_inner()),
        journal_id: Set(journal.id.into_inner()),
        organization_id: Set(journal.organization_id.into_inner()),
        line_number: Set(line.line_number),
        account_id: Set(line.account_id.into_inner()),
        debit: Set(line.debit),
        credit: Set(line.credit),
        memo: Set(line.memo.clone()),
    }
}

// ========== Inventory ==========

impl From<warehouses::Model> for Warehouse {
    fn from(model: warehouses::Model) -> Self {
        Self {
            id: model.id.into(),
            organization_id: model.organization_id.into(),
            code: model.code,
            name: model.name,
            is_active: model.is_active,
            cost_center: model.cost_center,
            inventory_account_id: model.inventory_account_id.map(Into::into),
            negative_inventory_policy: model.negative_inventory_policy.into(),
        }
    }
}

impl From<items::Model> for Item {
    fn from(model: items::Model) -> Self {
        Self {
            id: model.id.into(),
            organization_id: model.organization_id.into(),
            sku: model.sku,
            name: model.name,
            is_active: model.is_active,
        }
    }
}

impl From<inventory_layers::Model> for CostLayer {
    fn from(model: inventory_layers::Model) -> Self {
        Self {
            id: model.id.into(),
            sequence: model.sequence,
            organization_id: model.organization_id.into(),
            item_id: model.item_id.into(),
            warehouse_id: model.warehouse_id.into(),
            quantity_original: model.quantity_original,
            quantity_remaining: model.quantity_remaining,
            unit_cost: model.unit_cost,
            movement_type: model.movement_type.into(),
            reference_id: model.reference_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// `sequence` is left to the column default.
pub(crate) fn layer_active_model(layer: &NewCostLayer) -> inventory_layers::ActiveModel {
    inventory_layers::ActiveModel {
        id: Set(layer.id.into_inner()),
        sequence: NotSet,
        organization_id: Set(layer.organization_id.into_inner()),
        item_id: Set(layer.item_id.into_inner()),
        warehouse_id: Set(layer.warehouse_id.into_inner()),
        quantity_original: Set(layer.quantity),
        quantity_remaining: Set(layer.quantity),
        unit_cost: Set(layer.unit_cost),
        movement_type: Set(layer.movement_type.into()),
        reference_id: Set(layer.reference_id),
        created_at: Set(layer.created_at.into()),
    }
}

impl From<inventory_movements::Model> for InventoryMovement {
    fn from(model: inventory_movements::Model) -> Self {
        Self {
            id: model.id.into(),
            organization_id: model.organization_id.into(),
            item_id: model.item_id.into(),
            warehouse_id: model.warehouse_id.into(),
            quantity: model.quantity,
            unit_cost: model.unit_cost,
            total_cost: model.total_cost,
            movement_type: model.movement_type.into(),
            reference_id: model.reference_id,
            posting_date: model.posting_date,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

pub(crate) fn movement_active_model(
    movement: &InventoryMovement,
) -> inventory_movements::ActiveModel {
    inventory_movements::ActiveModel {
        id: Set(movement.id.into_inner()),
        sequence: NotSet,
        organization_id: Set(movement.organization_id.into_inner()),
        item_id: Set(movement.item_id.into_inner()),
        warehouse_id: Set(movement.warehouse_id.into_inner()),
        quantity: Set(movement.quantity),
        unit_cost: Set(movement.unit_cost),
        total_cost: Set(movement.total_cost),
        movement_type: Set(movement.movement_type.into()),
        reference_id: Set(movement.reference_id),
        posting_date: Set(movement.posting_date),
        created_at: Set(movement.created_at.into()),
    }
}

// ========== Transfers ==========

impl From<transfer_items::Model> for TransferItem {
    fn from(model: transfer_items::Model) -> Self {
        Self {
            id: model.id.into(),
            transfer_id: model.transfer_id.into(),
            item_id: model.item_id.into(),
            quantity: model.quantity,
            unit_cost: model.unit_cost,
            total_value: model.total_value,
        }
    }
}

/// Builds a transfer from its header and items; items keep their line order.
pub(crate) fn transfer_from_models(
    header: transfers::Model,
    mut items: Vec<transfer_items::Model>,
) -> Transfer {
    items.sort_by_key(|item| item.line_number);
    Transfer {
        id: header.id.into(),
        organization_id: header.organization_id.into(),
        transfer_number: header.transfer_number,
        source_warehouse_id: header.source_warehouse_id.into(),
        destination_warehouse_id: header.destination_warehouse_id.into(),
        transfer_date: header.transfer_date,
        status: header.status.into(),
        notes: header.notes,
        total_value: header.total_value,
        journal_id: header.journal_id.map(Into::into),
        reversal_journal_id: header.reversal_journal_id.map(Into::into),
        created_by: header.created_by.map(Into::into),
        created_at: header.created_at.with_timezone(&Utc),
        confirmed_at: header.confirmed_at.map(|at| at.with_timezone(&Utc)),
        completed_at: header.completed_at.map(|at| at.with_timezone(&Utc)),
        cancelled_at: header.cancelled_at.map(|at| at.with_timezone(&Utc)),
        items: items.into_iter().map(Into::into).collect(),
    }
}

pub(crate) fn transfer_active_model(transfer: &Transfer) -> transfers::ActiveModel {
    transfers::ActiveModel {
        id: Set(transfer.id.into_inner()),
        organization_id: Set(transfer.organization_id.into_inner()),
        transfer_number: Set(transfer.transfer_number.clone()),
        source_warehouse_id: Set(transfer.source_warehouse_id.into_inner()),
        destination_warehouse_id: Set(transfer.destination_warehouse_id.into_inner()),
        transfer_date: Set(transfer.transfer_date),
        status: Set(transfer.status.into()),
        notes: Set(transfer.notes.clone()),
        total_value: Set(transfer.total_value),
        journal_id: Set(transfer.journal_id.map(|id| id.into_inner())),
        reversal_journal_id: Set(transfer.reversal_journal_id.map(|id| id.into_inner())),
        created_by: Set(transfer.created_by.map(|id| id.into_inner())),
        created_at: Set(transfer.created_at.into()),
        confirmed_at: Set(transfer.confirmed_at.map(Into::into)),
        completed_at: Set(transfer.completed_at.map(Into::into)),
        cancelled_at: Set(transfer.cancelled_at.map(Into::into)),
    }
}

pub(crate) fn transfer_item_active_model(
    line_number: i32,
    item: &TransferItem,
) -> transfer_items::ActiveModel {
    transfer_items::ActiveModel {
        id: Set(item.id.into_inner()),
        transfer_id: Set(item.transfer_id.into_inner()),
        line_number: Set(line_number),
        item_id: Set(item.item_id.into_inner()),
        quantity: Set(item.quantity),
        unit_cost: Set(item.unit_cost),
        total_value: Set(item.total_value),
    }
}
