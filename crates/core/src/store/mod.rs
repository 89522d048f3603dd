//! Storage traits for the engines.
//!
//! Every engine operation runs inside one [`StoreTx`]. The PostgreSQL
//! implementation lives in `tally-db`; [`MemoryStore`] keeps everything in
//! process behind a single writer lock.
//!
//! Implementations must scope every lookup by organization: a row owned by
//! another organization is reported as absent.

pub mod error;
pub mod memory;

pub use error::StoreError;
pub use memory::{MemoryStore, MemoryTx};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::types::{
    AccountId, CostLayerId, ItemId, JournalId, OrganizationId, TransferId, WarehouseId,
};
use tracing::warn;
use uuid::Uuid;

use crate::inventory::{CostLayer, InventoryMovement, Item, NewCostLayer, Warehouse};
use crate::ledger::{Account, Journal, JournalLine, JournalSource};
use crate::reports::{AccountEntry, AccountTotals};
use crate::transfer::Transfer;

/// Kind of human-readable document number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Journal numbers (`JV-000001`).
    Journal,
    /// Transfer numbers (`TR-000001`).
    Transfer,
}

impl DocumentKind {
    /// Returns the string stored in the sequence table.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Journal => "journal",
            Self::Transfer => "transfer",
        }
    }

    /// Number prefix.
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Journal => "JV",
            Self::Transfer => "TR",
        }
    }

    /// Formats a sequence value, zero-padded to six digits.
    #[must_use]
    pub fn format_number(&self, value: i64) -> String {
        format!("{}-{value:06}", self.prefix())
    }
}

/// Per-organization document counters.
#[async_trait]
pub trait DocumentSequence: Send {
    /// Allocates the next value (starting at 1) for `kind`.
    async fn next_document_number(
        &mut self,
        organization_id: OrganizationId,
        kind: DocumentKind,
    ) -> Result<i64, StoreError>;
}

/// Accounts, journals and journal lines.
#[async_trait]
pub trait LedgerStore: DocumentSequence {
    /// Finds an account by ID.
    async fn find_account(
        &mut self,
        organization_id: OrganizationId,
        account_id: AccountId,
    ) -> Result<Option<Account>, StoreError>;

    /// Finds an account by code.
    async fn find_account_by_code(
        &mut self,
        organization_id: OrganizationId,
        code: &str,
    ) -> Result<Option<Account>, StoreError>;

    /// Inserts an account. If the code is already taken in the
    /// organization, the existing account is returned unchanged.
    async fn insert_account(&mut self, account: Account) -> Result<Account, StoreError>;

    /// Inserts a journal header and all of its lines.
    async fn insert_journal(&mut self, journal: Journal) -> Result<Journal, StoreError>;

    /// Finds a journal (with lines) by ID.
    async fn find_journal(
        &mut self,
        organization_id: OrganizationId,
        journal_id: JournalId,
    ) -> Result<Option<Journal>, StoreError>;

    /// Reads the persisted lines of a journal, ordered by line number.
    async fn journal_lines(
        &mut self,
        organization_id: OrganizationId,
        journal_id: JournalId,
    ) -> Result<Vec<JournalLine>, StoreError>;

    /// All journals (with lines) of one source, ordered by number.
    async fn journals_by_source(
        &mut self,
        organization_id: OrganizationId,
        source: JournalSource,
    ) -> Result<Vec<Journal>, StoreError>;

    /// Debit/credit sums per account over lines dated on or before `as_of`.
    ///
    /// Accounts without lines in range are included with zero totals.
    async fn account_totals(
        &mut self,
        organization_id: OrganizationId,
        as_of: NaiveDate,
    ) -> Result<Vec<AccountTotals>, StoreError>;

    /// Lines posted to one account dated on or before `to`, in posting order.
    async fn account_entries(
        &mut self,
        organization_id: OrganizationId,
        account_id: AccountId,
        to: NaiveDate,
    ) -> Result<Vec<AccountEntry>, StoreError>;
}

/// Warehouses, items, cost layers and movements.
#[async_trait]
pub trait InventoryStore: Send {
    /// Finds a warehouse by ID.
    async fn find_warehouse(
        &mut self,
        organization_id: OrganizationId,
        warehouse_id: WarehouseId,
    ) -> Result<Option<Warehouse>, StoreError>;

    /// Finds an item by ID.
    async fn find_item(
        &mut self,
        organization_id: OrganizationId,
        item_id: ItemId,
    ) -> Result<Option<Item>, StoreError>;

    /// Layers with remaining quantity, oldest first, without locking.
    async fn open_layers(
        &mut self,
        organization_id: OrganizationId,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<CostLayer>, StoreError>;

    /// Layers with remaining quantity, oldest first, locked until the
    /// transaction ends.
    async fn lock_open_layers(
        &mut self,
        organization_id: OrganizationId,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<CostLayer>, StoreError>;

    /// Layers created by `reference_id`, oldest first, locked until the
    /// transaction ends.
    async fn lock_layers_by_reference(
        &mut self,
        organization_id: OrganizationId,
        item_id: ItemId,
        warehouse_id: WarehouseId,
        reference_id: Uuid,
    ) -> Result<Vec<CostLayer>, StoreError>;

    /// Unit cost of the newest layer, consumed or not.
    async fn latest_unit_cost(
        &mut self,
        organization_id: OrganizationId,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<Option<Decimal>, StoreError>;

    /// Inserts a layer; the store assigns its insertion sequence.
    async fn insert_layer(&mut self, layer: NewCostLayer) -> Result<CostLayer, StoreError>;

    /// Overwrites the remaining quantity of a layer.
    async fn set_layer_remaining(
        &mut self,
        organization_id: OrganizationId,
        layer_id: CostLayerId,
        quantity_remaining: Decimal,
    ) -> Result<(), StoreError>;

    /// Appends a movement.
    async fn insert_movement(
        &mut self,
        movement: InventoryMovement,
    ) -> Result<InventoryMovement, StoreError>;

    /// Every layer (including exhausted ones), oldest first.
    async fn list_layers(
        &mut self,
        organization_id: OrganizationId,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<CostLayer>, StoreError>;

    /// Every movement, in insertion order.
    async fn list_movements(
        &mut self,
        organization_id: OrganizationId,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<InventoryMovement>, StoreError>;
}

/// Transfers and their items.
#[async_trait]
pub trait TransferStore: DocumentSequence {
    /// Inserts a transfer with its items.
    async fn insert_transfer(&mut self, transfer: Transfer) -> Result<Transfer, StoreError>;

    /// Finds a transfer (with items) by ID.
    async fn find_transfer(
        &mut self,
        organization_id: OrganizationId,
        transfer_id: TransferId,
    ) -> Result<Option<Transfer>, StoreError>;

    /// Finds a transfer and locks its row until the transaction ends.
    async fn lock_transfer(
        &mut self,
        organization_id: OrganizationId,
        transfer_id: TransferId,
    ) -> Result<Option<Transfer>, StoreError>;

    /// Persists the header and item costs of an existing transfer.
    async fn update_transfer(&mut self, transfer: &Transfer) -> Result<(), StoreError>;

    /// Deletes a transfer and its items.
    async fn delete_transfer(
        &mut self,
        organization_id: OrganizationId,
        transfer_id: TransferId,
    ) -> Result<(), StoreError>;
}

/// One open transaction. Dropping it without commit discards its writes.
#[async_trait]
pub trait StoreTx: LedgerStore + InventoryStore + TransferStore + Send + Sized {
    /// Makes every write of the transaction visible.
    async fn commit(self) -> Result<(), StoreError>;

    /// Discards every write of the transaction.
    async fn rollback(self) -> Result<(), StoreError>;
}

/// Source of transactions.
#[async_trait]
pub trait Store: Send + Sync {
    /// Transaction type.
    type Tx: StoreTx;

    /// Begins a read-write transaction.
    async fn begin(&self) -> Result<Self::Tx, StoreError>;

    /// Begins a read-only transaction over a consistent snapshot.
    async fn begin_read_only(&self) -> Result<Self::Tx, StoreError>;
}

/// Commits on `Ok`, rolls back on `Err` and returns `result` either way.
///
/// A failed commit replaces the result; a failed rollback is only logged
/// since the original error is the one the caller needs.
pub async fn finish<T, R, E>(tx: T, result: Result<R, E>) -> Result<R, E>
where
    T: StoreTx,
    E: From<StoreError>,
{
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_number_format() {
        assert_eq!(DocumentKind::Journal.format_number(1), "JV-000001");
        assert_eq!(DocumentKind::Transfer.format_number(42), "TR-000042");
        assert_eq!(DocumentKind::Journal.format_number(1_234_567), "JV-1234567");
    }
}
