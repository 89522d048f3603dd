//! In-process store.
//!
//! A single `tokio` mutex serializes transactions. Each transaction works on
//! a copy of the state and writes it back on commit, so a dropped or rolled
//! back transaction leaves nothing behind.

use std::collections::HashMap;
#[cfg(test)]
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::types::{
    AccountId, CostLayerId, ItemId, JournalId, OrganizationId, TransferId, WarehouseId,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{
    DocumentKind, DocumentSequence, InventoryStore, LedgerStore, Store, StoreError, StoreTx,
    TransferStore,
};
use crate::inventory::{CostLayer, InventoryMovement, Item, NewCostLayer, Warehouse};
use crate::invariant::DebitCreditTotals;
use crate::ledger::{Account, Journal, JournalLine, JournalSource};
use crate::reports::{AccountEntry, AccountTotals};
use crate::transfer::Transfer;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct MemoryState {
    accounts: HashMap<AccountId, Account>,
    journals: Vec<Journal>,
    warehouses: HashMap<WarehouseId, Warehouse>,
    items: HashMap<ItemId, Item>,
    layers: Vec<CostLayer>,
    movements: Vec<InventoryMovement>,
    transfers: HashMap<TransferId, Transfer>,
    sequences: HashMap<(OrganizationId, DocumentKind), i64>,
    next_layer_sequence: i64,
    #[cfg(test)]
    failing_layer_warehouses: HashSet<WarehouseId>,
}

impl MemoryState {
    fn layers_for(
        &self,
        organization_id: OrganizationId,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Vec<CostLayer> {
        let mut layers: Vec<CostLayer> = self
            .layers
            .iter()
            .filter(|l| {
                l.organization_id == organization_id
                    && l.item_id == item_id
                    && l.warehouse_id == warehouse_id
            })
            .cloned()
            .collect();
        layers.sort_by_key(|l| (l.created_at, l.sequence));
        layers
    }
}

/// In-memory implementation of [`Store`].
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an account.
    pub async fn add_account(&self, account: Account) {
        self.state.lock().await.accounts.insert(account.id, account);
    }

    /// Adds (or replaces) a warehouse.
    pub async fn add_warehouse(&self, warehouse: Warehouse) {
        self.state
            .lock()
            .await
            .warehouses
            .insert(warehouse.id, warehouse);
    }

    /// Adds (or replaces) an item.
    pub async fn add_item(&self, item: Item) {
        self.state.lock().await.items.insert(item.id, item);
    }

    /// Makes every later layer insert into `warehouse_id` fail.
    #[cfg(test)]
    pub(crate) async fn fail_layer_inserts_into(&self, warehouse_id: WarehouseId) {
        self.state
            .lock()
            .await
            .failing_layer_warehouses
            .insert(warehouse_id);
    }

    /// Copy of the committed state.
    #[cfg(test)]
    pub(crate) async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        Ok(MemoryTx::open(Arc::clone(&self.state), false).await)
    }

    async fn begin_read_only(&self) -> Result<MemoryTx, StoreError> {
        Ok(MemoryTx::open(Arc::clone(&self.state), true).await)
    }
}

/// Transaction over a [`MemoryStore`].
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    read_only: bool,
}

impl MemoryTx {
    async fn open(state: Arc<Mutex<MemoryState>>, read_only: bool) -> Self {
        let guard = state.lock_owned().await;
        let working = guard.clone();
        Self {
            guard,
            working,
            read_only,
        }
    }

    fn writable(&mut self) -> Result<&mut MemoryState, StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        Ok(&mut self.working)
    }
}

#[async_trait]
impl DocumentSequence for MemoryTx {
    async fn next_document_number(
        &mut self,
        organization_id: OrganizationId,
        kind: DocumentKind,
    ) -> Result<i64, StoreError> {
        let state = self.writable()?;
        let counter = state.sequences.entry((organization_id, kind)).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}

#[async_trait]
impl LedgerStore for MemoryTx {
    async fn find_account(
        &mut self,
        organization_id: OrganizationId,
        account_id: AccountId,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self
            .working
            .accounts
            .get(&account_id)
            .filter(|a| a.organization_id == organization_id)
            .cloned())
    }

    async fn find_account_by_code(
        &mut self,
        organization_id: OrganizationId,
        code: &str,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self
            .working
            .accounts
            .values()
            .find(|a| a.organization_id == organization_id && a.code == code)
            .cloned())
    }

    async fn insert_account(&mut self, account: Account) -> Result<Account, StoreError> {
        let state = self.writable()?;
        if let Some(existing) = state
            .accounts
            .values()
            .find(|a| a.organization_id == account.organization_id && a.code == account.code)
        {
            return Ok(existing.clone());
        }
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn insert_journal(&mut self, journal: Journal) -> Result<Journal, StoreError> {
        self.writable()?.journals.push(journal.clone());
        Ok(journal)
    }

    async fn find_journal(
        &mut self,
        organization_id: OrganizationId,
        journal_id: JournalId,
    ) -> Result<Option<Journal>, StoreError> {
        Ok(self
            .working
            .journals
            .iter()
            .find(|j| j.id == journal_id && j.organization_id == organization_id)
            .cloned())
    }

    async fn journal_lines(
        &mut self,
        organization_id: OrganizationId,
        journal_id: JournalId,
    ) -> Result<Vec<JournalLine>, StoreError> {
        let mut lines = self
            .find_journal(organization_id, journal_id)
            .await?
            .map(|j| j.lines)
            .unwrap_or_default();
        lines.sort_by_key(|l| l.line_number);
        Ok(lines)
    }

    async fn journals_by_source(
        &mut self,
        organization_id: OrganizationId,
        source: JournalSource,
    ) -> Result<Vec<Journal>, StoreError> {
        let mut journals: Vec<Journal> = self
            .working
            .journals
            .iter()
            .filter(|j| j.organization_id == organization_id && j.source == source)
            .cloned()
            .collect();
        journals.sort_by(|a, b| a.journal_number.cmp(&b.journal_number));
        Ok(journals)
    }

    async fn account_totals(
        &mut self,
        organization_id: OrganizationId,
        as_of: NaiveDate,
    ) -> Result<Vec<AccountTotals>, StoreError> {
        let mut sums: HashMap<AccountId, DebitCreditTotals> = HashMap::new();
        for journal in self
            .working
            .journals
            .iter()
            .filter(|j| j.organization_id == organization_id && j.date <= as_of)
        {
            for line in &journal.lines {
                sums.entry(line.account_id)
                    .or_default()
                    .add(line.debit, line.credit);
            }
        }

        let mut rows: Vec<AccountTotals> = self
            .working
            .accounts
            .values()
            .filter(|a| a.organization_id == organization_id)
            .map(|account| AccountTotals {
                totals: sums.get(&account.id).copied().unwrap_or_default(),
                account: account.clone(),
            })
            .collect();
        rows.sort_by(|a, b| a.account.code.cmp(&b.account.code));
        Ok(rows)
    }

    async fn account_entries(
        &mut self,
        organization_id: OrganizationId,
        account_id: AccountId,
        to: NaiveDate,
    ) -> Result<Vec<AccountEntry>, StoreError> {
        let mut entries: Vec<AccountEntry> = self
            .working
            .journals
            .iter()
            .filter(|j| j.organization_id == organization_id && j.date <= to)
            .flat_map(|journal| {
                journal
                    .lines
                    .iter()
                    .filter(|l| l.account_id == account_id)
                    .map(|line| AccountEntry {
                        journal_id: journal.id,
                        journal_number: journal.journal_number.clone(),
                        date: journal.date,
                        reference: journal.reference.clone(),
                        line_number: line.line_number,
                        debit: line.debit,
                        credit: line.credit,
                        memo: line.memo.clone(),
                        posted_at: journal.created_at,
                    })
            })
            .collect();
        entries.sort_by(|a, b| {
            (a.date, a.posted_at, &a.journal_number, a.line_number).cmp(&(
                b.date,
                b.posted_at,
                &b.journal_number,
                b.line_number,
            ))
        });
        Ok(entries)
    }
}

#[async_trait]
impl InventoryStore for MemoryTx {
    async fn find_warehouse(
        &mut self,
        organization_id: OrganizationId,
        warehouse_id: WarehouseId,
    ) -> Result<Option<Warehouse>, StoreError> {
        Ok(self
            .working
            .warehouses
            .get(&warehouse_id)
            .filter(|w| w.organization_id == organization_id)
            .cloned())
    }

    async fn find_item(
        &mut self,
        organization_id: OrganizationId,
        item_id: ItemId,
    ) -> Result<Option<Item>, StoreError> {
        Ok(self
            .working
            .items
            .get(&item_id)
            .filter(|i| i.organization_id == organization_id)
            .cloned())
    }

    async fn open_layers(
        &mut self,
        organization_id: OrganizationId,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<CostLayer>, StoreError> {
        let mut layers = self
            .working
            .layers_for(organization_id, item_id, warehouse_id);
        layers.retain(|l| l.quantity_remaining > Decimal::ZERO);
        Ok(layers)
    }

    async fn lock_open_layers(
        &mut self,
        organization_id: OrganizationId,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<CostLayer>, StoreError> {
        // The transaction already holds the store-wide lock.
        self.open_layers(organization_id, item_id, warehouse_id)
            .await
    }

    async fn lock_layers_by_reference(
        &mut self,
        organization_id: OrganizationId,
        item_id: ItemId,
        warehouse_id: WarehouseId,
        reference_id: Uuid,
    ) -> Result<Vec<CostLayer>, StoreError> {
        let mut layers = self
            .working
            .layers_for(organization_id, item_id, warehouse_id);
        layers.retain(|l| l.reference_id == Some(reference_id));
        Ok(layers)
    }

    async fn latest_unit_cost(
        &mut self,
        organization_id: OrganizationId,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<Option<Decimal>, StoreError> {
        Ok(self
            .working
            .layers_for(organization_id, item_id, warehouse_id)
            .last()
            .map(|l| l.unit_cost))
    }

    async fn insert_layer(&mut self, layer: NewCostLayer) -> Result<CostLayer, StoreError> {
        let state = self.writable()?;
        #[cfg(test)]
        if state.failing_layer_warehouses.contains(&layer.warehouse_id) {
            return Err(StoreError::Database(format!(
                "layer insert into warehouse {} refused",
                layer.warehouse_id
            )));
        }
        state.next_layer_sequence += 1;
        let layer = layer.into_layer(state.next_layer_sequence);
        state.layers.push(layer.clone());
        Ok(layer)
    }

    async fn set_layer_remaining(
        &mut self,
        organization_id: OrganizationId,
        layer_id: CostLayerId,
        quantity_remaining: Decimal,
    ) -> Result<(), StoreError> {
        let layer = self
            .writable()?
            .layers
            .iter_mut()
            .find(|l| l.id == layer_id && l.organization_id == organization_id)
            .ok_or_else(|| StoreError::Internal(format!("cost layer {layer_id} not found")))?;
        layer.quantity_remaining = quantity_remaining;
        Ok(())
    }

    async fn insert_movement(
        &mut self,
        movement: InventoryMovement,
    ) -> Result<InventoryMovement, StoreError> {
        self.writable()?.movements.push(movement.clone());
        Ok(movement)
    }

    async fn list_layers(
        &mut self,
        organization_id: OrganizationId,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<CostLayer>, StoreError> {
        Ok(self
            .working
            .layers_for(organization_id, item_id, warehouse_id))
    }

    async fn list_movements(
        &mut self,
        organization_id: OrganizationId,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<InventoryMovement>, StoreError> {
        Ok(self
            .working
            .movements
            .iter()
            .filter(|m| {
                m.organization_id == organization_id
                    && m.item_id == item_id
                    && m.warehouse_id == warehouse_id
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TransferStore for MemoryTx {
    async fn insert_transfer(&mut self, transfer: Transfer) -> Result<Transfer, StoreError> {
        self.writable()?
            .transfers
            .insert(transfer.id, transfer.clone());
        Ok(transfer)
    }

    async fn find_transfer(
        &mut self,
        organization_id: OrganizationId,
        transfer_id: TransferId,
    ) -> Result<Option<Transfer>, StoreError> {
        Ok(self
            .working
            .transfers
            .get(&transfer_id)
            .filter(|t| t.organization_id == organization_id)
            .cloned())
    }

    async fn lock_transfer(
        &mut self,
        organization_id: OrganizationId,
        transfer_id: TransferId,
    ) -> Result<Option<Transfer>, StoreError> {
        self.find_transfer(organization_id, transfer_id).await
    }

    async fn update_transfer(&mut self, transfer: &Transfer) -> Result<(), StoreError> {
        let slot = self
            .writable()?
            .transfers
            .get_mut(&transfer.id)
            .filter(|t| t.organization_id == transfer.organization_id)
            .ok_or_else(|| StoreError::Internal(format!("transfer {} not found", transfer.id)))?;
        *slot = transfer.clone();
        Ok(())
    }

    async fn delete_transfer(
        &mut self,
        organization_id: OrganizationId,
        transfer_id: TransferId,
    ) -> Result<(), StoreError> {
        let state = self.writable()?;
        if state
            .transfers
            .get(&transfer_id)
            .is_some_and(|t| t.organization_id == organization_id)
        {
            state.transfers.remove(&transfer_id);
        }
        Ok(())
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn commit(self) -> Result<(), StoreError> {
        let Self {
            mut guard,
            working,
            read_only,
        } = self;
        if !read_only {
            *guard = working;
        }
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}
