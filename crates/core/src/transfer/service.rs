//! Transfer workflow: moves stock between warehouses at FIFO cost.

use chrono::Utc;
use rust_decimal::Decimal;
use tally_shared::AppConfig;
use tally_shared::config::InTransitCancellationPolicy;
use tally_shared::types::{
    ItemId, JournalId, OrganizationId, TransferId, TransferItemId, UserId, round_money,
};
use tracing::info;
use uuid::Uuid;

use super::error::TransferError;
use super::state::TransferStateMachine;
use super::types::{CreateTransferInput, Transfer, TransferItem, TransferStatus};
use crate::inventory::service::active_warehouse;
use crate::inventory::{
    FifoCostingEngine, InboundInput, InventoryError, MovementType, OutboundInput,
    ReverseLayersInput, Warehouse, check_quantity,
};
use crate::ledger::{JournalEngine, JournalLineInput, JournalSource, LedgerError, PostJournalInput};
use crate::store::{DocumentKind, Store, StoreTx, TransferStore, finish};

/// Drives transfers through `draft → in_transit → completed`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferWorkflow {
    costing: FifoCostingEngine,
    journals: JournalEngine,
    in_transit_cancellation: InTransitCancellationPolicy,
}

impl TransferWorkflow {
    /// Creates a workflow with explicit collaborators.
    #[must_use]
    pub const fn new(
        costing: FifoCostingEngine,
        journals: JournalEngine,
        in_transit_cancellation: InTransitCancellationPolicy,
    ) -> Self {
        Self {
            costing,
            journals,
            in_transit_cancellation,
        }
    }

    /// Creates a workflow from the application configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, TransferError> {
        Ok(Self::new(
            FifoCostingEngine::new(),
            JournalEngine::from_config(&config.ledger)?,
            config.inventory.in_transit_cancellation,
        ))
    }

    // ========== Create ==========

    /// Creates a draft transfer with previewed item costs.
    pub async fn create_transfer<S: Store>(
        &self,
        store: &S,
        input: CreateTransferInput,
    ) -> Result<Transfer, TransferError> {
        let mut tx = store.begin().await?;
        let result = self.create_transfer_in(&mut tx, input).await;
        finish(tx, result).await
    }

    /// Creates a draft transfer inside the caller's transaction.
    ///
    /// Availability is checked at the source with a dry run; nothing moves
    /// until confirmation.
    pub async fn create_transfer_in<T: StoreTx>(
        &self,
        tx: &mut T,
        input: CreateTransferInput,
    ) -> Result<Transfer, TransferError> {
        if input.source_warehouse_id == input.destination_warehouse_id {
            return Err(TransferError::SameWarehouse(input.source_warehouse_id));
        }
        if input.items.is_empty() {
            return Err(TransferError::EmptyTransfer);
        }

        let mut merged: Vec<(ItemId, Decimal)> = Vec::with_capacity(input.items.len());
        for line in &input.items {
            check_quantity(line.quantity)?;
            match merged.iter_mut().find(|(item_id, _)| *item_id == line.item_id) {
                Some((_, quantity)) => *quantity += line.quantity,
                None => merged.push((line.item_id, line.quantity)),
            }
        }

        let org = input.organization_id;
        active_warehouse(tx, org, input.source_warehouse_id).await?;
        active_warehouse(tx, org, input.destination_warehouse_id).await?;

        let transfer_id = TransferId::new();
        let mut items = Vec::with_capacity(merged.len());
        for (item_id, quantity) in merged {
            let preview = self
                .costing
                .preview_outbound_in(tx, org, item_id, input.source_warehouse_id, quantity)
                .await?;
            if !preview.sufficient {
                return Err(InventoryError::InsufficientInventory {
                    item_id,
                    warehouse_id: input.source_warehouse_id,
                    available: preview.available,
                    requested: preview.requested,
                }
                .into());
            }
            items.push(TransferItem {
                id: TransferItemId::new(),
                transfer_id,
                item_id,
                quantity,
                unit_cost: preview.average_unit_cost,
                total_value: round_money(preview.total_cost),
            });
        }

        let sequence = tx
            .next_document_number(org, DocumentKind::Transfer)
            .await?;

        let transfer = Transfer {
            id: transfer_id,
            organization_id: org,
            transfer_number: DocumentKind::Transfer.format_number(sequence),
            source_warehouse_id: input.source_warehouse_id,
            destination_warehouse_id: input.destination_warehouse_id,
            transfer_date: input.transfer_date,
            status: TransferStatus::Draft,
            notes: input.notes,
            total_value: items.iter().map(|i| i.total_value).sum(),
            journal_id: None,
            reversal_journal_id: None,
            created_by: input.created_by,
            created_at: Utc::now(),
            confirmed_at: None,
            completed_at: None,
            cancelled_at: None,
            items,
        };

        let transfer = tx.insert_transfer(transfer).await?;

        info!(
            organization_id = %org,
            transfer_id = %transfer.id,
            transfer_number = %transfer.transfer_number,
            items = transfer.items.len(),
            "transfer created"
        );

        Ok(transfer)
    }

    // ========== Transitions ==========

    /// Moves the stock and, across cost centers, the value.
    pub async fn confirm_transfer<S: Store>(
        &self,
        store: &S,
        organization_id: OrganizationId,
        transfer_id: TransferId,
        confirmed_by: Option<UserId>,
    ) -> Result<Transfer, TransferError> {
        let mut tx = store.begin().await?;
        let result = self
            .confirm_transfer_in(&mut tx, organization_id, transfer_id, confirmed_by)
            .await;
        finish(tx, result).await
    }

    /// Confirms inside the caller's transaction.
    ///
    /// Per item, the source layers are consumed first and one destination
    /// layer is created per consumed slice at that slice's unit cost.
    pub async fn confirm_transfer_in<T: StoreTx>(
        &self,
        tx: &mut T,
        organization_id: OrganizationId,
        transfer_id: TransferId,
        confirmed_by: Option<UserId>,
    ) -> Result<Transfer, TransferError> {
        let mut transfer = lock(tx, organization_id, transfer_id).await?;
        let action = TransferStateMachine::confirm(transfer.status)?;

        let source = active_warehouse(tx, organization_id, transfer.source_warehouse_id).await?;
        let destination =
            active_warehouse(tx, organization_id, transfer.destination_warehouse_id).await?;
        let reference = Some(Uuid::from(transfer.id));

        for item in &mut transfer.items {
            let outbound = self
                .costing
                .record_outbound_in(
                    tx,
                    OutboundInput {
                        organization_id,
                        item_id: item.item_id,
                        warehouse_id: source.id,
                        quantity: item.quantity,
                        movement_type: MovementType::TransferOut,
                        reference_id: reference,
                        posting_date: transfer.transfer_date,
                    },
                )
                .await?;

            for slice in &outbound.slices {
                self.costing
                    .record_inbound_in(
                        tx,
                        InboundInput {
                            organization_id,
                            item_id: item.item_id,
                            warehouse_id: destination.id,
                            quantity: slice.quantity,
                            unit_cost: slice.unit_cost,
                            movement_type: MovementType::TransferIn,
                            reference_id: reference,
                            posting_date: transfer.transfer_date,
                        },
                    )
                    .await?;
            }

            item.unit_cost = outbound.average_unit_cost;
            item.total_value = round_money(outbound.total_cost);
        }

        transfer.total_value = transfer.items.iter().map(|i| i.total_value).sum();

        if source.cost_center != destination.cost_center && transfer.total_value > Decimal::ZERO {
            let journal_id = self
                .post_value_journal(
                    tx,
                    &transfer,
                    &source,
                    &destination,
                    JournalSource::InventoryTransfer,
                    confirmed_by,
                )
                .await?;
            transfer.journal_id = Some(journal_id);
        }

        action.apply(&mut transfer);
        tx.update_transfer(&transfer).await?;

        info!(
            organization_id = %organization_id,
            transfer_id = %transfer.id,
            total_value = %transfer.total_value,
            journal_id = ?transfer.journal_id,
            confirmed_by = ?confirmed_by,
            "transfer confirmed"
        );

        Ok(transfer)
    }

    /// Marks an in-transit transfer as received.
    pub async fn complete_transfer<S: Store>(
        &self,
        store: &S,
        organization_id: OrganizationId,
        transfer_id: TransferId,
        completed_by: Option<UserId>,
    ) -> Result<Transfer, TransferError> {
        let mut tx = store.begin().await?;
        let result = self
            .complete_transfer_in(&mut tx, organization_id, transfer_id, completed_by)
            .await;
        finish(tx, result).await
    }

    /// Completes inside the caller's transaction.
    pub async fn complete_transfer_in<T: StoreTx>(
        &self,
        tx: &mut T,
        organization_id: OrganizationId,
        transfer_id: TransferId,
        completed_by: Option<UserId>,
    ) -> Result<Transfer, TransferError> {
        let mut transfer = lock(tx, organization_id, transfer_id).await?;
        let action = TransferStateMachine::complete(transfer.status)?;
        action.apply(&mut transfer);
        tx.update_transfer(&transfer).await?;

        info!(
            organization_id = %organization_id,
            transfer_id = %transfer.id,
            completed_by = ?completed_by,
            "transfer completed"
        );

        Ok(transfer)
    }

    /// Cancels a draft, or an in-transit transfer when the policy allows.
    ///
    /// A cancelled draft is deleted; the returned value is its last state.
    pub async fn cancel_transfer<S: Store>(
        &self,
        store: &S,
        organization_id: OrganizationId,
        transfer_id: TransferId,
        cancelled_by: Option<UserId>,
    ) -> Result<Transfer, TransferError> {
        let mut tx = store.begin().await?;
        let result = self
            .cancel_transfer_in(&mut tx, organization_id, transfer_id, cancelled_by)
            .await;
        finish(tx, result).await
    }

    /// Cancels inside the caller's transaction.
    pub async fn cancel_transfer_in<T: StoreTx>(
        &self,
        tx: &mut T,
        organization_id: OrganizationId,
        transfer_id: TransferId,
        cancelled_by: Option<UserId>,
    ) -> Result<Transfer, TransferError> {
        let mut transfer = lock(tx, organization_id, transfer_id).await?;
        let action = TransferStateMachine::cancel(
            transfer.id,
            transfer.status,
            self.in_transit_cancellation,
        )?;

        let reverse_stock = action.reverses_stock();

        if reverse_stock {
            self.reverse_stock(tx, &mut transfer, cancelled_by).await?;
            action.apply(&mut transfer);
            tx.update_transfer(&transfer).await?;
        } else {
            tx.delete_transfer(organization_id, transfer.id).await?;
            action.apply(&mut transfer);
        }

        info!(
            organization_id = %organization_id,
            transfer_id = %transfer.id,
            reversed = reverse_stock,
            cancelled_by = ?cancelled_by,
            "transfer cancelled"
        );

        Ok(transfer)
    }

    /// Reads a transfer.
    pub async fn get_transfer<S: Store>(
        &self,
        store: &S,
        organization_id: OrganizationId,
        transfer_id: TransferId,
    ) -> Result<Transfer, TransferError> {
        let mut tx = store.begin_read_only().await?;
        let result = match tx.find_transfer(organization_id, transfer_id).await {
            Ok(Some(transfer)) => Ok(transfer),
            Ok(None) => Err(TransferError::TransferNotFound(transfer_id)),
            Err(e) => Err(e.into()),
        };
        finish(tx, result).await
    }

    // ========== Internals ==========

    /// Moves an in-transit transfer's stock back to the source at the
    /// unit costs it arrived with, and reverses its journal.
    async fn reverse_stock<T: StoreTx>(
        &self,
        tx: &mut T,
        transfer: &mut Transfer,
        cancelled_by: Option<UserId>,
    ) -> Result<(), TransferError> {
        let org = transfer.organization_id;
        let source = active_warehouse(tx, org, transfer.source_warehouse_id).await?;
        let destination = active_warehouse(tx, org, transfer.destination_warehouse_id).await?;
        let reference = Uuid::from(transfer.id);
        let today = Utc::now().date_naive();

        for item in &transfer.items {
            let slices = self
                .costing
                .reverse_layers_in(
                    tx,
                    ReverseLayersInput {
                        organization_id: org,
                        item_id: item.item_id,
                        warehouse_id: destination.id,
                        reference_id: reference,
                        movement_type: MovementType::TransferOut,
                        posting_date: today,
                    },
                )
                .await?;

            for slice in slices {
                self.costing
                    .record_inbound_in(
                        tx,
                        InboundInput {
                            organization_id: org,
                            item_id: item.item_id,
                            warehouse_id: source.id,
                            quantity: slice.quantity,
                            unit_cost: slice.unit_cost,
                            movement_type: MovementType::TransferIn,
                            reference_id: Some(reference),
                            posting_date: today,
                        },
                    )
                    .await?;
            }
        }

        if transfer.journal_id.is_some() {
            let journal_id = self
                .post_value_journal(
                    tx,
                    transfer,
                    &source,
                    &destination,
                    JournalSource::TransferReversal,
                    cancelled_by,
                )
                .await?;
            transfer.reversal_journal_id = Some(journal_id);
        }

        Ok(())
    }

    /// Posts the journal moving `total_value` between the two inventory
    /// accounts and re-checks it before the transaction commits.
    ///
    /// `InventoryTransfer` debits the destination and credits the source;
    /// `TransferReversal` does the opposite.
    async fn post_value_journal<T: StoreTx>(
        &self,
        tx: &mut T,
        transfer: &Transfer,
        source: &Warehouse,
        destination: &Warehouse,
        journal_source: JournalSource,
        posted_by: Option<UserId>,
    ) -> Result<JournalId, TransferError> {
        let source_account = source
            .inventory_account_id
            .ok_or(TransferError::MissingInventoryAccount(source.id))?;
        let destination_account = destination
            .inventory_account_id
            .ok_or(TransferError::MissingInventoryAccount(destination.id))?;

        let (debit_account, credit_account, date) = match journal_source {
            JournalSource::TransferReversal => {
                (source_account, destination_account, Utc::now().date_naive())
            }
            _ => (destination_account, source_account, transfer.transfer_date),
        };
        let amount = round_money(transfer.total_value);

        let journal = self
            .journals
            .post_journal_in(
                tx,
                PostJournalInput {
                    organization_id: transfer.organization_id,
                    date,
                    reference: Some(transfer.transfer_number.clone()),
                    source: journal_source,
                    lines: vec![
                        JournalLineInput::debit(debit_account, amount),
                        JournalLineInput::credit(credit_account, amount),
                    ],
                    created_by: posted_by,
                },
            )
            .await?;

        let check = self
            .journals
            .check_ledger_balance_in(tx, transfer.organization_id, journal.id)
            .await?;
        if !check.balanced {
            return Err(LedgerError::Unbalanced {
                debit: check.total_debit,
                credit: check.total_credit,
                difference: check.difference,
            }
            .into());
        }

        Ok(journal.id)
    }
}

async fn lock<T: TransferStore>(
    tx: &mut T,
    organization_id: OrganizationId,
    transfer_id: TransferId,
) -> Result<Transfer, TransferError> {
    tx.lock_transfer(organization_id, transfer_id)
        .await?
        .ok_or(TransferError::TransferNotFound(transfer_id))
}
