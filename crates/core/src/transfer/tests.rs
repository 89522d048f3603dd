//! Transfer workflow behavior against the in-memory store.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_shared::config::InTransitCancellationPolicy;
use tally_shared::types::{ItemId, OrganizationId, UserId};

use super::*;
use crate::error::ErrorKind;
use crate::inventory::{
    CostLayer, FifoCostingEngine, InboundInput, Item, MovementType, OutboundInput, Warehouse,
};
use crate::ledger::{Account, AccountType, JournalEngine, JournalSource};
use crate::store::{InventoryStore, LedgerStore, MemoryStore, Store};
use crate::test_support::{date, seed_account, seed_item, seed_warehouse};

struct Depots {
    store: MemoryStore,
    org: OrganizationId,
    source: Warehouse,
    destination: Warehouse,
    item: Item,
    source_stock: Account,
    destination_stock: Account,
}

async fn depots() -> Depots {
    let store = MemoryStore::new();
    let org = OrganizationId::new();
    let source = seed_warehouse(&store, org, "SRC").await;
    let destination = seed_warehouse(&store, org, "DST").await;
    let item = seed_item(&store, org, "SKU-1").await;
    let source_stock = seed_account(&store, org, "1310", AccountType::Asset).await;
    let destination_stock = seed_account(&store, org, "1320", AccountType::Asset).await;

    let costing = FifoCostingEngine::new();
    for (quantity, unit_cost) in [(dec!(10), dec!(2)), (dec!(10), dec!(3))] {
        costing
            .record_inbound(
                &store,
                InboundInput {
                    organization_id: org,
                    item_id: item.id,
                    warehouse_id: source.id,
                    quantity,
                    unit_cost,
                    movement_type: MovementType::Purchase,
                    reference_id: None,
                    posting_date: date(2024, 4, 1),
                },
            )
            .await
            .unwrap();
    }

    Depots {
        store,
        org,
        source,
        destination,
        item,
        source_stock,
        destination_stock,
    }
}

/// Puts the two warehouses in different cost centers with their own
/// inventory accounts.
async fn split_cost_centers(depots: &mut Depots) {
    depots.source.cost_center = Some("CC-NORTH".to_string());
    depots.source.inventory_account_id = Some(depots.source_stock.id);
    depots.destination.cost_center = Some("CC-SOUTH".to_string());
    depots.destination.inventory_account_id = Some(depots.destination_stock.id);
    depots.store.add_warehouse(depots.source.clone()).await;
    depots.store.add_warehouse(depots.destination.clone()).await;
}

fn request(depots: &Depots, quantity: Decimal) -> CreateTransferInput {
    CreateTransferInput {
        organization_id: depots.org,
        source_warehouse_id: depots.source.id,
        destination_warehouse_id: depots.destination.id,
        transfer_date: date(2024, 4, 10),
        notes: Some("restock south".to_string()),
        items: vec![TransferItemInput {
            item_id: depots.item.id,
            quantity,
        }],
        created_by: Some(UserId::new()),
    }
}

fn reversing_workflow() -> TransferWorkflow {
    TransferWorkflow::new(
        FifoCostingEngine::new(),
        JournalEngine::default(),
        InTransitCancellationPolicy::ReverseTransferLayers,
    )
}

async fn layers_at(depots: &Depots, warehouse: &Warehouse) -> Vec<CostLayer> {
    let mut tx = depots.store.begin_read_only().await.unwrap();
    tx.list_layers(depots.org, depots.item.id, warehouse.id)
        .await
        .unwrap()
}

async fn on_hand(depots: &Depots, warehouse: &Warehouse) -> Decimal {
    layers_at(depots, warehouse)
        .await
        .iter()
        .map(|l| l.quantity_remaining)
        .sum()
}

async fn draft(depots: &Depots, workflow: &TransferWorkflow, quantity: Decimal) -> Transfer {
    workflow
        .create_transfer(&depots.store, request(depots, quantity))
        .await
        .unwrap()
}

// ========== Create ==========

#[tokio::test]
async fn test_create_transfer_previews_cost_without_moving_stock() {
    let depots = depots().await;
    let workflow = TransferWorkflow::default();

    let mut input = request(&depots, dec!(5));
    input.items.push(TransferItemInput {
        item_id: depots.item.id,
        quantity: dec!(10),
    });
    let transfer = workflow.create_transfer(&depots.store, input).await.unwrap();

    assert_eq!(transfer.transfer_number, "TR-000001");
    assert_eq!(transfer.status, TransferStatus::Draft);
    assert_eq!(transfer.items.len(), 1);
    assert_eq!(transfer.items[0].quantity, dec!(15));
    assert_eq!(transfer.items[0].unit_cost, dec!(2.333333));
    assert_eq!(transfer.total_value, dec!(35));
    assert_eq!(on_hand(&depots, &depots.source).await, dec!(20));
    assert!(layers_at(&depots, &depots.destination).await.is_empty());

    let stored = workflow
        .get_transfer(&depots.store, depots.org, transfer.id)
        .await
        .unwrap();
    assert_eq!(stored, transfer);
}

#[tokio::test]
async fn test_create_rejects_same_warehouse_and_empty_items() {
    let depots = depots().await;
    let workflow = TransferWorkflow::default();

    let mut input = request(&depots, dec!(1));
    input.destination_warehouse_id = depots.source.id;
    let err = workflow.create_transfer(&depots.store, input).await.unwrap_err();
    assert!(matches!(err, TransferError::SameWarehouse(_)));

    let mut input = request(&depots, dec!(1));
    input.items.clear();
    let err = workflow.create_transfer(&depots.store, input).await.unwrap_err();
    assert!(matches!(err, TransferError::EmptyTransfer));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_create_rejects_bad_quantities_and_items() {
    let depots = depots().await;
    let workflow = TransferWorkflow::default();

    let err = workflow
        .create_transfer(&depots.store, request(&depots, Decimal::ZERO))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidQuantity);

    let err = workflow
        .create_transfer(&depots.store, request(&depots, dec!(1.0000004)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidQuantity);

    let mut input = request(&depots, dec!(1));
    input.items[0].item_id = ItemId::new();
    let err = workflow.create_transfer(&depots.store, input).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_create_checks_availability_at_source() {
    let depots = depots().await;
    let err = TransferWorkflow::default()
        .create_transfer(&depots.store, request(&depots, dec!(25)))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientInventory);
    assert!(matches!(
        err,
        TransferError::Inventory(crate::inventory::InventoryError::InsufficientInventory {
            available,
            requested,
            ..
        }) if available == dec!(20) && requested == dec!(25)
    ));
}

#[tokio::test]
async fn test_create_rejects_inactive_destination() {
    let mut depots = depots().await;
    depots.destination.is_active = false;
    depots.store.add_warehouse(depots.destination.clone()).await;

    let err = TransferWorkflow::default()
        .create_transfer(&depots.store, request(&depots, dec!(1)))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "WAREHOUSE_INACTIVE");
}

// ========== Confirm ==========

#[tokio::test]
async fn test_confirm_moves_layers_at_fifo_cost() {
    let depots = depots().await;
    let workflow = TransferWorkflow::default();
    let transfer = draft(&depots, &workflow, dec!(15)).await;

    let confirmed = workflow
        .confirm_transfer(&depots.store, depots.org, transfer.id, None)
        .await
        .unwrap();

    assert_eq!(confirmed.status, TransferStatus::InTransit);
    assert!(confirmed.confirmed_at.is_some());
    assert_eq!(confirmed.items[0].total_value, dec!(35));
    assert_eq!(confirmed.total_value, dec!(35));
    // Same cost center: no journal.
    assert_eq!(confirmed.journal_id, None);

    assert_eq!(on_hand(&depots, &depots.source).await, dec!(5));

    let arrived = layers_at(&depots, &depots.destination).await;
    let costs: Vec<(Decimal, Decimal)> = arrived
        .iter()
        .map(|l| (l.quantity_original, l.unit_cost))
        .collect();
    assert_eq!(costs, vec![(dec!(10), dec!(2)), (dec!(5), dec!(3))]);
    assert!(
        arrived
            .iter()
            .all(|l| l.movement_type == MovementType::TransferIn)
    );
}

#[tokio::test]
async fn test_confirm_across_cost_centers_posts_balanced_journal() {
    let mut depots = depots().await;
    split_cost_centers(&mut depots).await;
    let workflow = TransferWorkflow::default();
    let transfer = draft(&depots, &workflow, dec!(15)).await;

    let confirmed = workflow
        .confirm_transfer(&depots.store, depots.org, transfer.id, None)
        .await
        .unwrap();
    let journal_id = confirmed.journal_id.unwrap();

    let mut tx = depots.store.begin_read_only().await.unwrap();
    let journal = tx.find_journal(depots.org, journal_id).await.unwrap().unwrap();
    assert_eq!(journal.source, JournalSource::InventoryTransfer);
    assert_eq!(journal.reference.as_deref(), Some("TR-000001"));
    assert_eq!(journal.lines[0].account_id, depots.destination_stock.id);
    assert_eq!(journal.lines[0].debit, dec!(35));
    assert_eq!(journal.lines[1].account_id, depots.source_stock.id);
    assert_eq!(journal.lines[1].credit, dec!(35));
    drop(tx);

    let check = JournalEngine::default()
        .check_ledger_balance(&depots.store, depots.org, journal_id)
        .await
        .unwrap();
    assert!(check.balanced);
}

#[tokio::test]
async fn test_confirm_without_inventory_account_changes_nothing() {
    let mut depots = depots().await;
    split_cost_centers(&mut depots).await;
    depots.destination.inventory_account_id = None;
    depots.store.add_warehouse(depots.destination.clone()).await;
    let workflow = TransferWorkflow::default();
    let transfer = draft(&depots, &workflow, dec!(5)).await;
    let before = depots.store.snapshot().await;

    let err = workflow
        .confirm_transfer(&depots.store, depots.org, transfer.id, None)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::MissingInventoryAccount(id) if id == depots.destination.id));
    assert_eq!(depots.store.snapshot().await, before);
}

#[tokio::test]
async fn test_confirm_is_atomic_when_inbound_fails() {
    let depots = depots().await;
    let workflow = TransferWorkflow::default();
    let transfer = draft(&depots, &workflow, dec!(15)).await;
    depots
        .store
        .fail_layer_inserts_into(depots.destination.id)
        .await;
    let before = depots.store.snapshot().await;

    let err = workflow
        .confirm_transfer(&depots.store, depots.org, transfer.id, None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(depots.store.snapshot().await, before);
    let stored = workflow
        .get_transfer(&depots.store, depots.org, transfer.id)
        .await
        .unwrap();
    assert_eq!(stored.status, TransferStatus::Draft);
    assert_eq!(on_hand(&depots, &depots.source).await, dec!(20));
}

#[tokio::test]
async fn test_confirm_fails_when_stock_left_since_creation() {
    let depots = depots().await;
    let workflow = TransferWorkflow::default();
    let transfer = draft(&depots, &workflow, dec!(15)).await;

    FifoCostingEngine::new()
        .record_outbound(
            &depots.store,
            OutboundInput {
                organization_id: depots.org,
                item_id: depots.item.id,
                warehouse_id: depots.source.id,
                quantity: dec!(10),
                movement_type: MovementType::Sale,
                reference_id: None,
                posting_date: date(2024, 4, 5),
            },
        )
        .await
        .unwrap();

    let err = workflow
        .confirm_transfer(&depots.store, depots.org, transfer.id, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientInventory);
    assert_eq!(on_hand(&depots, &depots.source).await, dec!(10));
}

#[tokio::test]
async fn test_confirm_twice_is_invalid() {
    let depots = depots().await;
    let workflow = TransferWorkflow::default();
    let transfer = draft(&depots, &workflow, dec!(1)).await;
    workflow
        .confirm_transfer(&depots.store, depots.org, transfer.id, None)
        .await
        .unwrap();

    let err = workflow
        .confirm_transfer(&depots.store, depots.org, transfer.id, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TransferError::InvalidStateTransition {
            from: TransferStatus::InTransit,
            to: TransferStatus::InTransit
        }
    ));
}

// ========== Complete ==========

#[tokio::test]
async fn test_complete_draft_is_invalid_and_changes_nothing() {
    let depots = depots().await;
    let workflow = TransferWorkflow::default();
    let transfer = draft(&depots, &workflow, dec!(3)).await;
    let before = depots.store.snapshot().await;

    let err = workflow
        .complete_transfer(&depots.store, depots.org, transfer.id, None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidStateTransition);
    assert_eq!(depots.store.snapshot().await, before);
}

#[tokio::test]
async fn test_complete_in_transit() {
    let depots = depots().await;
    let workflow = TransferWorkflow::default();
    let transfer = draft(&depots, &workflow, dec!(3)).await;
    workflow
        .confirm_transfer(&depots.store, depots.org, transfer.id, None)
        .await
        .unwrap();

    let completed = workflow
        .complete_transfer(&depots.store, depots.org, transfer.id, Some(UserId::new()))
        .await
        .unwrap();
    assert_eq!(completed.status, TransferStatus::Completed);
    assert!(completed.completed_at.is_some());

    let err = workflow
        .cancel_transfer(&depots.store, depots.org, transfer.id, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidStateTransition);
}

// ========== Cancel ==========

#[tokio::test]
async fn test_cancel_draft_deletes_it() {
    let depots = depots().await;
    let workflow = TransferWorkflow::default();
    let transfer = draft(&depots, &workflow, dec!(3)).await;

    let cancelled = workflow
        .cancel_transfer(&depots.store, depots.org, transfer.id, None)
        .await
        .unwrap();
    assert_eq!(cancelled.status, TransferStatus::Cancelled);
    assert!(cancelled.cancelled_at.is_some());

    let err = workflow
        .get_transfer(&depots.store, depots.org, transfer.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::TransferNotFound(_)));
}

#[tokio::test]
async fn test_cancel_in_transit_rejected_by_default() {
    let depots = depots().await;
    let workflow = TransferWorkflow::default();
    let transfer = draft(&depots, &workflow, dec!(3)).await;
    workflow
        .confirm_transfer(&depots.store, depots.org, transfer.id, None)
        .await
        .unwrap();

    let err = workflow
        .cancel_transfer(&depots.store, depots.org, transfer.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::InTransitCancellationRejected(_)));

    let stored = workflow
        .get_transfer(&depots.store, depots.org, transfer.id)
        .await
        .unwrap();
    assert_eq!(stored.status, TransferStatus::InTransit);
}

#[tokio::test]
async fn test_cancel_in_transit_reverses_layers_and_journal() {
    let mut depots = depots().await;
    split_cost_centers(&mut depots).await;
    let workflow = reversing_workflow();
    let transfer = draft(&depots, &workflow, dec!(15)).await;
    workflow
        .confirm_transfer(&depots.store, depots.org, transfer.id, None)
        .await
        .unwrap();

    let cancelled = workflow
        .cancel_transfer(&depots.store, depots.org, transfer.id, None)
        .await
        .unwrap();

    assert_eq!(cancelled.status, TransferStatus::Cancelled);
    assert_eq!(on_hand(&depots, &depots.destination).await, Decimal::ZERO);
    assert_eq!(on_hand(&depots, &depots.source).await, dec!(20));

    let value: Decimal = layers_at(&depots, &depots.source)
        .await
        .iter()
        .map(CostLayer::remaining_value)
        .sum();
    assert_eq!(value, dec!(50));

    let reversal_id = cancelled.reversal_journal_id.unwrap();
    let mut tx = depots.store.begin_read_only().await.unwrap();
    let reversal = tx.find_journal(depots.org, reversal_id).await.unwrap().unwrap();
    assert_eq!(reversal.source, JournalSource::TransferReversal);
    assert_eq!(reversal.lines[0].account_id, depots.source_stock.id);
    assert_eq!(reversal.lines[0].debit, dec!(35));
}

#[tokio::test]
async fn test_cancel_in_transit_refused_once_destination_consumed() {
    let depots = depots().await;
    let workflow = reversing_workflow();
    let transfer = draft(&depots, &workflow, dec!(5)).await;
    workflow
        .confirm_transfer(&depots.store, depots.org, transfer.id, None)
        .await
        .unwrap();

    FifoCostingEngine::new()
        .record_outbound(
            &depots.store,
            OutboundInput {
                organization_id: depots.org,
                item_id: depots.item.id,
                warehouse_id: depots.destination.id,
                quantity: dec!(1),
                movement_type: MovementType::Sale,
                reference_id: None,
                posting_date: date(2024, 4, 12),
            },
        )
        .await
        .unwrap();
    let before = depots.store.snapshot().await;

    let err = workflow
        .cancel_transfer(&depots.store, depots.org, transfer.id, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientInventory);
    assert_eq!(depots.store.snapshot().await, before);
}

#[tokio::test]
async fn test_transfers_are_scoped_by_organization() {
    let depots = depots().await;
    let workflow = TransferWorkflow::default();
    let transfer = draft(&depots, &workflow, dec!(1)).await;

    let err = workflow
        .confirm_transfer(&depots.store, OrganizationId::new(), transfer.id, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
