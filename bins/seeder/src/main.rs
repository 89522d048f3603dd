//! Demo data seeder for Tally development.
//!
//! Seeds one organization with a small chart of accounts, two warehouses in
//! different cost centers and one item, then drives the engines through an
//! opening balance, a purchase, a sale and a completed transfer.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use tally_core::inventory::{InboundInput, MovementType, OutboundInput};
use tally_core::opening_balance::SetOpeningBalanceInput;
use tally_core::transfer::{CreateTransferInput, TransferItemInput};
use tally_core::{
    FifoCostingEngine, OpeningBalanceService, ReportService, TransferWorkflow,
};
use tally_db::entities::sea_orm_active_enums::{
    AccountSubtype, AccountType, NegativeInventoryPolicy,
};
use tally_db::entities::{accounts, items, warehouses};
use tally_db::PgStore;
use tally_shared::AppConfig;
use tally_shared::types::{AccountId, ItemId, OrganizationId, WarehouseId};

/// Demo organization ID (consistent for all seeds)
const DEMO_ORG_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);

const CASH_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_1000);
const PAYABLE_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_2000);
const SALES_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_4000);
const COGS_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_5000);
const STOCK_NORTH_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_1310);
const STOCK_SOUTH_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_1320);

const NORTH_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0001_0001);
const SOUTH_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0001_0002);
const WIDGET_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0002_0001);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tally=debug,seeder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let db = tally_db::connect_with_config(&config.database)
        .await
        .context("failed to connect to database")?;

    if accounts::Entity::find_by_id(CASH_ID).one(&db).await?.is_some() {
        info!("demo organization already seeded, skipping");
        return Ok(());
    }

    info!("seeding master data");
    seed_master_data(&db).await?;

    let store = PgStore::new(db);
    let org = OrganizationId::from_uuid(DEMO_ORG_ID);
    run_demo_activity(&store, &config, org).await?;

    let report = ReportService::generate_trial_balance(&store, org, date(2024, 12, 31)?).await?;
    for row in &report.accounts {
        info!(code = %row.code, name = %row.name, balance = %row.balance, "trial balance");
    }
    info!(
        total_debit = %report.totals.total_debit,
        total_credit = %report.totals.total_credit,
        balanced = report.totals.is_balanced,
        "seeding complete"
    );

    Ok(())
}

fn date(year: i32, month: u32, day: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).context("invalid seed date")
}

/// Seeds accounts, warehouses and items.
async fn seed_master_data(db: &DatabaseConnection) -> anyhow::Result<()> {
    let chart = [
        (CASH_ID, "1000", "Cash", AccountType::Asset, AccountSubtype::Cash),
        (STOCK_NORTH_ID, "1310", "Stock - North", AccountType::Asset, AccountSubtype::Stock),
        (STOCK_SOUTH_ID, "1320", "Stock - South", AccountType::Asset, AccountSubtype::Stock),
        (PAYABLE_ID, "2000", "Accounts Payable", AccountType::Liability, AccountSubtype::Payable),
        (SALES_ID, "4000", "Sales", AccountType::Income, AccountSubtype::Sales),
        (COGS_ID, "5000", "Cost of Goods Sold", AccountType::Expense, AccountSubtype::CostOfGoodsSold),
    ];
    for (id, code, name, account_type, subtype) in chart {
        accounts::ActiveModel {
            id: Set(id),
            organization_id: Set(DEMO_ORG_ID),
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            account_type: Set(account_type),
            account_subtype: Set(Some(subtype)),
            is_active: Set(true),
            is_system: Set(false),
            created_at: Set(Utc::now().into()),
        }
        .insert(db)
        .await?;
    }

    for (id, code, name, cost_center, account) in [
        (NORTH_ID, "NORTH", "North Depot", "CC-NORTH", STOCK_NORTH_ID),
        (SOUTH_ID, "SOUTH", "South Depot", "CC-SOUTH", STOCK_SOUTH_ID),
    ] {
        warehouses::ActiveModel {
            id: Set(id),
            organization_id: Set(DEMO_ORG_ID),
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            is_active: Set(true),
            cost_center: Set(Some(cost_center.to_string())),
            inventory_account_id: Set(Some(account)),
            negative_inventory_policy: Set(NegativeInventoryPolicy::Disallow),
            created_at: Set(Utc::now().into()),
        }
        .insert(db)
        .await?;
    }

    items::ActiveModel {
        id: Set(WIDGET_ID),
        organization_id: Set(DEMO_ORG_ID),
        sku: Set("WIDGET-001".to_string()),
        name: Set("Widget".to_string()),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;

    Ok(())
}

/// Posts the demo activity through the engines.
async fn run_demo_activity(
    store: &PgStore,
    config: &AppConfig,
    org: OrganizationId,
) -> anyhow::Result<()> {
    let widget = ItemId::from_uuid(WIDGET_ID);
    let north = WarehouseId::from_uuid(NORTH_ID);
    let south = WarehouseId::from_uuid(SOUTH_ID);

    let opening = OpeningBalanceService::default()
        .set_account_opening_balance(
            store,
            SetOpeningBalanceInput {
                organization_id: org,
                account_id: AccountId::from_uuid(CASH_ID),
                amount: dec!(10000),
                as_of: date(2024, 1, 1)?,
                description: None,
                created_by: None,
            },
        )
        .await?;
    info!(journal = %opening.journal_number, "opening balance posted");

    let costing = FifoCostingEngine::new();
    for (quantity, unit_cost, day) in [(dec!(100), dec!(2.50), 5), (dec!(50), dec!(2.80), 12)] {
        let inbound = costing
            .record_inbound(
                store,
                InboundInput {
                    organization_id: org,
                    item_id: widget,
                    warehouse_id: north,
                    quantity,
                    unit_cost,
                    movement_type: MovementType::Purchase,
                    reference_id: None,
                    posting_date: date(2024, 1, day)?,
                },
            )
            .await?;
        info!(layer = %inbound.layer.id, %quantity, %unit_cost, "purchase received");
    }

    let sale = costing
        .record_outbound(
            store,
            OutboundInput {
                organization_id: org,
                item_id: widget,
                warehouse_id: north,
                quantity: dec!(120),
                movement_type: MovementType::Sale,
                reference_id: None,
                posting_date: date(2024, 1, 20)?,
            },
        )
        .await?;
    info!(
        total_cost = %sale.total_cost,
        average_unit_cost = %sale.average_unit_cost,
        "sale costed"
    );

    let workflow = TransferWorkflow::from_config(config)?;
    let transfer = workflow
        .create_transfer(
            store,
            CreateTransferInput {
                organization_id: org,
                source_warehouse_id: north,
                destination_warehouse_id: south,
                transfer_date: date(2024, 2, 1)?,
                notes: Some("Rebalance stock".to_string()),
                items: vec![TransferItemInput {
                    item_id: widget,
                    quantity: dec!(20),
                }],
                created_by: None,
            },
        )
        .await?;
    workflow
        .confirm_transfer(store, org, transfer.id, None)
        .await?;
    let completed = workflow
        .complete_transfer(store, org, transfer.id, None)
        .await?;
    info!(
        transfer = %completed.transfer_number,
        value = %completed.total_value,
        "transfer completed"
    );

    Ok(())
}
