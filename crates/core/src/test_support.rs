//! Builders shared by the engine tests.

use chrono::{NaiveDate, Utc};
use tally_shared::types::{AccountId, ItemId, OrganizationId, WarehouseId};

use crate::inventory::{Item, NegativeInventoryPolicy, Warehouse};
use crate::ledger::{Account, AccountType};
use crate::store::MemoryStore;

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub(crate) fn account(
    organization_id: OrganizationId,
    code: &str,
    account_type: AccountType,
) -> Account {
    Account {
        id: AccountId::new(),
        organization_id,
        code: code.to_string(),
        name: format!("Account {code}"),
        account_type,
        account_subtype: None,
        is_active: true,
        is_system: false,
        created_at: Utc::now(),
    }
}

pub(crate) fn warehouse(organization_id: OrganizationId, code: &str) -> Warehouse {
    Warehouse {
        id: WarehouseId::new(),
        organization_id,
        code: code.to_string(),
        name: format!("Warehouse {code}"),
        is_active: true,
        cost_center: None,
        inventory_account_id: None,
        negative_inventory_policy: NegativeInventoryPolicy::Disallow,
    }
}

pub(crate) fn item(organization_id: OrganizationId, sku: &str) -> Item {
    Item {
        id: ItemId::new(),
        organization_id,
        sku: sku.to_string(),
        name: format!("Item {sku}"),
        is_active: true,
    }
}

/// Adds an account to the store and returns it.
pub(crate) async fn seed_account(
    store: &MemoryStore,
    organization_id: OrganizationId,
    code: &str,
    account_type: AccountType,
) -> Account {
    let account = account(organization_id, code, account_type);
    store.add_account(account.clone()).await;
    account
}

/// Adds a warehouse to the store and returns it.
pub(crate) async fn seed_warehouse(
    store: &MemoryStore,
    organization_id: OrganizationId,
    code: &str,
) -> Warehouse {
    let warehouse = warehouse(organization_id, code);
    store.add_warehouse(warehouse.clone()).await;
    warehouse
}

/// Adds an item to the store and returns it.
pub(crate) async fn seed_item(
    store: &MemoryStore,
    organization_id: OrganizationId,
    sku: &str,
) -> Item {
    let item = item(organization_id, sku);
    store.add_item(item.clone()).await;
    item
}
