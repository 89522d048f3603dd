//! `SeaORM` mappings of the PostgreSQL enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use tally_core::inventory;
use tally_core::ledger;
use tally_core::transfer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    #[sea_orm(string_value = "asset")]
    Asset,
    #[sea_orm(string_value = "liability")]
    Liability,
    #[sea_orm(string_value = "equity")]
    Equity,
    #[sea_orm(string_value = "income")]
    Income,
    #[sea_orm(string_value = "expense")]
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_subtype")]
pub enum AccountSubtype {
    #[sea_orm(string_value = "bank")]
    Bank,
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "receivable")]
    Receivable,
    #[sea_orm(string_value = "payable")]
    Payable,
    #[sea_orm(string_value = "stock")]
    Stock,
    #[sea_orm(string_value = "cost_of_goods_sold")]
    CostOfGoodsSold,
    #[sea_orm(string_value = "sales")]
    Sales,
    #[sea_orm(string_value = "operating_expense")]
    OperatingExpense,
    #[sea_orm(string_value = "opening_balance_equity")]
    OpeningBalanceEquity,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "journal_source")]
pub enum JournalSource {
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "opening_balance")]
    OpeningBalance,
    #[sea_orm(string_value = "inventory_transfer")]
    InventoryTransfer,
    #[sea_orm(string_value = "transfer_reversal")]
    TransferReversal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "movement_type")]
pub enum MovementType {
    #[sea_orm(string_value = "purchase")]
    Purchase,
    #[sea_orm(string_value = "sale")]
    Sale,
    #[sea_orm(string_value = "transfer_in")]
    TransferIn,
    #[sea_orm(string_value = "transfer_out")]
    TransferOut,
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "negative_inventory_policy"
)]
pub enum NegativeInventoryPolicy {
    #[sea_orm(string_value = "disallow")]
    Disallow,
    #[sea_orm(string_value = "last_known_cost")]
    LastKnownCost,
    #[sea_orm(string_value = "zero_cost")]
    ZeroCost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transfer_status")]
pub enum TransferStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "in_transit")]
    InTransit,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

// ========== Conversions to and from the core enums ==========

macro_rules! mirror_enum {
    ($db:ident <=> $core:path { $($variant:ident),+ $(,)? }) => {
        impl From<$db> for $core {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$core> for $db {
            fn from(value: $core) -> Self {
                type Core = $core;
                match value {
                    $(Core::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(AccountType <=> ledger::AccountType {
    Asset, Liability, Equity, Income, Expense
});
mirror_enum!(AccountSubtype <=> ledger::AccountSubtype {
    Bank, Cash, Receivable, Payable, Stock, CostOfGoodsSold, Sales, OperatingExpense,
    OpeningBalanceEquity, Other
});
mirror_enum!(JournalSource <=> ledger::JournalSource {
    Manual, OpeningBalance, InventoryTransfer, TransferReversal
});
mirror_enum!(MovementType <=> inventory::MovementType {
    Purchase, Sale, TransferIn, TransferOut, Adjustment
});
mirror_enum!(NegativeInventoryPolicy <=> inventory::NegativeInventoryPolicy {
    Disallow, LastKnownCost, ZeroCost
});
mirror_enum!(TransferStatus <=> transfer::TransferStatus {
    Draft, InTransit, Completed, Cancelled
});
