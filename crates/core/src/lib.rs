//! Core accounting-correctness logic for Tally.
//!
//! This crate contains the ledger invariant engine and the FIFO
//! inventory-costing engine with ZERO web or database dependencies.
//! Persistence sits behind the async traits in [`store`]; `tally-db`
//! implements them on PostgreSQL and [`store::MemoryStore`] keeps
//! everything in process.
//!
//! # Modules
//!
//! - `ledger` - Double-entry journals and the journal engine
//! - `inventory` - FIFO cost layers and the costing engine
//! - `transfer` - Inter-warehouse transfer workflow
//! - `opening_balance` - Opening balances against opening balance equity
//! - `reports` - Trial balance and account ledger
//! - `invariant` - Balance and layer invariants shared by all of the above
//! - `store` - Storage traits and the in-memory store

pub mod error;
pub mod inventory;
pub mod invariant;
pub mod ledger;
pub mod opening_balance;
pub mod reports;
pub mod store;
pub mod transfer;

#[cfg(test)]
mod test_support;

pub use error::ErrorKind;
pub use inventory::{FifoCostingEngine, InventoryError};
pub use ledger::{JournalEngine, LedgerError};
pub use opening_balance::OpeningBalanceService;
pub use reports::ReportService;
pub use store::{MemoryStore, Store, StoreError, StoreTx};
pub use transfer::{TransferError, TransferWorkflow};
