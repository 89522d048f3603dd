//! Inter-warehouse transfers.
//!
//! A transfer is created as a draft with previewed costs, confirmed (stock
//! leaves the source and enters the destination at FIFO cost, with a
//! journal when cost centers differ), then completed. Drafts can be
//! cancelled; in-transit transfers only when configuration allows.

pub mod error;
pub mod service;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::TransferError;
pub use service::TransferWorkflow;
pub use state::{TransferAction, TransferStateMachine};
pub use types::{
    CreateTransferInput, Transfer, TransferItem, TransferItemInput, TransferStatus,
};
