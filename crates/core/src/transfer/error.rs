//! Transfer error types.

use tally_shared::AppError;
use tally_shared::types::{TransferId, WarehouseId};
use thiserror::Error;

use super::types::TransferStatus;
use crate::error::ErrorKind;
use crate::inventory::InventoryError;
use crate::ledger::LedgerError;
use crate::store::StoreError;

/// Errors that can occur during transfer operations.
#[derive(Debug, Error)]
pub enum TransferError {
    // ========== State Errors ==========
    /// The transfer is not in a state that permits the operation.
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        /// Current status.
        from: TransferStatus,
        /// Requested status.
        to: TransferStatus,
    },

    /// In-transit cancellation is disabled by configuration.
    #[error("Transfer {0} is in transit and cannot be cancelled")]
    InTransitCancellationRejected(TransferId),

    // ========== Validation Errors ==========
    /// Source and destination are the same warehouse.
    #[error("Source and destination warehouse must differ ({0})")]
    SameWarehouse(WarehouseId),

    /// No item lines.
    #[error("Transfer must contain at least one item")]
    EmptyTransfer,

    /// Cost centers differ but a warehouse has no inventory account.
    #[error("Warehouse {0} has no inventory account")]
    MissingInventoryAccount(WarehouseId),

    /// Transfer not found in the organization.
    #[error("Transfer not found: {0}")]
    TransferNotFound(TransferId),

    // ========== Wrapped Errors ==========
    /// Costing failure.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Posting failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TransferError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            Self::InTransitCancellationRejected(_) => "IN_TRANSIT_CANCELLATION_REJECTED",
            Self::SameWarehouse(_) => "SAME_WAREHOUSE",
            Self::EmptyTransfer => "EMPTY_TRANSFER",
            Self::MissingInventoryAccount(_) => "MISSING_INVENTORY_ACCOUNT",
            Self::TransferNotFound(_) => "TRANSFER_NOT_FOUND",
            Self::Inventory(e) => e.error_code(),
            Self::Ledger(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::SameWarehouse(_) | Self::EmptyTransfer | Self::MissingInventoryAccount(_) => 400,
            Self::TransferNotFound(_) => 404,
            Self::InvalidStateTransition { .. } | Self::InTransitCancellationRejected(_) => 409,
            Self::Inventory(e) => e.http_status_code(),
            Self::Ledger(e) => e.http_status_code(),
            Self::Store(e) => e.http_status_code(),
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Inventory(e) => e.is_retryable(),
            Self::Ledger(e) => e.is_retryable(),
            Self::Store(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Classifies the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidStateTransition { .. } | Self::InTransitCancellationRejected(_) => {
                ErrorKind::InvalidStateTransition
            }
            Self::SameWarehouse(_) | Self::EmptyTransfer | Self::MissingInventoryAccount(_) => {
                ErrorKind::Validation
            }
            Self::TransferNotFound(_) => ErrorKind::NotFound,
            Self::Inventory(e) => e.kind(),
            Self::Ledger(e) => e.kind(),
            Self::Store(_) => ErrorKind::Internal,
        }
    }
}

impl From<TransferError> for AppError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::Inventory(e) => e.into(),
            TransferError::Ledger(e) => e.into(),
            TransferError::Store(StoreError::Conflict(msg)) => Self::Conflict(msg),
            TransferError::Store(e) => Self::Database(e.to_string()),
            other => {
                let message = other.to_string();
                match other {
                    TransferError::TransferNotFound(_) => Self::NotFound(message),
                    TransferError::InvalidStateTransition { .. }
                    | TransferError::InTransitCancellationRejected(_) => Self::Conflict(message),
                    _ => Self::Validation(message),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tally_shared::types::ItemId;

    #[test]
    fn test_invalid_transition_display() {
        let err = TransferError::InvalidStateTransition {
            from: TransferStatus::Draft,
            to: TransferStatus::Completed,
        };
        assert_eq!(
            err.to_string(),
            "Invalid state transition from draft to completed"
        );
        assert_eq!(err.kind(), ErrorKind::InvalidStateTransition);
        assert_eq!(err.http_status_code(), 409);
    }

    #[test]
    fn test_wrapped_errors_keep_their_kind() {
        let err: TransferError = InventoryError::InsufficientInventory {
            item_id: ItemId::new(),
            warehouse_id: WarehouseId::new(),
            available: dec!(1),
            requested: dec!(2),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InsufficientInventory);
        assert_eq!(err.error_code(), "INSUFFICIENT_INVENTORY");

        let err: TransferError = LedgerError::InsufficientLines.into();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = TransferError::TransferNotFound(TransferId::new()).into();
        assert_eq!(app.status_code(), 404);
        let app: AppError = TransferError::SameWarehouse(WarehouseId::new()).into();
        assert_eq!(app.status_code(), 400);
    }
}
