//! Inventory error types.

use rust_decimal::Decimal;
use tally_shared::AppError;
use tally_shared::types::{CostLayerId, ItemId, WarehouseId};
use thiserror::Error;

use crate::error::ErrorKind;
use crate::store::StoreError;

/// Errors that can occur during inventory operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    // ========== Validation Errors ==========
    /// Quantity must be greater than zero.
    #[error("Quantity must be greater than zero, got {0}")]
    InvalidQuantity(Decimal),

    /// Unit cost cannot be negative.
    #[error("Unit cost cannot be negative, got {0}")]
    NegativeUnitCost(Decimal),

    /// Not enough stock in open layers.
    #[error("Insufficient inventory: available {available}, requested {requested}")]
    InsufficientInventory {
        /// Item requested.
        item_id: ItemId,
        /// Warehouse requested.
        warehouse_id: WarehouseId,
        /// Quantity in open layers.
        available: Decimal,
        /// Quantity asked for.
        requested: Decimal,
    },

    /// A layer to be reversed was already partly consumed.
    #[error("Cost layer {layer_id} was already consumed ({remaining} of {original} left)")]
    LayerAlreadyConsumed {
        /// The layer.
        layer_id: CostLayerId,
        /// Quantity left.
        remaining: Decimal,
        /// Quantity received.
        original: Decimal,
    },

    // ========== Reference Errors ==========
    /// Item not found in the organization.
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    /// Item is inactive.
    #[error("Item {0} is inactive")]
    ItemInactive(ItemId),

    /// Warehouse not found in the organization.
    #[error("Warehouse not found: {0}")]
    WarehouseNotFound(WarehouseId),

    /// Warehouse is inactive.
    #[error("Warehouse {0} is inactive")]
    WarehouseInactive(WarehouseId),

    // ========== Integrity Errors ==========
    /// Consumption would leave a layer outside `0..=original`.
    #[error("Cost layer {0} would leave its bounds")]
    LayerOutOfBounds(CostLayerId),

    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl InventoryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidQuantity(_) => "INVALID_QUANTITY",
            Self::NegativeUnitCost(_) => "NEGATIVE_UNIT_COST",
            Self::InsufficientInventory { .. } => "INSUFFICIENT_INVENTORY",
            Self::LayerAlreadyConsumed { .. } => "LAYER_ALREADY_CONSUMED",
            Self::ItemNotFound(_) => "ITEM_NOT_FOUND",
            Self::ItemInactive(_) => "ITEM_INACTIVE",
            Self::WarehouseNotFound(_) => "WAREHOUSE_NOT_FOUND",
            Self::WarehouseInactive(_) => "WAREHOUSE_INACTIVE",
            Self::LayerOutOfBounds(_) => "LAYER_OUT_OF_BOUNDS",
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidQuantity(_)
            | Self::NegativeUnitCost(_)
            | Self::ItemInactive(_)
            | Self::WarehouseInactive(_) => 400,
            Self::ItemNotFound(_) | Self::WarehouseNotFound(_) => 404,
            Self::InsufficientInventory { .. } | Self::LayerAlreadyConsumed { .. } => 422,
            Self::LayerOutOfBounds(_) => 500,
            Self::Store(e) => e.http_status_code(),
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_retryable())
    }

    /// Classifies the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidQuantity(_) => ErrorKind::InvalidQuantity,
            Self::InsufficientInventory { .. } | Self::LayerAlreadyConsumed { .. } => {
                ErrorKind::InsufficientInventory
            }
            Self::ItemNotFound(_) | Self::WarehouseNotFound(_) => ErrorKind::NotFound,
            Self::NegativeUnitCost(_) | Self::ItemInactive(_) | Self::WarehouseInactive(_) => {
                ErrorKind::Validation
            }
            Self::LayerOutOfBounds(_) | Self::Store(_) => ErrorKind::Internal,
        }
    }
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        match &err {
            InventoryError::Store(StoreError::Conflict(_)) => Self::Conflict(err.to_string()),
            InventoryError::Store(_) => Self::Database(err.to_string()),
            InventoryError::LayerOutOfBounds(_) => Self::Internal(err.to_string()),
            InventoryError::ItemNotFound(_) | InventoryError::WarehouseNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            InventoryError::InsufficientInventory { .. }
            | InventoryError::LayerAlreadyConsumed { .. } => Self::BusinessRule(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
