//! Transfer domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tally_shared::types::{
    ItemId, JournalId, OrganizationId, TransferId, TransferItemId, UserId, WarehouseId,
};

/// Transfer status.
///
/// The valid transitions are:
/// - Draft → InTransit (confirm)
/// - InTransit → Completed (complete)
/// - Draft → Cancelled (cancel)
/// - InTransit → Cancelled (cancel, subject to policy)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    /// Created, nothing has moved.
    Draft,
    /// Stock has left the source and entered the destination.
    InTransit,
    /// Receipt acknowledged.
    Completed,
    /// Abandoned.
    Cancelled,
}

impl TransferStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InTransit => "in_transit",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One item line of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferItem {
    /// The line ID.
    pub id: TransferItemId,
    /// Owning transfer.
    pub transfer_id: TransferId,
    /// The item moved.
    pub item_id: ItemId,
    /// Quantity moved.
    pub quantity: Decimal,
    /// Previewed unit cost while draft, actual FIFO cost once confirmed.
    pub unit_cost: Decimal,
    /// Value of the line.
    pub total_value: Decimal,
}

/// An inter-warehouse transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// The transfer ID.
    pub id: TransferId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Human-readable number, unique per organization (`TR-000001`).
    pub transfer_number: String,
    /// Warehouse the goods leave.
    pub source_warehouse_id: WarehouseId,
    /// Warehouse the goods enter.
    pub destination_warehouse_id: WarehouseId,
    /// Accounting date.
    pub transfer_date: NaiveDate,
    /// Current status.
    pub status: TransferStatus,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Sum of item values.
    pub total_value: Decimal,
    /// Journal moving value between cost centers, if one was needed.
    pub journal_id: Option<JournalId>,
    /// Journal reversing `journal_id` after an in-transit cancellation.
    pub reversal_journal_id: Option<JournalId>,
    /// User who created the transfer.
    pub created_by: Option<UserId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of confirmation.
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Time of completion.
    pub completed_at: Option<DateTime<Utc>>,
    /// Time of cancellation.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Item lines.
    pub items: Vec<TransferItem>,
}

/// Requested item line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferItemInput {
    /// The item.
    pub item_id: ItemId,
    /// Quantity (> 0).
    pub quantity: Decimal,
}

/// Input for creating a transfer.
#[derive(Debug, Clone)]
pub struct CreateTransferInput {
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Warehouse the goods leave.
    pub source_warehouse_id: WarehouseId,
    /// Warehouse the goods enter.
    pub destination_warehouse_id: WarehouseId,
    /// Accounting date.
    pub transfer_date: NaiveDate,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Item lines; repeated items are merged.
    pub items: Vec<TransferItemInput>,
    /// User creating the transfer.
    pub created_by: Option<UserId>,
}
