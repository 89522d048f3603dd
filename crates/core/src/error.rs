//! Error taxonomy shared by every engine.
//!
//! Each module keeps its own `thiserror` enum; `ErrorKind` is the
//! transport-independent classification callers branch on.

use serde::Serialize;

/// Classification of a core failure.
///
/// All kinds except `Internal` are deterministic: retrying the same call
/// against the same data fails the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Debit and credit totals differ beyond the tolerance.
    UnbalancedJournal,
    /// Outbound quantity exceeds the open FIFO layers.
    InsufficientInventory,
    /// Non-positive or over-precise quantity supplied to an inventory operation.
    InvalidQuantity,
    /// Workflow operation attempted from a state that does not permit it.
    InvalidStateTransition,
    /// Referenced entity missing or owned by another organization.
    NotFound,
    /// Any other rejected input.
    Validation,
    /// Storage or other unexpected failure.
    Internal,
}
