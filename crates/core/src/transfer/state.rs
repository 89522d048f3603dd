//! Transfer state machine.
//!
//! Transitions are validated against the current status before anything
//! else happens; the returned action carries the timestamp to stamp.

use chrono::{DateTime, Utc};
use tally_shared::config::InTransitCancellationPolicy;
use tally_shared::types::TransferId;

use super::error::TransferError;
use super::types::{Transfer, TransferStatus};

/// A validated transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferAction {
    /// Draft → InTransit.
    Confirm {
        /// The new status.
        new_status: TransferStatus,
        /// When it was confirmed.
        confirmed_at: DateTime<Utc>,
    },
    /// InTransit → Completed.
    Complete {
        /// The new status.
        new_status: TransferStatus,
        /// When it was completed.
        completed_at: DateTime<Utc>,
    },
    /// Draft/InTransit → Cancelled.
    Cancel {
        /// The new status.
        new_status: TransferStatus,
        /// When it was cancelled.
        cancelled_at: DateTime<Utc>,
        /// Stock already moved and must be moved back.
        reverse_stock: bool,
    },
}

impl TransferAction {
    /// The status after the transition.
    #[must_use]
    pub fn new_status(&self) -> TransferStatus {
        match self {
            Self::Confirm { new_status, .. }
            | Self::Complete { new_status, .. }
            | Self::Cancel { new_status, .. } => *new_status,
        }
    }

    /// True for a cancellation that has to move stock back.
    #[must_use]
    pub fn reverses_stock(&self) -> bool {
        matches!(
            self,
            Self::Cancel {
                reverse_stock: true,
                ..
            }
        )
    }

    /// Writes the new status and timestamp onto the transfer.
    pub fn apply(&self, transfer: &mut Transfer) {
        match *self {
            Self::Confirm {
                new_status,
                confirmed_at,
            } => {
                transfer.status = new_status;
                transfer.confirmed_at = Some(confirmed_at);
            }
            Self::Complete {
                new_status,
                completed_at,
            } => {
                transfer.status = new_status;
                transfer.completed_at = Some(completed_at);
            }
            Self::Cancel {
                new_status,
                cancelled_at,
                ..
            } => {
                transfer.status = new_status;
                transfer.cancelled_at = Some(cancelled_at);
            }
        }
    }
}

/// Stateless transition rules.
pub struct TransferStateMachine;

impl TransferStateMachine {
    /// Confirm a draft transfer.
    ///
    /// # Returns
    /// * `Ok(TransferAction::Confirm)` from `Draft`
    /// * `Err(TransferError::InvalidStateTransition)` otherwise
    pub fn confirm(current_status: TransferStatus) -> Result<TransferAction, TransferError> {
        Self::check(current_status, TransferStatus::InTransit)?;
        Ok(TransferAction::Confirm {
            new_status: TransferStatus::InTransit,
            confirmed_at: Utc::now(),
        })
    }

    /// Complete an in-transit transfer.
    ///
    /// # Returns
    /// * `Ok(TransferAction::Complete)` from `InTransit`
    /// * `Err(TransferError::InvalidStateTransition)` otherwise
    pub fn complete(current_status: TransferStatus) -> Result<TransferAction, TransferError> {
        Self::check(current_status, TransferStatus::Completed)?;
        Ok(TransferAction::Complete {
            new_status: TransferStatus::Completed,
            completed_at: Utc::now(),
        })
    }

    /// Cancel a draft or in-transit transfer.
    ///
    /// # Returns
    /// * `Ok(TransferAction::Cancel)` from `Draft`
    /// * `Ok(TransferAction::Cancel)` with `reverse_stock` from `InTransit`
    ///   when the policy allows it
    /// * `Err(TransferError::InTransitCancellationRejected)` from `InTransit`
    ///   under [`InTransitCancellationPolicy::Reject`]
    /// * `Err(TransferError::InvalidStateTransition)` from a terminal status
    pub fn cancel(
        transfer_id: TransferId,
        current_status: TransferStatus,
        policy: InTransitCancellationPolicy,
    ) -> Result<TransferAction, TransferError> {
        Self::check(current_status, TransferStatus::Cancelled)?;
        let reverse_stock = current_status == TransferStatus::InTransit;
        if reverse_stock && policy == InTransitCancellationPolicy::Reject {
            return Err(TransferError::InTransitCancellationRejected(transfer_id));
        }
        Ok(TransferAction::Cancel {
            new_status: TransferStatus::Cancelled,
            cancelled_at: Utc::now(),
            reverse_stock,
        })
    }

    /// Check if a transition is structurally valid, ignoring policy.
    #[must_use]
    pub fn is_valid_transition(from: TransferStatus, to: TransferStatus) -> bool {
        matches!(
            (from, to),
            (TransferStatus::Draft, TransferStatus::InTransit | TransferStatus::Cancelled)
                | (
                    TransferStatus::InTransit,
                    TransferStatus::Completed | TransferStatus::Cancelled
                )
        )
    }

    fn check(from: TransferStatus, to: TransferStatus) -> Result<(), TransferError> {
        if Self::is_valid_transition(from, to) {
            Ok(())
        } else {
            Err(TransferError::InvalidStateTransition { from, to })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use crate::transfer::types::TransferStatus::{Cancelled, Completed, Draft, InTransit};

    #[rstest]
    #[case(Draft, InTransit, true)]
    #[case(Draft, Cancelled, true)]
    #[case(InTransit, Completed, true)]
    #[case(InTransit, Cancelled, true)]
    #[case(Draft, Completed, false)]
    #[case(InTransit, Draft, false)]
    #[case(Completed, Cancelled, false)]
    #[case(Cancelled, Draft, false)]
    #[case(Completed, InTransit, false)]
    fn test_is_valid_transition(
        #[case] from: TransferStatus,
        #[case] to: TransferStatus,
        #[case] expected: bool,
    ) {
        assert_eq!(TransferStateMachine::is_valid_transition(from, to), expected);
    }

    #[test]
    fn test_confirm_only_from_draft() {
        let action = TransferStateMachine::confirm(Draft).unwrap();
        assert_eq!(action.new_status(), InTransit);

        for status in [InTransit, Completed, Cancelled] {
            assert!(matches!(
                TransferStateMachine::confirm(status),
                Err(TransferError::InvalidStateTransition { to: InTransit, .. })
            ));
        }
    }

    #[test]
    fn test_complete_only_from_in_transit() {
        assert_eq!(
            TransferStateMachine::complete(InTransit).unwrap().new_status(),
            Completed
        );
        assert!(matches!(
            TransferStateMachine::complete(Draft),
            Err(TransferError::InvalidStateTransition {
                from: Draft,
                to: Completed
            })
        ));
    }

    #[rstest]
    #[case(InTransitCancellationPolicy::Reject)]
    #[case(InTransitCancellationPolicy::ReverseTransferLayers)]
    fn test_cancel_draft_never_reverses(#[case] policy: InTransitCancellationPolicy) {
        let action = TransferStateMachine::cancel(TransferId::new(), Draft, policy).unwrap();
        assert!(matches!(
            action,
            TransferAction::Cancel {
                reverse_stock: false,
                ..
            }
        ));
    }

    #[test]
    fn test_cancel_in_transit_follows_policy() {
        let id = TransferId::new();
        assert!(matches!(
            TransferStateMachine::cancel(id, InTransit, InTransitCancellationPolicy::Reject),
            Err(TransferError::InTransitCancellationRejected(rejected)) if rejected == id
        ));
        assert!(matches!(
            TransferStateMachine::cancel(
                id,
                InTransit,
                InTransitCancellationPolicy::ReverseTransferLayers
            ),
            Ok(TransferAction::Cancel {
                reverse_stock: true,
                ..
            })
        ));
    }

    #[test]
    fn test_cancel_terminal_is_invalid() {
        for status in [Completed, Cancelled] {
            assert!(matches!(
                TransferStateMachine::cancel(
                    TransferId::new(),
                    status,
                    InTransitCancellationPolicy::ReverseTransferLayers
                ),
                Err(TransferError::InvalidStateTransition { .. })
            ));
        }
    }
}
