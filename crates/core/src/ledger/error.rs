//! Ledger error types.

use rust_decimal::Decimal;
use tally_shared::AppError;
use tally_shared::types::{AccountId, JournalId};
use thiserror::Error;

use crate::error::ErrorKind;
use crate::store::StoreError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Journal must have at least 2 lines.
    #[error("Journal must have at least 2 lines")]
    InsufficientLines,

    /// Journal debits and credits differ by more than the tolerance.
    #[error("Journal is not balanced. Debit: {debit}, Credit: {credit}, Difference: {difference}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
        /// `debit - credit`.
        difference: Decimal,
    },

    /// A line carries a negative amount.
    #[error("Line {line} has a negative amount")]
    NegativeAmount {
        /// 1-based line number.
        line: usize,
    },

    /// A line carries both a debit and a credit.
    #[error("Line {line} must specify either debit or credit, not both")]
    BothSides {
        /// 1-based line number.
        line: usize,
    },

    /// Configured balance tolerance is outside `(0, 0.01]`.
    #[error("Balance tolerance must be greater than 0 and at most 0.01, got {0}")]
    InvalidTolerance(Decimal),

    /// Opening balance amount is zero.
    #[error("Opening balance amount cannot be zero")]
    ZeroAmount,

    /// Opening balance targeted the opening balance equity account itself.
    #[error("Account {0} is the opening balance equity account")]
    OpeningBalanceOnEquityAccount(AccountId),

    // ========== Account Errors ==========
    /// Account not found in the organization.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account is inactive and cannot be posted to.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountId),

    // ========== Journal Errors ==========
    /// Journal not found in the organization.
    #[error("Journal not found: {0}")]
    JournalNotFound(JournalId),

    // ========== Storage Errors ==========
    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::Unbalanced { .. } => "UNBALANCED_JOURNAL",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::BothSides { .. } => "INVALID_LINE_SIDES",
            Self::InvalidTolerance(_) => "INVALID_TOLERANCE",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::OpeningBalanceOnEquityAccount(_) => "OPENING_BALANCE_ON_EQUITY_ACCOUNT",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::JournalNotFound(_) => "JOURNAL_NOT_FOUND",
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::InsufficientLines
            | Self::Unbalanced { .. }
            | Self::NegativeAmount { .. }
            | Self::BothSides { .. }
            | Self::InvalidTolerance(_)
            | Self::ZeroAmount
            | Self::OpeningBalanceOnEquityAccount(_)
            | Self::AccountInactive(_) => 400,

            // 404 Not Found
            Self::AccountNotFound(_) | Self::JournalNotFound(_) => 404,

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
            Self::Unbalanced { .. } => ErrorKind::UnbalancedJournal,
            Self::AccountNotFound(_) | Self::JournalNotFound(_) => ErrorKind::NotFound,
            Self::InsufficientLines
            | Self::NegativeAmount { .. }
            | Self::BothSides { .. }
            | Self::InvalidTolerance(_)
            | Self::ZeroAmount
            | Self::OpeningBalanceOnEquityAccount(_)
            | Self::AccountInactive(_) => ErrorKind::Validation,
            Self::Store(_) => ErrorKind::Internal,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match &err {
            LedgerError::Store(StoreError::Conflict(_)) => Self::Conflict(err.to_string()),
            LedgerError::Store(_) => Self::Database(err.to_string()),
            LedgerError::AccountNotFound(_) | LedgerError::JournalNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            LedgerError::Unbalanced { .. } => Self::BusinessRule(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
