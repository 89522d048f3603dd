//! Double-entry bookkeeping.
//!
//! - Accounts, journals and journal lines
//! - Line validation
//! - The journal engine, which persists balanced journals and re-checks
//!   persisted ones

pub mod error;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod tests;
#[cfg(test)]
mod validation_props;

pub use error::LedgerError;
pub use service::JournalEngine;
pub use types::{
    Account, AccountSubtype, AccountType, Journal, JournalLine, JournalLineInput, JournalSource,
    LedgerBalanceCheck, NormalBalance, PostJournalInput,
};
pub use validation::{MIN_LINES, validate_lines};
