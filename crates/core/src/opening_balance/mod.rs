//! Opening balances.
//!
//! Each opening balance is a journal between the target account and a
//! per-organization "Opening Balance Equity" account (code `3999`), created
//! on first use.

pub mod service;
pub mod types;


pub use service::{OpeningBalanceService, build_integrity_report};
pub use types::{
    OPENING_BALANCE_EQUITY_CODE, OPENING_BALANCE_EQUITY_NAME, OpeningBalanceIntegrityReport,
    OpeningBalanceJournalCheck, SetOpeningBalanceInput,
};
