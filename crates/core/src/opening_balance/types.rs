//! Opening balance types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tally_shared::types::{AccountId, JournalId, OrganizationId, UserId};

/// Code of the opening balance equity account.
pub const OPENING_BALANCE_EQUITY_CODE: &str = "3999";

/// Name of the opening balance equity account.
pub const OPENING_BALANCE_EQUITY_NAME: &str = "Opening Balance Equity";

/// Input for seeding one account's starting balance.
#[derive(Debug, Clone)]
pub struct SetOpeningBalanceInput {
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// The account receiving the balance.
    pub account_id: AccountId,
    /// Positive debits the account, negative credits it.
    pub amount: Decimal,
    /// Date of the opening journal.
    pub as_of: NaiveDate,
    /// Journal reference; defaults to "Opening balance".
    pub description: Option<String>,
    /// User the posting is attributed to.
    pub created_by: Option<UserId>,
}

/// Balance check of one opening balance journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpeningBalanceJournalCheck {
    /// The journal.
    pub journal_id: JournalId,
    /// Its number.
    pub journal_number: String,
    /// Its date.
    pub date: NaiveDate,
    /// Sum of line debits.
    pub total_debit: Decimal,
    /// Sum of line credits.
    pub total_credit: Decimal,
    /// `total_debit - total_credit`.
    pub imbalance: Decimal,
    /// `|imbalance| < 0.01`.
    pub is_balanced: bool,
}

/// Integrity of all opening balance journals of an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpeningBalanceIntegrityReport {
    /// The organization checked.
    pub organization_id: OrganizationId,
    /// One entry per opening balance journal, by journal number.
    pub journals: Vec<OpeningBalanceJournalCheck>,
    /// Sum of the per-journal imbalances.
    pub aggregate_imbalance: Decimal,
    /// Number of journals failing the check.
    pub failing_journals: usize,
    /// No failing journal and `|aggregate_imbalance| < 0.01`.
    pub is_valid: bool,
}
