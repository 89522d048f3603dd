//! Report data types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, JournalId, OrganizationId};

use crate::invariant::DebitCreditTotals;
use crate::ledger::{Account, AccountSubtype, AccountType, NormalBalance};

/// Debit/credit sums of one account, as aggregated by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountTotals {
    /// The account.
    pub account: Account,
    /// Sums over the lines in range.
    pub totals: DebitCreditTotals,
}

/// One journal line posted to an account, as read by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountEntry {
    /// Journal ID.
    pub journal_id: JournalId,
    /// Journal number.
    pub journal_number: String,
    /// Journal date.
    pub date: NaiveDate,
    /// Journal reference.
    pub reference: Option<String>,
    /// Line number within the journal.
    pub line_number: i32,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Line memo.
    pub memo: Option<String>,
    /// Journal posting time, orders entries within a date.
    pub posted_at: DateTime<Utc>,
}

/// Account balance for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Account subtype.
    pub account_subtype: Option<AccountSubtype>,
    /// Total debit amount.
    pub total_debit: Decimal,
    /// Total credit amount.
    pub total_credit: Decimal,
    /// `total_debit - total_credit`.
    pub balance: Decimal,
}

/// Trial balance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// Report type identifier.
    pub report_type: String,
    /// Organization reported on.
    pub organization_id: OrganizationId,
    /// Lines dated on or before this date are included.
    pub as_of: NaiveDate,
    /// Accounts with activity, by code.
    pub accounts: Vec<AccountBalance>,
    /// Totals.
    pub totals: TrialBalanceTotals,
}

/// Trial balance totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Total debit.
    pub total_debit: Decimal,
    /// Total credit.
    pub total_credit: Decimal,
    /// `total_debit - total_credit`.
    pub difference: Decimal,
    /// `|difference| < 0.01`.
    pub is_balanced: bool,
}

/// Account ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLedgerEntry {
    /// Journal ID.
    pub journal_id: JournalId,
    /// Journal number.
    pub journal_number: String,
    /// Journal date.
    pub date: NaiveDate,
    /// Journal reference.
    pub reference: Option<String>,
    /// Line memo.
    pub memo: Option<String>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Balance after this entry, on the account's normal side.
    pub running_balance: Decimal,
}

/// Account ledger report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLedgerReport {
    /// Report type identifier.
    pub report_type: String,
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Side the balances are expressed on.
    pub normal_balance: NormalBalance,
    /// First date in range.
    pub from: NaiveDate,
    /// Last date in range.
    pub to: NaiveDate,
    /// Balance of everything before `from`.
    pub opening_balance: Decimal,
    /// Entries in range, in posting order.
    pub entries: Vec<AccountLedgerEntry>,
    /// Sum of debits in range.
    pub total_debit: Decimal,
    /// Sum of credits in range.
    pub total_credit: Decimal,
    /// Balance at the end of `to`.
    pub closing_balance: Decimal,
}
