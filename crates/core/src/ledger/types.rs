//! Ledger domain types: accounts, journals and journal lines.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tally_shared::types::{AccountId, JournalId, JournalLineId, OrganizationId, UserId};

use crate::invariant::DebitCreditTotals;

/// Top-level account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned (cash, stock, receivables).
    Asset,
    /// Obligations owed.
    Liability,
    /// Owner's residual interest.
    Equity,
    /// Revenue and other income.
    Income,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// The side on which this account type normally carries its balance.
    ///
    /// - Asset/Expense: debit-normal
    /// - Liability/Equity/Income: credit-normal
    #[must_use]
    pub fn normal_balance(&self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Income => NormalBalance::Credit,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Side on which an account's balance grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Balance += debit - credit.
    Debit,
    /// Balance += credit - debit.
    Credit,
}

impl NormalBalance {
    /// Calculates the balance change for a line.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// Finer account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountSubtype {
    /// Bank account.
    Bank,
    /// Cash on hand.
    Cash,
    /// Accounts receivable.
    Receivable,
    /// Accounts payable.
    Payable,
    /// Inventory / stock on hand.
    Stock,
    /// Cost of goods sold.
    CostOfGoodsSold,
    /// Sales revenue.
    Sales,
    /// Operating expense.
    OperatingExpense,
    /// Counter-account for opening balances.
    OpeningBalanceEquity,
    /// Anything else.
    Other,
}

impl AccountSubtype {
    /// Returns the string representation of the subtype.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bank => "bank",
            Self::Cash => "cash",
            Self::Receivable => "receivable",
            Self::Payable => "payable",
            Self::Stock => "stock",
            Self::CostOfGoodsSold => "cost_of_goods_sold",
            Self::Sales => "sales",
            Self::OperatingExpense => "operating_expense",
            Self::OpeningBalanceEquity => "opening_balance_equity",
            Self::Other => "other",
        }
    }
}

/// A chart of accounts entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The account ID.
    pub id: AccountId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Code, unique per organization.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Optional subtype.
    pub account_subtype: Option<AccountSubtype>,
    /// Whether lines may be posted to the account.
    pub is_active: bool,
    /// Created by the system rather than a user.
    pub is_system: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Where a journal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalSource {
    /// Entered directly.
    Manual,
    /// Opening balance against opening balance equity.
    OpeningBalance,
    /// Inventory value moved between cost centers.
    InventoryTransfer,
    /// Reversal of an inventory transfer journal.
    TransferReversal,
}

impl JournalSource {
    /// Returns the string representation of the source.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::OpeningBalance => "opening_balance",
            Self::InventoryTransfer => "inventory_transfer",
            Self::TransferReversal => "transfer_reversal",
        }
    }
}

/// Input for a single journal line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalLineInput {
    /// The account to post to.
    pub account_id: AccountId,
    /// Debit amount (zero for a credit line).
    pub debit: Decimal,
    /// Credit amount (zero for a debit line).
    pub credit: Decimal,
    /// Optional memo.
    pub memo: Option<String>,
}

impl JournalLineInput {
    /// A debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
            memo: None,
        }
    }

    /// A credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
            memo: None,
        }
    }

    /// Attaches a memo.
    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }
}

/// Input for posting a journal.
#[derive(Debug, Clone)]
pub struct PostJournalInput {
    /// The organization the journal belongs to.
    pub organization_id: OrganizationId,
    /// Accounting date.
    pub date: NaiveDate,
    /// Free-form reference (document number, description).
    pub reference: Option<String>,
    /// Origin of the journal.
    pub source: JournalSource,
    /// The lines (at least two).
    pub lines: Vec<JournalLineInput>,
    /// User the posting is attributed to.
    pub created_by: Option<UserId>,
}

/// A persisted journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// The line ID.
    pub id: JournalLineId,
    /// Owning journal.
    pub journal_id: JournalId,
    /// 1-based position within the journal.
    pub line_number: i32,
    /// The account posted to.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Optional memo.
    pub memo: Option<String>,
}

/// A persisted journal with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    /// The journal ID.
    pub id: JournalId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Human-readable number, unique per organization (`JV-000001`).
    pub journal_number: String,
    /// Accounting date.
    pub date: NaiveDate,
    /// Free-form reference.
    pub reference: Option<String>,
    /// Origin of the journal.
    pub source: JournalSource,
    /// Sum of line debits at posting time.
    pub total_debit: Decimal,
    /// Sum of line credits at posting time.
    pub total_credit: Decimal,
    /// User the posting is attributed to.
    pub created_by: Option<UserId>,
    /// Posting time.
    pub created_at: DateTime<Utc>,
    /// The lines, ordered by line number.
    pub lines: Vec<JournalLine>,
}

impl Journal {
    /// Totals recomputed from the lines (not the stored header totals).
    #[must_use]
    pub fn line_totals(&self) -> DebitCreditTotals {
        DebitCreditTotals::from_pairs(self.lines.iter().map(|l| (l.debit, l.credit)))
    }
}

/// Result of re-reading a persisted journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerBalanceCheck {
    /// The journal checked.
    pub journal_id: JournalId,
    /// Whether the persisted lines balance within tolerance.
    pub balanced: bool,
    /// Sum of persisted debits.
    pub total_debit: Decimal,
    /// Sum of persisted credits.
    pub total_credit: Decimal,
    /// `total_debit - total_credit`.
    pub difference: Decimal,
}
