//! Report generation service.
//!
//! The `build_*` functions are pure; the `generate_*` functions read
//! through a read-only store transaction and delegate to them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, OrganizationId};
use tracing::{debug, warn};

use super::error::ReportError;
use super::types::{
    AccountBalance, AccountEntry, AccountLedgerEntry, AccountLedgerReport, AccountTotals,
    TrialBalanceReport, TrialBalanceTotals,
};
use crate::invariant::DebitCreditTotals;
use crate::ledger::Account;
use crate::store::{LedgerStore, Store, finish};

/// Service for generating ledger reports.
pub struct ReportService;

impl ReportService {
    /// Generates the trial balance as of a date from one consistent
    /// snapshot.
    pub async fn generate_trial_balance<S: Store>(
        store: &S,
        organization_id: OrganizationId,
        as_of: NaiveDate,
    ) -> Result<TrialBalanceReport, ReportError> {
        let mut tx = store.begin_read_only().await?;
        let result = tx
            .account_totals(organization_id, as_of)
            .await
            .map_err(ReportError::from)
            .map(|rows| Self::build_trial_balance(organization_id, as_of, rows));
        let report = finish(tx, result).await?;

        if report.totals.is_balanced {
            debug!(
                organization_id = %organization_id,
                as_of = %as_of,
                total = %report.totals.total_debit,
                "trial balance generated"
            );
        } else {
            warn!(
                organization_id = %organization_id,
                as_of = %as_of,
                difference = %report.totals.difference,
                "trial balance does not balance"
            );
        }

        Ok(report)
    }

    /// Builds a trial balance from per-account totals.
    ///
    /// Accounts without activity are left out; the rest are sorted by code.
    #[must_use]
    pub fn build_trial_balance(
        organization_id: OrganizationId,
        as_of: NaiveDate,
        rows: Vec<AccountTotals>,
    ) -> TrialBalanceReport {
        let mut grand = DebitCreditTotals::default();
        let mut accounts: Vec<AccountBalance> = rows
            .into_iter()
            .filter(|row| !(row.totals.debit.is_zero() && row.totals.credit.is_zero()))
            .map(|row| {
                grand += row.totals;
                AccountBalance {
                    account_id: row.account.id,
                    code: row.account.code,
                    name: row.account.name,
                    account_type: row.account.account_type,
                    account_subtype: row.account.account_subtype,
                    total_debit: row.totals.debit,
                    total_credit: row.totals.credit,
                    balance: row.totals.difference(),
                }
            })
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));

        TrialBalanceReport {
            report_type: "trial_balance".to_string(),
            organization_id,
            as_of,
            accounts,
            totals: TrialBalanceTotals {
                total_debit: grand.debit,
                total_credit: grand.credit,
                difference: grand.difference(),
                is_balanced: grand.is_balanced(),
            },
        }
    }

    /// Generates the ledger of one account between two dates (inclusive).
    pub async fn account_ledger<S: Store>(
        store: &S,
        organization_id: OrganizationId,
        account_id: AccountId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<AccountLedgerReport, ReportError> {
        if from > to {
            return Err(ReportError::InvalidDateRange {
                start: from,
                end: to,
            });
        }

        let mut tx = store.begin_read_only().await?;
        let result = async {
            let account = tx
                .find_account(organization_id, account_id)
                .await?
                .ok_or(ReportError::AccountNotFound(account_id))?;
            let entries = tx.account_entries(organization_id, account_id, to).await?;
            Ok::<_, ReportError>(Self::build_account_ledger(&account, from, to, entries))
        }
        .await;
        finish(tx, result).await
    }

    /// Builds an account ledger from the account's entries up to `to`.
    ///
    /// Entries before `from` roll into the opening balance. Balances are
    /// expressed on the account's normal side.
    #[must_use]
    pub fn build_account_ledger(
        account: &Account,
        from: NaiveDate,
        to: NaiveDate,
        entries: Vec<AccountEntry>,
    ) -> AccountLedgerReport {
        let side = account.account_type.normal_balance();
        let mut opening_balance = Decimal::ZERO;
        let mut in_range = DebitCreditTotals::default();
        let mut running = Decimal::ZERO;
        let mut lines = Vec::new();

        for entry in entries.into_iter().filter(|e| e.date <= to) {
            let change = side.balance_change(entry.debit, entry.credit);
            if entry.date < from {
                opening_balance += change;
                running = opening_balance;
                continue;
            }
            running += change;
            in_range.add(entry.debit, entry.credit);
            lines.push(AccountLedgerEntry {
                journal_id: entry.journal_id,
                journal_number: entry.journal_number,
                date: entry.date,
                reference: entry.reference,
                memo: entry.memo,
                debit: entry.debit,
                credit: entry.credit,
                running_balance: running,
            });
        }

        AccountLedgerReport {
            report_type: "account_ledger".to_string(),
            account_id: account.id,
            code: account.code.clone(),
            name: account.name.clone(),
            normal_balance: side,
            from,
            to,
            opening_balance,
            entries: lines,
            total_debit: in_range.debit,
            total_credit: in_range.credit,
            closing_balance: opening_balance + side.balance_change(in_range.debit, in_range.credit),
        }
    }
}
