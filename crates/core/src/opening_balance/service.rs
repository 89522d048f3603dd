//! Opening balance service.

use chrono::Utc;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, OrganizationId, round_money};
use tracing::{info, warn};

use super::types::{
    OPENING_BALANCE_EQUITY_CODE, OPENING_BALANCE_EQUITY_NAME, OpeningBalanceIntegrityReport,
    OpeningBalanceJournalCheck, SetOpeningBalanceInput,
};
use crate::invariant::{BALANCE_TOLERANCE, DebitCreditTotals};
use crate::ledger::{
    Account, AccountSubtype, AccountType, Journal, JournalEngine, JournalLineInput,
    JournalSource, LedgerError, PostJournalInput,
};
use crate::store::{LedgerStore, Store, finish};

/// Seeds account balances against the opening balance equity account.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpeningBalanceService {
    journals: JournalEngine,
}

impl OpeningBalanceService {
    /// Creates the service on top of a journal engine.
    #[must_use]
    pub const fn new(journals: JournalEngine) -> Self {
        Self { journals }
    }

    /// Returns the organization's opening balance equity account, creating
    /// it on first use.
    pub async fn ensure_opening_balance_equity_account<S: Store>(
        &self,
        store: &S,
        organization_id: OrganizationId,
    ) -> Result<Account, LedgerError> {
        let mut tx = store.begin().await?;
        let result = self
            .ensure_opening_balance_equity_account_in(&mut tx, organization_id)
            .await;
        finish(tx, result).await
    }

    /// Same as [`Self::ensure_opening_balance_equity_account`] inside the
    /// caller's transaction.
    pub async fn ensure_opening_balance_equity_account_in<T: LedgerStore>(
        &self,
        tx: &mut T,
        organization_id: OrganizationId,
    ) -> Result<Account, LedgerError> {
        if let Some(account) = tx
            .find_account_by_code(organization_id, OPENING_BALANCE_EQUITY_CODE)
            .await?
        {
            return Ok(account);
        }

        let account = tx
            .insert_account(Account {
                id: AccountId::new(),
                organization_id,
                code: OPENING_BALANCE_EQUITY_CODE.to_string(),
                name: OPENING_BALANCE_EQUITY_NAME.to_string(),
                account_type: AccountType::Equity,
                account_subtype: Some(AccountSubtype::OpeningBalanceEquity),
                is_active: true,
                is_system: true,
                created_at: Utc::now(),
            })
            .await?;

        info!(
            organization_id = %organization_id,
            account_id = %account.id,
            "opening balance equity account ready"
        );

        Ok(account)
    }

    /// Posts a two-line journal between the account and opening balance
    /// equity.
    pub async fn set_account_opening_balance<S: Store>(
        &self,
        store: &S,
        input: SetOpeningBalanceInput,
    ) -> Result<Journal, LedgerError> {
        let mut tx = store.begin().await?;
        let result = self.set_account_opening_balance_in(&mut tx, input).await;
        finish(tx, result).await
    }

    /// Same as [`Self::set_account_opening_balance`] inside the caller's
    /// transaction.
    pub async fn set_account_opening_balance_in<T: LedgerStore>(
        &self,
        tx: &mut T,
        input: SetOpeningBalanceInput,
    ) -> Result<Journal, LedgerError> {
        let signed = round_money(input.amount);
        if signed.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }

        let equity = self
            .ensure_opening_balance_equity_account_in(tx, input.organization_id)
            .await?;
        if input.account_id == equity.id {
            return Err(LedgerError::OpeningBalanceOnEquityAccount(equity.id));
        }

        let amount = signed.abs();
        let lines = if signed > Decimal::ZERO {
            vec![
                JournalLineInput::debit(input.account_id, amount),
                JournalLineInput::credit(equity.id, amount),
            ]
        } else {
            vec![
                JournalLineInput::credit(input.account_id, amount),
                JournalLineInput::debit(equity.id, amount),
            ]
        };

        self.journals
            .post_journal_in(
                tx,
                PostJournalInput {
                    organization_id: input.organization_id,
                    date: input.as_of,
                    reference: Some(
                        input
                            .description
                            .unwrap_or_else(|| "Opening balance".to_string()),
                    ),
                    source: JournalSource::OpeningBalance,
                    lines,
                    created_by: input.created_by,
                },
            )
            .await
    }

    /// Re-checks every opening balance journal from its persisted lines.
    pub async fn validate_opening_balance_integrity<S: Store>(
        &self,
        store: &S,
        organization_id: OrganizationId,
    ) -> Result<OpeningBalanceIntegrityReport, LedgerError> {
        let mut tx = store.begin_read_only().await?;
        let result = tx
            .journals_by_source(organization_id, JournalSource::OpeningBalance)
            .await
            .map_err(LedgerError::from)
            .map(|journals| build_integrity_report(organization_id, &journals));
        finish(tx, result).await
    }
}

/// Builds the integrity report; a journal fails when `|imbalance| >= 0.01`.
#[must_use]
pub fn build_integrity_report(
    organization_id: OrganizationId,
    journals: &[Journal],
) -> OpeningBalanceIntegrityReport {
    let checks: Vec<OpeningBalanceJournalCheck> = journals
        .iter()
        .map(|journal| {
            let totals: DebitCreditTotals = journal.line_totals();
            OpeningBalanceJournalCheck {
                journal_id: journal.id,
                journal_number: journal.journal_number.clone(),
                date: journal.date,
                total_debit: totals.debit,
                total_credit: totals.credit,
                imbalance: totals.difference(),
                is_balanced: totals.is_balanced_within(BALANCE_TOLERANCE),
            }
        })
        .collect();

    let aggregate_imbalance: Decimal = checks.iter().map(|c| c.imbalance).sum();
    let failing_journals = checks.iter().filter(|c| !c.is_balanced).count();
    let is_valid = failing_journals == 0 && aggregate_imbalance.abs() < BALANCE_TOLERANCE;

    if !is_valid {
        warn!(
            organization_id = %organization_id,
            failing_journals,
            aggregate_imbalance = %aggregate_imbalance,
            "opening balance integrity check failed"
        );
    }

    OpeningBalanceIntegrityReport {
        organization_id,
        journals: checks,
        aggregate_imbalance,
        failing_journals,
        is_valid,
    }
}
