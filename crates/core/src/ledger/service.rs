//! Journal engine: validates and persists balanced journals.

use std::collections::HashSet;

use chrono::Utc;
use rust_decimal::Decimal;
use tally_shared::config::LedgerConfig;
use tally_shared::types::{JournalId, JournalLineId, OrganizationId, round_money};
use tracing::{debug, info};

use super::error::LedgerError;
use super::types::{Journal, JournalLine, JournalLineInput, LedgerBalanceCheck, PostJournalInput};
use super::validation::validate_lines;
use crate::invariant::{BALANCE_TOLERANCE, DebitCreditTotals};
use crate::store::{DocumentKind, LedgerStore, Store, finish};

/// Validates and persists double-entry journals.
#[derive(Debug, Clone, Copy)]
pub struct JournalEngine {
    tolerance: Decimal,
}

impl Default for JournalEngine {
    fn default() -> Self {
        Self {
            tolerance: BALANCE_TOLERANCE,
        }
    }
}

impl JournalEngine {
    /// Creates an engine with an explicit balance tolerance.
    ///
    /// The tolerance must be positive and no looser than
    /// [`BALANCE_TOLERANCE`], which reports and integrity checks use.
    pub fn new(tolerance: Decimal) -> Result<Self, LedgerError> {
        if tolerance <= Decimal::ZERO || tolerance > BALANCE_TOLERANCE {
            return Err(LedgerError::InvalidTolerance(tolerance));
        }
        Ok(Self { tolerance })
    }

    /// Creates an engine from the ledger configuration section.
    pub fn from_config(config: &LedgerConfig) -> Result<Self, LedgerError> {
        Self::new(config.balance_tolerance)
    }

    /// The balance tolerance in use.
    #[must_use]
    pub const fn tolerance(&self) -> Decimal {
        self.tolerance
    }

    /// Validates and persists a journal in its own transaction.
    pub async fn post_journal<S: Store>(
        &self,
        store: &S,
        input: PostJournalInput,
    ) -> Result<Journal, LedgerError> {
        let mut tx = store.begin().await?;
        let result = self.post_journal_in(&mut tx, input).await;
        finish(tx, result).await
    }

    /// Validates and persists a journal inside the caller's transaction.
    ///
    /// Amounts are rounded to the money scale before validation so that the
    /// persisted lines are exactly the ones checked.
    pub async fn post_journal_in<T: LedgerStore>(
        &self,
        tx: &mut T,
        input: PostJournalInput,
    ) -> Result<Journal, LedgerError> {
        let lines: Vec<JournalLineInput> = input
            .lines
            .into_iter()
            .map(|line| JournalLineInput {
                debit: round_money(line.debit),
                credit: round_money(line.credit),
                ..line
            })
            .collect();

        let totals = validate_lines(&lines, self.tolerance)?;

        let mut checked = HashSet::new();
        for line in &lines {
            if !checked.insert(line.account_id) {
                continue;
            }
            let account = tx
                .find_account(input.organization_id, line.account_id)
                .await?
                .ok_or(LedgerError::AccountNotFound(line.account_id))?;
            if !account.is_active {
                return Err(LedgerError::AccountInactive(account.id));
            }
        }

        let sequence = tx
            .next_document_number(input.organization_id, DocumentKind::Journal)
            .await?;
        let journal_id = JournalId::new();

        let journal = Journal {
            id: journal_id,
            organization_id: input.organization_id,
            journal_number: DocumentKind::Journal.format_number(sequence),
            date: input.date,
            reference: input.reference,
            source: input.source,
            total_debit: totals.debit,
            total_credit: totals.credit,
            created_by: input.created_by,
            created_at: Utc::now(),
            lines: lines
                .into_iter()
                .zip(1..)
                .map(|(line, line_number)| JournalLine {
                    id: JournalLineId::new(),
                    journal_id,
                    line_number,
                    account_id: line.account_id,
                    debit: line.debit,
                    credit: line.credit,
                    memo: line.memo,
                })
                .collect(),
        };

        let journal = tx.insert_journal(journal).await?;

        info!(
            organization_id = %journal.organization_id,
            journal_id = %journal.id,
            journal_number = %journal.journal_number,
            source = journal.source.as_str(),
            total = %journal.total_debit,
            lines = journal.lines.len(),
            "journal posted"
        );

        Ok(journal)
    }

    /// Re-reads a persisted journal and recomputes its totals.
    pub async fn check_ledger_balance<S: Store>(
        &self,
        store: &S,
        organization_id: OrganizationId,
        journal_id: JournalId,
    ) -> Result<LedgerBalanceCheck, LedgerError> {
        let mut tx = store.begin_read_only().await?;
        let result = self
            .check_ledger_balance_in(&mut tx, organization_id, journal_id)
            .await;
        finish(tx, result).await
    }

    /// Re-reads a persisted journal inside the caller's transaction.
    pub async fn check_ledger_balance_in<T: LedgerStore>(
        &self,
        tx: &mut T,
        organization_id: OrganizationId,
        journal_id: JournalId,
    ) -> Result<LedgerBalanceCheck, LedgerError> {
        if tx.find_journal(organization_id, journal_id).await?.is_none() {
            return Err(LedgerError::JournalNotFound(journal_id));
        }

        let lines = tx.journal_lines(organization_id, journal_id).await?;
        let totals = DebitCreditTotals::from_pairs(lines.iter().map(|l| (l.debit, l.credit)));
        let balanced = totals.is_balanced_within(self.tolerance);

        debug!(
            journal_id = %journal_id,
            balanced,
            difference = %totals.difference(),
            "ledger balance checked"
        );

        Ok(LedgerBalanceCheck {
            journal_id,
            balanced,
            total_debit: totals.debit,
            total_credit: totals.credit,
            difference: totals.difference(),
        })
    }
}
