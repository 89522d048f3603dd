//! [`LedgerStore`] on PostgreSQL.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, EntityTrait, FromQueryResult, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait,
};
use tally_core::invariant::DebitCreditTotals;
use tally_core::ledger::{Account, Journal, JournalLine, JournalSource};
use tally_core::reports::{AccountEntry, AccountTotals};
use tally_core::store::{LedgerStore, StoreError};
use tally_shared::types::{AccountId, JournalId, OrganizationId};
use uuid::Uuid;

use super::convert::{
    account_active_model, journal_active_model, journal_from_models, journal_line_active_model,
};
use super::{PgTx, db_err};
use crate::entities::sea_orm_active_enums::JournalSource as DbJournalSource;
use crate::entities::{accounts, journal_lines, journals};

#[derive(Debug, FromQueryResult)]
struct AccountSums {
    account_id: Uuid,
    debit: Option<Decimal>,
    credit: Option<Decimal>,
}

#[async_trait]
impl LedgerStore for PgTx {
    async fn find_account(
        &mut self,
        organization_id: OrganizationId,
        account_id: AccountId,
    ) -> Result<Option<Account>, StoreError> {
        let model = accounts::Entity::find_by_id(account_id.into_inner())
            .filter(accounts::Column::OrganizationId.eq(organization_id.into_inner()))
            .one(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(model.map(Into::into))
    }

    async fn find_account_by_code(
        &mut self,
        organization_id: OrganizationId,
        code: &str,
    ) -> Result<Option<Account>, StoreError> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(accounts::Column::Code.eq(code))
            .one(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(model.map(Into::into))
    }

    async fn insert_account(&mut self, account: Account) -> Result<Account, StoreError> {
        accounts::Entity::insert(account_active_model(&account))
            .on_conflict(
                OnConflict::columns([accounts::Column::OrganizationId, accounts::Column::Code])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.txn)
            .await
            .map_err(db_err)?;

        self.find_account_by_code(account.organization_id, &account.code)
            .await?
            .ok_or_else(|| StoreError::Internal(format!("account {} vanished", account.code)))
    }

    async fn insert_journal(&mut self, journal: Journal) -> Result<Journal, StoreError> {
        journals::Entity::insert(journal_active_model(&journal))
            .exec_without_returning(&self.txn)
            .await
            .map_err(db_err)?;

        if !journal.lines.is_empty() {
            let lines = journal
                .lines
                .iter()
                .map(|line| journal_line_active_model(&journal, line));
            journal_lines::Entity::insert_many(lines)
                .exec_without_returning(&self.txn)
                .await
                .map_err(db_err)?;
        }

        Ok(journal)
    }

    async fn find_journal(
        &mut self,
        organization_id: OrganizationId,
        journal_id: JournalId,
    ) -> Result<Option<Journal>, StoreError> {
        let Some(header) = journals::Entity::find_by_id(journal_id.into_inner())
            .filter(journals::Column::OrganizationId.eq(organization_id.into_inner()))
            .one(&self.txn)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let lines = journal_lines::Entity::find()
            .filter(journal_lines::Column::JournalId.eq(header.id))
            .all(&self.txn)
            .await
            .map_err(db_err)?;

        Ok(Some(journal_from_models(header, lines)))
    }

    async fn journal_lines(
        &mut self,
        organization_id: OrganizationId,
        journal_id: JournalId,
    ) -> Result<Vec<JournalLine>, StoreError> {
        let lines = journal_lines::Entity::find()
            .filter(journal_lines::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(journal_lines::Column::JournalId.eq(journal_id.into_inner()))
            .order_by_asc(journal_lines::Column::LineNumber)
            .all(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(lines.into_iter().map(Into::into).collect())
    }

    async fn journals_by_source(
        &mut self,
        organization_id: OrganizationId,
        source: JournalSource,
    ) -> Result<Vec<Journal>, StoreError> {
        let rows = journals::Entity::find()
            .filter(journals::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(journals::Column::Source.eq(DbJournalSource::from(source)))
            .order_by_asc(journals::Column::JournalNumber)
            .find_with_related(journal_lines::Entity)
            .all(&self.txn)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|(header, lines)| journal_from_models(header, lines))
            .collect())
    }

    async fn account_totals(
        &mut self,
        organization_id: OrganizationId,
        as_of: NaiveDate,
    ) -> Result<Vec<AccountTotals>, StoreError> {
        let org = organization_id.into_inner();

        let sums: HashMap<Uuid, DebitCreditTotals> = journal_lines::Entity::find()
            .select_only()
            .column(journal_lines::Column::AccountId)
            .column_as(journal_lines::Column::Debit.sum(), "debit")
            .column_as(journal_lines::Column::Credit.sum(), "credit")
            .join(JoinType::InnerJoin, journal_lines::Relation::Journals.def())
            .filter(journal_lines::Column::OrganizationId.eq(org))
            .filter(journals::Column::JournalDate.lte(as_of))
            .group_by(journal_lines::Column::AccountId)
            .into_model::<AccountSums>()
            .all(&self.txn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|row| {
                let totals = DebitCreditTotals::new(
                    row.debit.unwrap_or_default(),
                    row.credit.unwrap_or_default(),
                );
                (row.account_id, totals)
            })
            .collect();

        let accounts = accounts::Entity::find()
            .filter(accounts::Column::OrganizationId.eq(org))
            .order_by_asc(accounts::Column::Code)
            .all(&self.txn)
            .await
            .map_err(db_err)?;

        Ok(accounts
            .into_iter()
            .map(|model| AccountTotals {
                totals: sums.get(&model.id).copied().unwrap_or_default(),
                account: model.into(),
            })
            .collect())
    }

    async fn account_entries(
        &mut self,
        organization_id: OrganizationId,
        account_id: AccountId,
        to: NaiveDate,
    ) -> Result<Vec<AccountEntry>, StoreError> {
        let rows = journal_lines::Entity::find()
            .filter(journal_lines::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(journal_lines::Column::AccountId.eq(account_id.into_inner()))
            .find_also_related(journals::Entity)
            .filter(journals::Column::JournalDate.lte(to))
            .all(&self.txn)
            .await
            .map_err(db_err)?;

        let mut entries: Vec<AccountEntry> = rows
            .into_iter()
            .filter_map(|(line, journal)| {
                journal.map(|journal| AccountEntry {
                    journal_id: journal.id.into(),
                    journal_number: journal.journal_number,
                    date: journal.journal_date,
                    reference: journal.reference,
                    line_number: line.line_number,
                    debit: line.debit,
                    credit: line.credit,
                    memo: line.memo,
                    posted_at: journal.created_at.with_timezone(&Utc),
                })
            })
            .collect();

        entries.sort_by(|a, b| {
            (a.date, a.posted_at, &a.journal_number, a.line_number).cmp(&(
                b.date,
                b.posted_at,
                &b.journal_number,
                b.line_number,
            ))
        });
        Ok(entries)
    }
}
