//! PostgreSQL implementation of the core store traits.
//!
//! [`PgStore`] hands out [`PgTx`] values wrapping one `SeaORM`
//! [`DatabaseTransaction`] each. Writers run at READ COMMITTED and
//! serialize on `SELECT ... FOR UPDATE` row locks; report readers get a
//! READ ONLY, REPEATABLE READ snapshot.

mod convert;
mod inventory;
mod ledger;
mod transfer;

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr,
    IsolationLevel, RuntimeErr, Statement, TransactionTrait,
};
use tally_core::store::{DocumentKind, DocumentSequence, Store, StoreError, StoreTx};
use tally_shared::types::OrganizationId;

/// Serialization failure.
const SQLSTATE_SERIALIZATION_FAILURE: &str = "40001";
/// Deadlock detected.
const SQLSTATE_DEADLOCK: &str = "40P01";
/// Write attempted in a read-only transaction.
const SQLSTATE_READ_ONLY: &str = "25006";

/// Maps a database error onto the store taxonomy.
pub(crate) fn db_err(err: DbErr) -> StoreError {
    match sqlstate(&err).as_deref() {
        Some(SQLSTATE_SERIALIZATION_FAILURE | SQLSTATE_DEADLOCK) => {
            StoreError::Conflict(err.to_string())
        }
        Some(SQLSTATE_READ_ONLY) => StoreError::ReadOnly,
        _ => StoreError::Database(err.to_string()),
    }
}

fn sqlstate(err: &DbErr) -> Option<String> {
    let runtime = match err {
        DbErr::Conn(e) | DbErr::Exec(e) | DbErr::Query(e) => e,
        _ => return None,
    };
    match runtime {
        RuntimeErr::SqlxError(sqlx::Error::Database(db)) => db.code().map(|c| c.into_owned()),
        _ => None,
    }
}

/// Store backed by a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    db: DatabaseConnection,
}

impl PgStore {
    /// Creates a new store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Store for PgStore {
    type Tx = PgTx;

    async fn begin(&self) -> Result<PgTx, StoreError> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::ReadCommitted), None)
            .await
            .map_err(db_err)?;
        Ok(PgTx { txn })
    }

    async fn begin_read_only(&self) -> Result<PgTx, StoreError> {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::RepeatableRead),
                Some(AccessMode::ReadOnly),
            )
            .await
            .map_err(db_err)?;
        Ok(PgTx { txn })
    }
}

/// One open database transaction.
pub struct PgTx {
    txn: DatabaseTransaction,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().await.map_err(db_err)
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.txn.rollback().await.map_err(db_err)
    }
}

#[async_trait]
impl DocumentSequence for PgTx {
    async fn next_document_number(
        &mut self,
        organization_id: OrganizationId,
        kind: DocumentKind,
    ) -> Result<i64, StoreError> {
        // The upsert row lock serializes concurrent allocations per organization.
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r"
            INSERT INTO document_sequences (organization_id, document_type, last_value)
            VALUES ($1, $2, 1)
            ON CONFLICT (organization_id, document_type)
            DO UPDATE SET last_value = document_sequences.last_value + 1
            RETURNING last_value
            ",
            [organization_id.into_inner().into(), kind.as_str().into()],
        );
        let row = self
            .txn
            .query_one(stmt)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StoreError::Internal("document sequence returned no row".into()))?;
        row.try_get::<i64>("", "last_value").map_err(db_err)
    }
}
