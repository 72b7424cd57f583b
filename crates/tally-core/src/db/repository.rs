//! Transaction repository implementation

#![allow(clippy::cast_possible_wrap)] // SQLite uses i64 for LIMIT/OFFSET

use std::str::FromStr;

use libsql::{params, Connection};
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::models::{LocalId, Transaction};

const SELECT_COLUMNS: &str = "SELECT local_id, remote_id, title, amount, kind, category, notes,
        created_at, updated_at, pending_update, pending_delete
     FROM transactions";

/// Record storage consumed by the sync engine.
///
/// Mutation is whole-row: `replace` overwrites every column of the row with
/// the same `local_id`.
#[allow(async_fn_in_trait)]
pub trait RecordStore {
    /// Every stored record, deleted-pending ones included, in `local_id` order
    async fn scan_all(&self) -> Result<Vec<Transaction>>;

    /// Insert a record and return its newly assigned local id.
    ///
    /// The `local_id` carried by `transaction` is ignored.
    async fn insert(&self, transaction: &Transaction) -> Result<LocalId>;

    /// Overwrite the row identified by `transaction.local_id`
    async fn replace(&self, transaction: &Transaction) -> Result<()>;

    /// Remove a row; removing a missing row is a no-op
    async fn delete(&self, id: LocalId) -> Result<()>;

    /// Current state of a single record
    async fn get(&self, id: LocalId) -> Result<Option<Transaction>> {
        Ok(self
            .scan_all()
            .await?
            .into_iter()
            .find(|transaction| transaction.local_id == id))
    }

    /// First record (lowest `local_id`) whose `created_at` equals `created_at`
    async fn find_by_created_at(&self, created_at: i64) -> Result<Option<Transaction>> {
        Ok(self
            .scan_all()
            .await?
            .into_iter()
            .find(|transaction| transaction.created_at == created_at))
    }
}

/// Number of records waiting for each push phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingCounts {
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
}

impl PendingCounts {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.creates + self.updates + self.deletes
    }
}

/// libSQL implementation of `RecordStore`
pub struct LibSqlTransactionRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlTransactionRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// List records not pending deletion, newest first
    pub async fn list_visible(&self, limit: usize, offset: usize) -> Result<Vec<Transaction>> {
        let sql = format!(
            "{SELECT_COLUMNS}
             WHERE pending_delete = 0
             ORDER BY created_at DESC, local_id DESC
             LIMIT ? OFFSET ?"
        );
        let rows = self
            .conn
            .query(&sql, params![limit as i64, offset as i64])
            .await?;
        Self::collect(rows).await
    }

    /// Count records awaiting each push phase
    pub async fn pending_counts(&self) -> Result<PendingCounts> {
        let mut rows = self
            .conn
            .query(
                "SELECT
                    COALESCE(SUM(CASE WHEN remote_id = 0 AND pending_delete = 0 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN remote_id != 0 AND pending_update = 1 AND pending_delete = 0 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN pending_delete = 1 THEN 1 ELSE 0 END), 0)
                 FROM transactions",
                (),
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Ok(PendingCounts::default());
        };

        Ok(PendingCounts {
            creates: count_to_usize(row.get::<i64>(0)?),
            updates: count_to_usize(row.get::<i64>(1)?),
            deletes: count_to_usize(row.get::<i64>(2)?),
        })
    }

    async fn query_one(&self, sql: &str, value: i64) -> Result<Option<Transaction>> {
        let mut rows = self.conn.query(sql, params![value]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_transaction(&row)?)),
            None => Ok(None),
        }
    }

    async fn collect(mut rows: libsql::Rows) -> Result<Vec<Transaction>> {
        let mut transactions = Vec::new();
        while let Some(row) = rows.next().await? {
            transactions.push(Self::parse_transaction(&row)?);
        }
        Ok(transactions)
    }

    /// Parse a transaction from a database row
    fn parse_transaction(row: &libsql::Row) -> Result<Transaction> {
        let amount: String = row.get(3)?;
        let kind: String = row.get(4)?;

        Ok(Transaction {
            local_id: LocalId::new(row.get(0)?),
            remote_id: row.get(1)?,
            title: row.get(2)?,
            amount: Decimal::from_str(&amount).map_err(|error| {
                Error::Database(format!("invalid stored amount '{amount}': {error}"))
            })?,
            kind: kind.parse()?,
            category: row.get(5)?,
            notes: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
            pending_update: row.get::<i32>(9)? != 0,
            pending_delete: row.get::<i32>(10)? != 0,
        })
    }
}

impl RecordStore for LibSqlTransactionRepository<'_> {
    async fn scan_all(&self) -> Result<Vec<Transaction>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY local_id ASC");
        let rows = self.conn.query(&sql, ()).await?;
        Self::collect(rows).await
    }

    async fn insert(&self, transaction: &Transaction) -> Result<LocalId> {
        self.conn
            .execute(
                "INSERT INTO transactions (
                    remote_id, title, amount, kind, category, notes,
                    created_at, updated_at, pending_update, pending_delete
                 ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    transaction.remote_id,
                    transaction.title.clone(),
                    transaction.amount.to_string(),
                    transaction.kind.as_str(),
                    transaction.category.clone(),
                    transaction.notes.clone(),
                    transaction.created_at,
                    transaction.updated_at,
                    i32::from(transaction.pending_update),
                    i32::from(transaction.pending_delete)
                ],
            )
            .await?;

        Ok(LocalId::new(self.conn.last_insert_rowid()))
    }

    async fn replace(&self, transaction: &Transaction) -> Result<()> {
        let rows = self
            .conn
            .execute(
                "UPDATE transactions SET
                    remote_id = ?, title = ?, amount = ?, kind = ?, category = ?, notes = ?,
                    created_at = ?, updated_at = ?, pending_update = ?, pending_delete = ?
                 WHERE local_id = ?",
                params![
                    transaction.remote_id,
                    transaction.title.clone(),
                    transaction.amount.to_string(),
                    transaction.kind.as_str(),
                    transaction.category.clone(),
                    transaction.notes.clone(),
                    transaction.created_at,
                    transaction.updated_at,
                    i32::from(transaction.pending_update),
                    i32::from(transaction.pending_delete),
                    transaction.local_id.get()
                ],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(transaction.local_id.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: LocalId) -> Result<()> {
        self.conn
            .execute(
                "DELETE FROM transactions WHERE local_id = ?",
                params![id.get()],
            )
            .await?;
        Ok(())
    }

    async fn get(&self, id: LocalId) -> Result<Option<Transaction>> {
        let sql = format!("{SELECT_COLUMNS} WHERE local_id = ?");
        self.query_one(&sql, id.get()).await
    }

    async fn find_by_created_at(&self, created_at: i64) -> Result<Option<Transaction>> {
        let sql = format!("{SELECT_COLUMNS} WHERE created_at = ? ORDER BY local_id ASC LIMIT 1");
        self.query_one(&sql, created_at).await
    }
}

fn count_to_usize(value: i64) -> usize {
    usize::try_from(value).unwrap_or_default()
}
