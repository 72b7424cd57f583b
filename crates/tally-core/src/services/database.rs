//! Shared database service wrapper used by the CLI and the sync engine.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::db::{
    CursorStore, Database, LibSqlSettingsRepository, LibSqlTransactionRepository, PendingCounts,
    RecordStore,
};
use crate::models::{LocalId, Transaction, TransactionChanges, TransactionDraft};
use crate::sync::CURSOR_KEY;
use crate::util::now_millis;
use crate::{Error, Result};

/// What a local delete did to the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteDisposition {
    /// Never synced, removed from the store immediately
    Purged,
    /// Flagged `pending_delete`, removed after the remote delete succeeds
    QueuedForSync,
}

/// Thread-safe service for DB and repository operations.
///
/// Each call holds the connection lock for its whole read-modify-write, so a
/// user edit and a sync step never interleave inside a single row update.
#[derive(Clone)]
pub struct DatabaseService {
    db: Arc<Mutex<Database>>,
    db_path: Option<PathBuf>,
}

impl DatabaseService {
    /// Open a database service at the given filesystem path.
    pub async fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&db_path).await?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: Some(db_path),
        })
    }

    /// Open an in-memory database service (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: None,
        })
    }

    /// Filesystem location of the database, `None` when in memory.
    pub fn db_path(&self) -> Option<&PathBuf> {
        self.db_path.as_ref()
    }

    /// Record a new transaction created by the user.
    pub async fn add_transaction(&self, draft: TransactionDraft) -> Result<Transaction> {
        draft.validate()?;

        let mut transaction = Transaction::from_draft(draft, now_millis());
        let db = self.db.lock().await;
        let repo = LibSqlTransactionRepository::new(db.connection());
        transaction.local_id = repo.insert(&transaction).await?;

        tracing::debug!(local_id = %transaction.local_id, "Added transaction");
        Ok(transaction)
    }

    /// Fetch a transaction by local id, including ones pending deletion.
    pub async fn get_transaction(&self, id: LocalId) -> Result<Option<Transaction>> {
        let db = self.db.lock().await;
        let repo = LibSqlTransactionRepository::new(db.connection());
        repo.get(id).await
    }

    /// List transactions newest-first, hiding ones pending deletion.
    pub async fn list_transactions(&self, limit: usize, offset: usize) -> Result<Vec<Transaction>> {
        let db = self.db.lock().await;
        let repo = LibSqlTransactionRepository::new(db.connection());
        repo.list_visible(limit, offset).await
    }

    /// Apply a user edit to an existing transaction.
    pub async fn edit_transaction(
        &self,
        id: LocalId,
        changes: TransactionChanges,
    ) -> Result<Transaction> {
        if changes.is_empty() {
            return Err(Error::InvalidInput("no changes provided".to_string()));
        }
        if changes
            .title
            .as_deref()
            .is_some_and(|title| title.trim().is_empty())
        {
            return Err(Error::InvalidInput(
                "transaction title cannot be empty".to_string(),
            ));
        }

        let db = self.db.lock().await;
        let repo = LibSqlTransactionRepository::new(db.connection());
        let mut transaction = repo
            .get(id)
            .await?
            .filter(|transaction| !transaction.pending_delete)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        if transaction.apply_changes(changes, now_millis()) {
            repo.replace(&transaction).await?;
            tracing::debug!(
                local_id = %id,
                pending_update = transaction.pending_update,
                "Edited transaction"
            );
        }
        Ok(transaction)
    }

    /// Delete a transaction on behalf of the user.
    pub async fn delete_transaction(&self, id: LocalId) -> Result<DeleteDisposition> {
        let db = self.db.lock().await;
        let repo = LibSqlTransactionRepository::new(db.connection());
        let mut transaction = repo
            .get(id)
            .await?
            .filter(|transaction| !transaction.pending_delete)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        if transaction.has_remote() {
            transaction.pending_delete = true;
            repo.replace(&transaction).await?;
            Ok(DeleteDisposition::QueuedForSync)
        } else {
            repo.delete(id).await?;
            Ok(DeleteDisposition::Purged)
        }
    }

    /// Count records waiting to be pushed.
    pub async fn pending_counts(&self) -> Result<PendingCounts> {
        let db = self.db.lock().await;
        let repo = LibSqlTransactionRepository::new(db.connection());
        repo.pending_counts().await
    }

    /// Current incremental-pull cursor, if a pull has ever stored one.
    pub async fn cursor(&self) -> Result<Option<i64>> {
        let raw = self.get_value(CURSOR_KEY).await?;
        raw.map(|value| {
            value
                .parse::<i64>()
                .map_err(|error| Error::Database(format!("invalid stored cursor '{value}': {error}")))
        })
        .transpose()
    }
}

impl RecordStore for DatabaseService {
    async fn scan_all(&self) -> Result<Vec<Transaction>> {
        let db = self.db.lock().await;
        LibSqlTransactionRepository::new(db.connection())
            .scan_all()
            .await
    }

    async fn insert(&self, transaction: &Transaction) -> Result<LocalId> {
        let db = self.db.lock().await;
        LibSqlTransactionRepository::new(db.connection())
            .insert(transaction)
            .await
    }

    async fn replace(&self, transaction: &Transaction) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlTransactionRepository::new(db.connection())
            .replace(transaction)
            .await
    }

    async fn delete(&self, id: LocalId) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlTransactionRepository::new(db.connection())
            .delete(id)
            .await
    }

    async fn get(&self, id: LocalId) -> Result<Option<Transaction>> {
        let db = self.db.lock().await;
        LibSqlTransactionRepository::new(db.connection())
            .get(id)
            .await
    }

    async fn find_by_created_at(&self, created_at: i64) -> Result<Option<Transaction>> {
        let db = self.db.lock().await;
        LibSqlTransactionRepository::new(db.connection())
            .find_by_created_at(created_at)
            .await
    }
}

impl CursorStore for DatabaseService {
    async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let db = self.db.lock().await;
        LibSqlSettingsRepository::new(db.connection())
            .get_value(key)
            .await
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlSettingsRepository::new(db.connection())
            .set_value(key, value)
            .await
    }
}
