//! In-memory collaborators for engine tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;

use crate::db::{CursorStore, RecordStore};
use crate::models::{LocalId, RemoteTransaction, Transaction, TransactionKind};
use crate::session::StoredSession;
use crate::{Error, Result};

use super::{RemoteSyncClient, SyncError, SyncResult, CURSOR_KEY};

pub fn session() -> Option<StoredSession> {
    Some(StoredSession::new("test-token", "me@example.com").unwrap())
}

/// A clean, never-synced record
pub fn local(title: &str, created_at: i64, updated_at: i64) -> Transaction {
    Transaction {
        local_id: LocalId::UNASSIGNED,
        remote_id: 0,
        title: title.to_string(),
        amount: Decimal::new(-1000, 2),
        kind: TransactionKind::Debit,
        category: "General".to_string(),
        notes: String::new(),
        created_at,
        updated_at,
        pending_update: false,
        pending_delete: false,
    }
}

/// A record already known to the remote side
pub fn synced(title: &str, remote_id: i64, created_at: i64, updated_at: i64) -> Transaction {
    Transaction {
        remote_id,
        ..local(title, created_at, updated_at)
    }
}

pub fn remote(title: &str, remote_id: i64, created_at: i64, updated_at: i64) -> RemoteTransaction {
    RemoteTransaction {
        remote_id,
        title: title.to_string(),
        amount: Decimal::new(-1000, 2),
        kind: TransactionKind::Debit,
        category: "General".to_string(),
        notes: String::new(),
        created_at,
        updated_at,
    }
}

#[derive(Default)]
struct StoreState {
    records: BTreeMap<LocalId, Transaction>,
    last_id: i64,
    settings: HashMap<String, String>,
    reads: usize,
    writes: usize,
    fail_cursor_reads: bool,
}

/// Record and cursor store counting every call made through the traits
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    /// Insert directly, bypassing the call counters.
    pub fn seed(&self, mut transaction: Transaction) -> LocalId {
        let mut state = self.state.lock().unwrap();
        state.last_id += 1;
        transaction.local_id = LocalId::new(state.last_id);
        let id = transaction.local_id;
        state.records.insert(id, transaction);
        id
    }

    pub fn record(&self, id: LocalId) -> Option<Transaction> {
        self.state.lock().unwrap().records.get(&id).cloned()
    }

    pub fn records(&self) -> Vec<Transaction> {
        self.state.lock().unwrap().records.values().cloned().collect()
    }

    /// Simulate a user edit landing outside the engine.
    pub fn edit(&self, id: LocalId, apply: impl FnOnce(&mut Transaction)) {
        let mut state = self.state.lock().unwrap();
        let record = state.records.get_mut(&id).unwrap();
        apply(record);
    }

    pub fn set_cursor(&self, cursor: i64) {
        self.state
            .lock()
            .unwrap()
            .settings
            .insert(CURSOR_KEY.to_string(), cursor.to_string());
    }

    pub fn cursor(&self) -> Option<i64> {
        self.state
            .lock()
            .unwrap()
            .settings
            .get(CURSOR_KEY)
            .map(|value| value.parse().unwrap())
    }

    pub fn fail_cursor_reads(&self) {
        self.state.lock().unwrap().fail_cursor_reads = true;
    }

    pub fn calls(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.reads + state.writes
    }

    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }
}

impl RecordStore for MemoryStore {
    async fn scan_all(&self) -> Result<Vec<Transaction>> {
        let mut state = self.state.lock().unwrap();
        state.reads += 1;
        Ok(state.records.values().cloned().collect())
    }

    async fn insert(&self, transaction: &Transaction) -> Result<LocalId> {
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        state.last_id += 1;
        let id = LocalId::new(state.last_id);
        let mut stored = transaction.clone();
        stored.local_id = id;
        state.records.insert(id, stored);
        Ok(id)
    }

    async fn replace(&self, transaction: &Transaction) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        match state.records.get_mut(&transaction.local_id) {
            Some(stored) => {
                *stored = transaction.clone();
                Ok(())
            }
            None => Err(Error::NotFound(transaction.local_id.to_string())),
        }
    }

    async fn delete(&self, id: LocalId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        state.records.remove(&id);
        Ok(())
    }
}

impl CursorStore for MemoryStore {
    async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let mut state = self.state.lock().unwrap();
        state.reads += 1;
        if state.fail_cursor_reads {
            return Err(Error::Database("settings table unavailable".to_string()));
        }
        Ok(state.settings.get(key).cloned())
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        state.settings.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Number of calls per remote operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoteCalls {
    pub batch_create: usize,
    pub update: usize,
    pub delete: usize,
    pub fetch_since: usize,
}

impl RemoteCalls {
    pub const fn total(&self) -> usize {
        self.batch_create + self.update + self.delete + self.fetch_since
    }

    pub const fn mutating(&self) -> usize {
        self.batch_create + self.update + self.delete
    }
}

type Hook = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct RemoteState {
    records: BTreeMap<i64, RemoteTransaction>,
    last_id: i64,
    calls: RemoteCalls,
    failing_deletes: HashSet<i64>,
    failing_updates: HashSet<i64>,
    conflicting_updates: HashSet<i64>,
    failing_batches: usize,
    short_batch: bool,
    failing_fetch: bool,
    ignore_cursor: bool,
    in_flight: Option<Hook>,
}

/// Remote service fake with fault injection
#[derive(Clone, Default)]
pub struct MemoryRemote {
    state: Arc<Mutex<RemoteState>>,
}

impl MemoryRemote {
    pub fn put(&self, record: RemoteTransaction) {
        let mut state = self.state.lock().unwrap();
        state.last_id = state.last_id.max(record.remote_id);
        state.records.insert(record.remote_id, record);
    }

    pub fn record(&self, remote_id: i64) -> Option<RemoteTransaction> {
        self.state.lock().unwrap().records.get(&remote_id).cloned()
    }

    pub fn records(&self) -> Vec<RemoteTransaction> {
        self.state.lock().unwrap().records.values().cloned().collect()
    }

    pub fn calls(&self) -> RemoteCalls {
        self.state.lock().unwrap().calls
    }

    pub fn fail_delete(&self, remote_id: i64) {
        self.state.lock().unwrap().failing_deletes.insert(remote_id);
    }

    pub fn fail_update(&self, remote_id: i64) {
        self.state.lock().unwrap().failing_updates.insert(remote_id);
    }

    pub fn conflict_on_update(&self, remote_id: i64) {
        self.state.lock().unwrap().conflicting_updates.insert(remote_id);
    }

    /// Fail the next `times` batch-create calls with a transport error.
    pub fn fail_batches(&self, times: usize) {
        self.state.lock().unwrap().failing_batches = times;
    }

    /// Answer batch creates with one record fewer than requested.
    pub fn short_batch(&self) {
        self.state.lock().unwrap().short_batch = true;
    }

    pub fn fail_fetch(&self) {
        self.state.lock().unwrap().failing_fetch = true;
    }

    /// Return every record from `fetch_since`, ignoring the cursor.
    pub fn ignore_cursor(&self) {
        self.state.lock().unwrap().ignore_cursor = true;
    }

    /// Run `hook` while the next update or batch create is in flight.
    pub fn while_in_flight(&self, hook: impl FnOnce() + Send + 'static) {
        self.state.lock().unwrap().in_flight = Some(Box::new(hook));
    }

    fn take_hook(&self) -> Option<Hook> {
        self.state.lock().unwrap().in_flight.take()
    }
}

impl RemoteSyncClient for MemoryRemote {
    async fn batch_create(&self, records: &[Transaction]) -> SyncResult<Vec<RemoteTransaction>> {
        if let Some(hook) = self.take_hook() {
            hook();
        }

        let mut state = self.state.lock().unwrap();
        state.calls.batch_create += 1;
        if state.failing_batches > 0 {
            state.failing_batches -= 1;
            return Err(SyncError::Transport("connection reset".to_string()));
        }
        if state.short_batch {
            let mut created = Vec::new();
            for (offset, record) in records.iter().skip(1).enumerate() {
                let remote_id = state.last_id + 1 + i64::try_from(offset).unwrap();
                created.push(RemoteTransaction {
                    remote_id,
                    title: record.title.clone(),
                    amount: record.amount,
                    kind: record.kind,
                    category: record.category.clone(),
                    notes: record.notes.clone(),
                    created_at: record.created_at,
                    updated_at: record.updated_at,
                });
            }
            return Ok(created);
        }

        let mut created = Vec::with_capacity(records.len());
        for record in records {
            state.last_id += 1;
            let remote = RemoteTransaction {
                remote_id: state.last_id,
                title: record.title.clone(),
                amount: record.amount,
                kind: record.kind,
                category: record.category.clone(),
                notes: record.notes.clone(),
                created_at: record.created_at,
                updated_at: record.updated_at,
            };
            state.records.insert(remote.remote_id, remote.clone());
            created.push(remote);
        }
        Ok(created)
    }

    async fn update(&self, remote_id: i64, record: &Transaction) -> SyncResult<()> {
        if let Some(hook) = self.take_hook() {
            hook();
        }

        let mut state = self.state.lock().unwrap();
        state.calls.update += 1;
        if state.conflicting_updates.contains(&remote_id) {
            return Err(SyncError::Conflict("stale version".to_string()));
        }
        if state.failing_updates.contains(&remote_id) {
            return Err(SyncError::Server {
                status: 500,
                message: "internal error".to_string(),
            });
        }
        let stored = state
            .records
            .get_mut(&remote_id)
            .ok_or_else(|| SyncError::Server {
                status: 404,
                message: "not found".to_string(),
            })?;
        stored.title.clone_from(&record.title);
        stored.amount = record.amount;
        stored.kind = record.kind;
        stored.category.clone_from(&record.category);
        stored.notes.clone_from(&record.notes);
        stored.updated_at = record.updated_at;
        Ok(())
    }

    async fn delete(&self, remote_id: i64) -> SyncResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.delete += 1;
        if state.failing_deletes.contains(&remote_id) {
            return Err(SyncError::Transport("timed out".to_string()));
        }
        state.records.remove(&remote_id);
        Ok(())
    }

    async fn fetch_since(&self, cursor: i64) -> SyncResult<Vec<RemoteTransaction>> {
        let mut state = self.state.lock().unwrap();
        state.calls.fetch_since += 1;
        if state.failing_fetch {
            return Err(SyncError::Transport("offline".to_string()));
        }
        let ignore_cursor = state.ignore_cursor;
        let mut records: Vec<RemoteTransaction> = state
            .records
            .values()
            .filter(|record| ignore_cursor || record.updated_at > cursor)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.updated_at);
        Ok(records)
    }
}
