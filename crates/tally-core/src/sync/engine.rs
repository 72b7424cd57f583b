//! Sync run orchestration.

use tokio::sync::Mutex;

use crate::db::{CursorStore, RecordStore};
use crate::models::{LocalId, RemoteTransaction, Transaction};
use crate::session::SessionProvider;

use super::resolver::{resolve, Resolution};
use super::{
    RemoteSyncClient, RetryPolicy, SyncError, SyncOutcome, SyncReport, SyncResult, CURSOR_KEY,
};

/// Reconciles a `RecordStore` with a `RemoteSyncClient`.
///
/// Every phase re-reads the store, and every per-record decision re-fetches
/// the record right before acting, so user edits that land mid-run are seen
/// by the step that touches them. At most one run executes at a time per
/// engine; overlapping calls return `SyncOutcome::AlreadyRunning`.
pub struct SyncEngine<S, C, P> {
    store: S,
    client: C,
    session: P,
    run_lock: Mutex<()>,
}

impl<S, C, P> SyncEngine<S, C, P>
where
    S: RecordStore + CursorStore,
    C: RemoteSyncClient,
    P: SessionProvider,
{
    pub fn new(store: S, client: C, session: P) -> Self {
        Self {
            store,
            client,
            session,
            run_lock: Mutex::new(()),
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn client(&self) -> &C {
        &self.client
    }

    /// Execute one full run: push deletes, updates, creates, then pull.
    ///
    /// Returns `Err` only for failures that abort the run (push-creates or a
    /// store error during the push phases). Per-record push failures and pull
    /// failures are recorded in the report instead.
    pub async fn run_sync(&self) -> SyncResult<SyncOutcome> {
        let Ok(_guard) = self.run_lock.try_lock() else {
            tracing::info!("Sync already in progress; skipping overlapping run");
            return Ok(SyncOutcome::AlreadyRunning);
        };

        if !self.session.is_authenticated() {
            tracing::info!("No active session; sync skipped");
            return Ok(SyncOutcome::Skipped);
        }

        let mut report = SyncReport::default();
        self.push_deletes(&mut report).await?;
        self.push_updates(&mut report).await?;
        self.push_creates(&mut report).await?;
        self.pull_incremental(&mut report).await;

        tracing::info!(
            deleted = report.deleted,
            updated = report.updated,
            created = report.created,
            pulled = report.pulled,
            partial = report.is_partial(),
            cursor = ?report.cursor_after,
            "Sync run finished"
        );
        Ok(SyncOutcome::Completed(report))
    }

    /// Run, retrying retryable hard failures with exponential backoff.
    pub async fn run_with_retry(&self, policy: &RetryPolicy) -> SyncResult<SyncOutcome> {
        let mut attempt = 1;
        loop {
            match self.run_sync().await {
                Err(error) if error.is_retryable() && attempt < policy.max_attempts => {
                    let delay = policy.delay_for_attempt(attempt);
                    tracing::warn!(attempt, ?delay, %error, "Sync run failed; retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn pending_ids(&self, wanted: impl Fn(&Transaction) -> bool) -> SyncResult<Vec<LocalId>> {
        Ok(self
            .store
            .scan_all()
            .await?
            .into_iter()
            .filter(|transaction| wanted(transaction))
            .map(|transaction| transaction.local_id)
            .collect())
    }

    async fn push_deletes(&self, report: &mut SyncReport) -> SyncResult<()> {
        let ids = self
            .pending_ids(|transaction| transaction.pending_delete)
            .await?;
        if !ids.is_empty() {
            tracing::debug!(count = ids.len(), "Pushing deletes");
        }

        for id in ids {
            let Some(current) = self.store.get(id).await? else {
                continue;
            };
            if !current.pending_delete {
                continue;
            }

            if !current.has_remote() {
                self.store.delete(id).await?;
                report.purged += 1;
                continue;
            }

            match self.client.delete(current.remote_id).await {
                Ok(()) => {
                    self.store.delete(id).await?;
                    report.deleted += 1;
                }
                Err(error) => {
                    tracing::warn!(
                        local_id = %id,
                        remote_id = current.remote_id,
                        %error,
                        "Remote delete failed; will retry next sync"
                    );
                    report.delete_failures += 1;
                }
            }
        }
        Ok(())
    }

    async fn push_updates(&self, report: &mut SyncReport) -> SyncResult<()> {
        let ids = self.pending_ids(wants_update_push).await?;
        if !ids.is_empty() {
            tracing::debug!(count = ids.len(), "Pushing updates");
        }

        for id in ids {
            let Some(sent) = self.store.get(id).await? else {
                continue;
            };
            if !wants_update_push(&sent) {
                continue;
            }

            match self.client.update(sent.remote_id, &sent).await {
                Ok(()) => {
                    if self.clear_pending_update(&sent).await? {
                        report.updated += 1;
                    }
                }
                Err(SyncError::Conflict(message)) => {
                    tracing::info!(
                        local_id = %id,
                        remote_id = sent.remote_id,
                        %message,
                        "Update conflicted; deferring to remote value"
                    );
                    if self.clear_pending_update(&sent).await? {
                        report.update_conflicts += 1;
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        local_id = %id,
                        remote_id = sent.remote_id,
                        %error,
                        "Remote update failed; will retry next sync"
                    );
                    report.update_failures += 1;
                }
            }
        }
        Ok(())
    }

    /// Clear `pending_update` unless the record changed while the call was in
    /// flight. Returns whether a write happened.
    async fn clear_pending_update(&self, sent: &Transaction) -> SyncResult<bool> {
        let Some(mut latest) = self.store.get(sent.local_id).await? else {
            return Ok(false);
        };
        if latest.updated_at != sent.updated_at {
            tracing::debug!(
                local_id = %sent.local_id,
                "Record edited during push; keeping it dirty"
            );
            return Ok(false);
        }
        if !latest.pending_update {
            return Ok(false);
        }

        latest.pending_update = false;
        self.store.replace(&latest).await?;
        Ok(true)
    }

    async fn push_creates(&self, report: &mut SyncReport) -> SyncResult<()> {
        let pending: Vec<Transaction> = self
            .store
            .scan_all()
            .await?
            .into_iter()
            .filter(Transaction::is_pending_create)
            .collect();
        if pending.is_empty() {
            return Ok(());
        }

        tracing::debug!(count = pending.len(), "Pushing creates");
        let created = self.client.batch_create(&pending).await?;
        if created.len() != pending.len() {
            return Err(SyncError::BatchShapeMismatch {
                expected: pending.len(),
                actual: created.len(),
            });
        }

        for (sent, remote) in pending.iter().zip(created) {
            let Some(mut latest) = self.store.get(sent.local_id).await? else {
                tracing::warn!(
                    local_id = %sent.local_id,
                    remote_id = remote.remote_id,
                    "Record removed during create; remote copy left orphaned"
                );
                continue;
            };

            latest.remote_id = remote.remote_id;
            latest.created_at = remote.created_at;
            if latest.updated_at == sent.updated_at {
                latest.updated_at = remote.updated_at;
            } else {
                tracing::debug!(
                    local_id = %sent.local_id,
                    "Record edited during create; queued for update"
                );
                latest.updated_at = latest.updated_at.max(remote.updated_at);
                latest.pending_update = true;
            }
            self.store.replace(&latest).await?;
            report.created += 1;
        }
        Ok(())
    }

    async fn pull_incremental(&self, report: &mut SyncReport) {
        if let Err(error) = self.pull(report).await {
            tracing::warn!(%error, "Incremental pull failed; local data left as is");
            report.pull_error = Some(error.to_string());
        }
    }

    async fn pull(&self, report: &mut SyncReport) -> SyncResult<()> {
        let cursor = self.read_cursor().await?;
        report.cursor_before = Some(cursor);
        report.cursor_after = Some(cursor);

        let batch = self.client.fetch_since(cursor).await?;
        report.pulled = batch.len();
        if batch.is_empty() {
            return Ok(());
        }

        tracing::debug!(count = batch.len(), cursor, "Merging remote changes");
        let mut newest = cursor;
        for remote in batch {
            newest = newest.max(remote.updated_at);
            self.merge_remote(remote, report).await?;
        }

        if newest > cursor {
            self.store
                .set_value(CURSOR_KEY, &newest.to_string())
                .await?;
            report.cursor_after = Some(newest);
            tracing::debug!(from = cursor, to = newest, "Advanced pull cursor");
        }
        Ok(())
    }

    async fn read_cursor(&self) -> SyncResult<i64> {
        let Some(raw) = self.store.get_value(CURSOR_KEY).await? else {
            return Ok(i64::MIN);
        };
        Ok(raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(value = %raw, "Stored cursor is not an integer; pulling from the start");
            i64::MIN
        }))
    }

    async fn merge_remote(&self, remote: RemoteTransaction, report: &mut SyncReport) -> SyncResult<()> {
        let Some(mut local) = self.store.find_by_created_at(remote.created_at).await? else {
            self.store.insert(&remote.into_local()).await?;
            report.inserted += 1;
            return Ok(());
        };

        let needs_stamp = !local.has_remote();
        if needs_stamp {
            local.remote_id = remote.remote_id;
        }

        match resolve(local.updated_at, remote.updated_at) {
            Resolution::RemoteWins => {
                remote.overwrite_content(&mut local);
                local.pending_update = false;
                self.store.replace(&local).await?;
                report.overwritten += 1;
            }
            Resolution::LocalAhead => {
                if local.pending_update && !needs_stamp {
                    return Ok(());
                }
                local.pending_update = true;
                self.store.replace(&local).await?;
                report.marked_local_ahead += 1;
            }
            Resolution::Equal => {
                if needs_stamp {
                    self.store.replace(&local).await?;
                    report.stamped += 1;
                }
            }
        }
        Ok(())
    }
}

fn wants_update_push(transaction: &Transaction) -> bool {
    transaction.pending_update && transaction.has_remote() && !transaction.pending_delete
}
