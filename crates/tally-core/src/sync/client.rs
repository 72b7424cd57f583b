//! Contract for the remote service of record.

use crate::models::{RemoteTransaction, Transaction};

use super::SyncResult;

/// The four remote operations the engine needs.
#[allow(async_fn_in_trait)]
pub trait RemoteSyncClient {
    /// Create every record in one call.
    ///
    /// The response is correlated with the request by position only.
    async fn batch_create(&self, records: &[Transaction]) -> SyncResult<Vec<RemoteTransaction>>;

    /// Send the current content of a record; a version failure is
    /// `SyncError::Conflict`.
    async fn update(&self, remote_id: i64, record: &Transaction) -> SyncResult<()>;

    async fn delete(&self, remote_id: i64) -> SyncResult<()>;

    /// Remote records with `updated_at` strictly greater than `cursor`
    async fn fetch_since(&self, cursor: i64) -> SyncResult<Vec<RemoteTransaction>>;
}
