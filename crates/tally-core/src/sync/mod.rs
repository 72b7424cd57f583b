//! Reconciliation of the local store with the remote service of record.
//!
//! A run pushes local deletes, updates and creates (in that order) and then
//! pulls remote changes newer than the stored cursor, resolving matched
//! records with last-write-wins on `updated_at`.

mod client;
mod engine;
mod error;
mod http;
mod report;
mod resolver;
mod retry;

#[cfg(test)]
pub(crate) mod testing;

pub use client::RemoteSyncClient;
pub use engine::SyncEngine;
pub use error::{SyncError, SyncResult};
pub use http::HttpSyncClient;
pub use report::{SyncOutcome, SyncReport};
pub use resolver::{resolve, Resolution};
pub use retry::RetryPolicy;

/// Settings key holding the incremental pull watermark
pub const CURSOR_KEY: &str = "sync.transactions.cursor";
