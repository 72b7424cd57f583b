//! Database layer for Tally

mod connection;
mod migrations;
mod repository;
mod settings_repository;

pub use connection::Database;
pub use repository::{LibSqlTransactionRepository, PendingCounts, RecordStore};
pub use settings_repository::{CursorStore, LibSqlSettingsRepository};
