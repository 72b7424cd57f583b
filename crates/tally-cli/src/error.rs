use std::io;

use tally_core::session::SessionError;
use tally_core::sync::SyncError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] tally_core::Error),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Transaction ID cannot be empty")]
    EmptyTransactionId,
    #[error("Invalid transaction ID: {0}")]
    InvalidTransactionId(String),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl From<SessionError> for CliError {
    fn from(error: SessionError) -> Self {
        Self::Auth(error.to_string())
    }
}
