//! Error taxonomy for sync runs and remote calls.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// No session is available for the remote channel
    #[error("No active session")]
    AuthMissing,
    /// Network-level failure (connect, timeout, body decoding)
    #[error("Sync transport error: {0}")]
    Transport(String),
    /// Non-2xx response that is not a conflict
    #[error("Sync server error ({status}): {message}")]
    Server { status: u16, message: String },
    /// Version/precondition failure (409-class)
    #[error("Sync conflict: {0}")]
    Conflict(String),
    #[error("Batch create returned {actual} records for {expected} requested")]
    BatchShapeMismatch { expected: usize, actual: usize },
    #[error("Invalid sync payload: {0}")]
    InvalidPayload(String),
    #[error(transparent)]
    Store(#[from] crate::Error),
}

pub type SyncResult<T> = Result<T, SyncError>;

impl SyncError {
    /// Whether a failed run may succeed if attempted again later.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::BatchShapeMismatch { .. } => true,
            Self::Server { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            Self::AuthMissing | Self::Conflict(_) | Self::InvalidPayload(_) | Self::Store(_) => {
                false
            }
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(SyncError::Transport("timed out".to_string()).is_retryable());
        assert!(SyncError::BatchShapeMismatch {
            expected: 3,
            actual: 2
        }
        .is_retryable());
        assert!(SyncError::Server {
            status: 503,
            message: "unavailable".to_string()
        }
        .is_retryable());
        assert!(SyncError::Server {
            status: 429,
            message: "slow down".to_string()
        }
        .is_retryable());

        assert!(!SyncError::Server {
            status: 400,
            message: "bad request".to_string()
        }
        .is_retryable());
        assert!(!SyncError::AuthMissing.is_retryable());
        assert!(!SyncError::Store(crate::Error::NotFound("1".to_string())).is_retryable());
    }

    #[test]
    fn shape_mismatch_message_names_both_lengths() {
        let message = SyncError::BatchShapeMismatch {
            expected: 3,
            actual: 2,
        }
        .to_string();
        assert_eq!(message, "Batch create returned 2 records for 3 requested");
    }
}
