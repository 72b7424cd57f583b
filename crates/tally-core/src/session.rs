//! Session contract shared by the sync engine and the remote client.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::normalize_text_option;

/// Read access to the active identity.
///
/// The engine only asks whether a session exists; the HTTP client also needs
/// the token and the principal used as the ownership key on the remote side.
pub trait SessionProvider {
    /// Token sent as the `Authorization` header value
    fn auth_header(&self) -> Option<String>;

    /// Routing/ownership key (the account email), not a secret
    fn principal_identifier(&self) -> Option<String>;

    fn is_authenticated(&self) -> bool {
        self.auth_header().is_some()
    }
}

impl<T: SessionProvider> SessionProvider for Option<T> {
    fn auth_header(&self) -> Option<String> {
        self.as_ref().and_then(T::auth_header)
    }

    fn principal_identifier(&self) -> Option<String> {
        self.as_ref().and_then(T::principal_identifier)
    }
}

impl<T: SessionProvider> SessionProvider for Arc<T> {
    fn auth_header(&self) -> Option<String> {
        T::auth_header(self)
    }

    fn principal_identifier(&self) -> Option<String> {
        T::principal_identifier(self)
    }
}

/// Credentials persisted after login
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub email: String,
}

impl StoredSession {
    pub fn new(token: impl Into<String>, email: impl Into<String>) -> SessionResult<Self> {
        let token = normalize_text_option(Some(token.into()))
            .ok_or(SessionError::InvalidSession("token must not be empty"))?;
        let email = normalize_text_option(Some(email.into()))
            .ok_or(SessionError::InvalidSession("email must not be empty"))?;
        Ok(Self { token, email })
    }
}

impl fmt::Debug for StoredSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("StoredSession")
            .field("token", &"[REDACTED]")
            .field("email", &self.email)
            .finish()
    }
}

impl SessionProvider for StoredSession {
    fn auth_header(&self) -> Option<String> {
        normalize_text_option(Some(self.token.clone()))
    }

    fn principal_identifier(&self) -> Option<String> {
        normalize_text_option(Some(self.email.clone()))
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid session: {0}")]
    InvalidSession(&'static str),
    #[error("Failed to parse session payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Where a client keeps its session between runs
pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load_session(&self) -> SessionResult<Option<StoredSession>>;
    fn save_session(&self, session: &StoredSession) -> SessionResult<()>;
    fn clear_session(&self) -> SessionResult<()>;
}
