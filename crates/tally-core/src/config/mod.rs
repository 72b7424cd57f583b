//! Remote service configuration.
//!
//! Resolves where the service of record lives and how long a single request
//! may take. Values come from (highest priority first) an explicit override,
//! the `TALLY_API_BASE_URL` environment variable, the active client profile,
//! and finally the built-in default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::util::normalize_text_option;

/// Environment variable overriding the API base URL
pub const API_BASE_URL_ENV: &str = "TALLY_API_BASE_URL";

pub const DEFAULT_API_BASE_URL: &str = "https://api.expensemanager.org";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Resolved remote endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub api_base_url: String,
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl RemoteConfig {
    /// Build a config for an explicit base URL.
    pub fn new(api_base_url: impl Into<String>) -> Result<Self, String> {
        Ok(Self {
            api_base_url: normalize_base_url(api_base_url.into())?,
            ..Self::default()
        })
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Resolve the config from the layered sources.
    ///
    /// Empty values at any layer are ignored; the first non-empty one must be
    /// a valid `http(s)://` URL.
    pub fn resolve(
        explicit: Option<String>,
        env_value: Option<String>,
        profile_value: Option<String>,
        profile_timeout_secs: Option<u64>,
    ) -> Result<Self, String> {
        let base = normalize_text_option(explicit)
            .or_else(|| normalize_text_option(env_value))
            .or_else(|| normalize_text_option(profile_value));

        let config = match base {
            Some(url) => Self::new(url)?,
            None => Self::default(),
        };

        Ok(match profile_timeout_secs.filter(|secs| *secs > 0) {
            Some(secs) => config.with_request_timeout(Duration::from_secs(secs)),
            None => config,
        })
    }

    /// Resolve using the process environment for the env layer.
    pub fn from_env(
        explicit: Option<String>,
        profile_value: Option<String>,
        profile_timeout_secs: Option<u64>,
    ) -> Result<Self, String> {
        Self::resolve(
            explicit,
            std::env::var(API_BASE_URL_ENV).ok(),
            profile_value,
            profile_timeout_secs,
        )
    }

    /// Join an API path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

/// Trim and validate a base URL, dropping trailing slashes.
pub fn normalize_base_url(raw: String) -> Result<String, String> {
    let value = normalize_text_option(Some(raw))
        .ok_or_else(|| "API base URL must not be empty".to_string())?;
    if has_http_scheme(&value) {
        Ok(value.trim_end_matches('/').to_string())
    } else {
        Err(format!(
            "API base URL '{value}' must include http:// or https://"
        ))
    }
}

fn has_http_scheme(value: &str) -> bool {
    ["http://", "https://"]
        .iter()
        .any(|scheme| value.len() > scheme.len() && value.starts_with(scheme))
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}
