//! Small helpers for text cleanup and epoch-millisecond timestamps.

use chrono::{DateTime, Utc};

/// Longest server message kept in an error
const MAX_EXCERPT_CHARS: usize = 180;

/// Trim optional text, mapping blank values to `None`.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}

/// Trimmed, length-capped excerpt of a response body.
pub fn error_excerpt(body: &str) -> String {
    body.trim().chars().take(MAX_EXCERPT_CHARS).collect()
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Modification stamp for a write at `now` that must sort after `previous`.
pub const fn next_modified_at(previous: i64, now: i64) -> i64 {
    let bumped = previous.saturating_add(1);
    if now > bumped {
        now
    } else {
        bumped
    }
}

/// `YYYY-MM-DD` in UTC, empty when the instant is out of range.
pub fn utc_date(epoch_millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_millis)
        .map(|instant| instant.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
