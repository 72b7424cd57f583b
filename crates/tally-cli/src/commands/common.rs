use std::env;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tally_core::config::RemoteConfig;
use tally_core::services::DatabaseService;
use tally_core::session::StoredSession;
use tally_core::{LocalId, Transaction};

use crate::auth::load_stored_session;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct TransactionListItem {
    pub id: i64,
    pub remote_id: Option<i64>,
    pub title: String,
    pub amount: String,
    pub kind: String,
    pub category: String,
    pub notes: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub relative_time: String,
    pub sync_state: &'static str,
}

pub fn transaction_to_list_item(transaction: &Transaction) -> TransactionListItem {
    let now_ms = Utc::now().timestamp_millis();
    TransactionListItem {
        id: transaction.local_id.get(),
        remote_id: transaction.has_remote().then_some(transaction.remote_id),
        title: transaction.title.clone(),
        amount: transaction.amount.to_string(),
        kind: transaction.kind.to_string(),
        category: transaction.category.clone(),
        notes: transaction.notes.clone(),
        created_at: transaction.created_at,
        updated_at: transaction.updated_at,
        relative_time: format_relative_time(transaction.created_at, now_ms),
        sync_state: sync_state_label(transaction),
    }
}

pub fn format_transaction_lines(transactions: &[Transaction]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    transactions
        .iter()
        .map(|transaction| {
            let id = transaction.local_id.to_string();
            let title = truncate(&transaction.title, 32);
            let amount = transaction.amount.to_string();
            let kind = transaction.kind.as_str();
            let relative_time = format_relative_time(transaction.created_at, now_ms);
            let state = sync_state_label(transaction);

            if transaction.category.is_empty() {
                format!("{id:>5}  {title:<32}  {amount:>12} {kind:<6}  {relative_time:<10}  {state}")
            } else {
                format!(
                    "{id:>5}  {title:<32}  {amount:>12} {kind:<6}  {relative_time:<10}  {state:<8}  [{}]",
                    transaction.category
                )
            }
        })
        .collect()
}

pub const fn sync_state_label(transaction: &Transaction) -> &'static str {
    if transaction.pending_delete {
        "deleting"
    } else if transaction.is_pending_create() {
        "new"
    } else if transaction.pending_update {
        "modified"
    } else {
        "synced"
    }
}

pub fn truncate(value: &str, max_chars: usize) -> String {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn parse_transaction_id(id: &str) -> Result<LocalId, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(CliError::EmptyTransactionId);
    }
    trimmed
        .parse::<LocalId>()
        .ok()
        .filter(|id| id.get() > 0)
        .ok_or_else(|| CliError::InvalidTransactionId(trimmed.to_string()))
}

/// Map a core not-found into the CLI's message for the given id.
pub fn not_found_as_cli(error: tally_core::Error, id: LocalId) -> CliError {
    match error {
        tally_core::Error::NotFound(_) => CliError::TransactionNotFound(id.to_string()),
        other => CliError::Core(other),
    }
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) = cli_db_path.or_else(|| env::var_os("TALLY_DB_PATH").map(PathBuf::from)) {
        return Ok(path);
    }
    default_db_path()
}

pub fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("tally").join("tally.db"))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI data directory".to_string()))
}

pub async fn open_database(path: &Path) -> Result<DatabaseService, CliError> {
    Ok(DatabaseService::open_path(path.to_path_buf()).await?)
}

/// Profile name plus its remote config and stored session.
pub struct RemoteContext {
    pub profile_name: String,
    pub config: RemoteConfig,
    pub session: Option<StoredSession>,
}

pub fn resolve_remote_context(
    global_profile: Option<&str>,
    api_base_url: Option<String>,
) -> Result<RemoteContext, CliError> {
    let profiles = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = profiles.resolve_profile_name(global_profile);
    let profile = profiles.profile(&profile_name);

    let config = RemoteConfig::from_env(
        api_base_url,
        profile.and_then(|profile| profile.api_base_url()),
        profile.and_then(|profile| profile.request_timeout_secs),
    )
    .map_err(CliError::Config)?;
    let session = load_stored_session(&profile_name)?;

    Ok(RemoteContext {
        profile_name,
        config,
        session,
    })
}
