use std::path::Path;

use serde::Serialize;

use crate::commands::common::{format_timestamp, open_database};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct StatusReport {
    pending_creates: usize,
    pending_updates: usize,
    pending_deletes: usize,
    cursor: Option<i64>,
}

pub async fn run_status(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let counts = db.pending_counts().await?;
    let cursor = db.cursor().await?;

    if as_json {
        let report = StatusReport {
            pending_creates: counts.creates,
            pending_updates: counts.updates,
            pending_deletes: counts.deletes,
            cursor,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Database: {}", db_path.display());
    println!(
        "Pending: {} new, {} modified, {} deleted",
        counts.creates, counts.updates, counts.deletes
    );
    match cursor {
        Some(cursor) => println!("Last pulled change: {}", format_timestamp(cursor)),
        None => println!("Never pulled from remote"),
    }
    Ok(())
}
