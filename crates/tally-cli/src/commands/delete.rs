use std::path::Path;

use tally_core::services::DeleteDisposition;

use crate::commands::common::{not_found_as_cli, open_database, parse_transaction_id};
use crate::error::CliError;

pub async fn run_delete(id: &str, db_path: &Path) -> Result<(), CliError> {
    let local_id = parse_transaction_id(id)?;
    let db = open_database(db_path).await?;

    let disposition = db
        .delete_transaction(local_id)
        .await
        .map_err(|error| not_found_as_cli(error, local_id))?;

    match disposition {
        DeleteDisposition::Purged => println!("{local_id}"),
        DeleteDisposition::QueuedForSync => println!("{local_id} (remote delete queued)"),
    }
    Ok(())
}
