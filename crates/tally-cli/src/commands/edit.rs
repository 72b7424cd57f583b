use std::path::Path;

use tally_core::models::TransactionChanges;

use crate::commands::common::{not_found_as_cli, open_database, parse_transaction_id};
use crate::error::CliError;

pub async fn run_edit(id: &str, changes: TransactionChanges, db_path: &Path) -> Result<(), CliError> {
    let local_id = parse_transaction_id(id)?;
    let db = open_database(db_path).await?;

    let transaction = db
        .edit_transaction(local_id, changes)
        .await
        .map_err(|error| not_found_as_cli(error, local_id))?;

    println!("{}", transaction.local_id);
    Ok(())
}
