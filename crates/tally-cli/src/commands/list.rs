use std::path::Path;

use crate::commands::common::{
    format_transaction_lines, open_database, transaction_to_list_item, TransactionListItem,
};
use crate::error::CliError;

pub async fn run_list(limit: usize, as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let transactions = db.list_transactions(limit, 0).await?;

    if as_json {
        let json_items = transactions
            .iter()
            .map(transaction_to_list_item)
            .collect::<Vec<TransactionListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if transactions.is_empty() {
        println!("No transactions recorded.");
    } else {
        for line in format_transaction_lines(&transactions) {
            println!("{line}");
        }
    }

    Ok(())
}
