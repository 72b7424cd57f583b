use std::path::Path;

use rust_decimal::Decimal;
use tally_core::{TransactionDraft, TransactionKind};

use crate::commands::common::open_database;
use crate::error::CliError;

pub async fn run_add(
    title: &str,
    amount: Decimal,
    kind: TransactionKind,
    category: Option<String>,
    notes: Option<String>,
    db_path: &Path,
) -> Result<(), CliError> {
    let mut draft = TransactionDraft::new(title.trim(), amount, kind);
    if let Some(category) = category {
        draft = draft.with_category(category.trim());
    }
    if let Some(notes) = notes {
        draft = draft.with_notes(notes.trim());
    }

    let db = open_database(db_path).await?;
    let transaction = db.add_transaction(draft).await?;

    println!("{}", transaction.local_id);
    Ok(())
}
