//! Tally CLI - record transactions offline and sync them when online.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;
#[cfg(test)]
mod tests;

use clap::Parser;
use tally_core::models::TransactionChanges;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::auth_cmd::run_auth;
use crate::commands::common::resolve_db_path;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::list::run_list;
use crate::commands::status::run_status;
use crate::commands::sync::run_sync;
use crate::error::CliError;

const DEFAULT_LOG_FILTER: &str = "tally_core=info,tally_cli=info";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Add {
            title,
            amount,
            kind,
            category,
            notes,
        } => {
            let db_path = resolve_db_path(cli.db_path)?;
            run_add(&title, amount, kind, category, notes, &db_path).await?;
        }
        Commands::List { limit, json } => {
            run_list(limit, json, &resolve_db_path(cli.db_path)?).await?;
        }
        Commands::Edit {
            id,
            title,
            amount,
            kind,
            category,
            notes,
        } => {
            let changes = TransactionChanges {
                title,
                amount,
                kind,
                category,
                notes,
            };
            run_edit(&id, changes, &resolve_db_path(cli.db_path)?).await?;
        }
        Commands::Delete { id } => run_delete(&id, &resolve_db_path(cli.db_path)?).await?,
        Commands::Status { json } => run_status(json, &resolve_db_path(cli.db_path)?).await?,
        Commands::Sync {
            retries,
            api_base_url,
            json,
        } => {
            let db_path = resolve_db_path(cli.db_path)?;
            run_sync(retries, api_base_url, json, profile, &db_path).await?;
        }
        Commands::Config { command } => run_config(command, profile)?,
        Commands::Auth { command } => run_auth(command, profile)?,
    }

    Ok(())
}
