use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tally_core::TransactionKind;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Track personal finances offline and sync when you can")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// CLI profile name for remote/auth configuration
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a new transaction
    #[command(alias = "new")]
    Add {
        /// Short description
        title: String,
        /// Signed amount, e.g. 12.50
        #[arg(long, allow_negative_numbers = true)]
        amount: Decimal,
        /// debit (expense) or credit (income)
        #[arg(long, default_value = "debit", value_parser = parse_kind)]
        kind: TransactionKind,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List recent transactions
    List {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit an existing transaction
    Edit {
        /// Local transaction id
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        amount: Option<Decimal>,
        #[arg(long, value_parser = parse_kind)]
        kind: Option<TransactionKind>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a transaction
    Delete {
        /// Local transaction id
        id: String,
    },
    /// Show changes waiting to be synced
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reconcile local changes with the remote service
    Sync {
        /// Extra attempts after a retryable failure
        #[arg(long, default_value = "0")]
        retries: u32,
        /// Override the API base URL for this run
        #[arg(long, value_name = "URL")]
        api_base_url: Option<String>,
        /// Output the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Manage the stored session for a profile
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Profile name to initialize
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// API base URL of the service of record
        #[arg(long, value_name = "URL")]
        api_base_url: Option<String>,
        /// Request timeout in seconds
        #[arg(long, value_name = "SECS")]
        timeout_secs: Option<u64>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Store an account email and API token in the keychain
    Login {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Account email, sent as the ownership key
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// API token issued by the service
        #[arg(long, value_name = "TOKEN")]
        token: String,
    },
    /// Show auth status for profile
    Status {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },
    /// Clear the stored session
    Logout {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },
}

fn parse_kind(value: &str) -> Result<TransactionKind, String> {
    value.parse().map_err(|error: tally_core::Error| error.to_string())
}
