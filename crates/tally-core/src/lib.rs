//! tally-core - Core library for Tally
//!
//! This crate contains the transaction model, the libSQL-backed local store,
//! and the sync engine that reconciles local edits with the remote service
//! of record.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{LocalId, RemoteTransaction, Transaction, TransactionDraft, TransactionKind};
