//! Data models for Tally

mod remote;
mod transaction;

pub use remote::RemoteTransaction;
pub use transaction::{
    LocalId, Transaction, TransactionChanges, TransactionDraft, TransactionKind,
};
