//! Remote transaction model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction::{LocalId, Transaction, TransactionKind};

/// A transaction as returned by the remote service of record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTransaction {
    /// Identity on the remote store (never `0`)
    pub remote_id: i64,
    pub title: String,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub category: String,
    pub notes: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl RemoteTransaction {
    /// Convert into a clean local record ready for insertion
    #[must_use]
    pub fn into_local(self) -> Transaction {
        Transaction {
            local_id: LocalId::UNASSIGNED,
            remote_id: self.remote_id,
            title: self.title,
            amount: self.amount,
            kind: self.kind,
            category: self.category,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
            pending_update: false,
            pending_delete: false,
        }
    }

    /// Overwrite the content fields and `updated_at` of `local`
    pub fn overwrite_content(&self, local: &mut Transaction) {
        local.title.clone_from(&self.title);
        local.amount = self.amount;
        local.kind = self.kind;
        local.category.clone_from(&self.category);
        local.notes.clone_from(&self.notes);
        local.updated_at = self.updated_at;
    }
}
