//! Transaction model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::util::next_modified_at;

/// Stable local identity of a transaction, assigned once on insertion.
///
/// Backed by an `AUTOINCREMENT` row id, so a value is never handed out twice
/// even after the row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalId(i64);

impl LocalId {
    /// Placeholder carried by records that have not been inserted yet
    pub const UNASSIGNED: Self = Self(0);

    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LocalId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Direction of money movement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Money leaving the account
    #[default]
    #[serde(alias = "Expense", alias = "DEBIT", alias = "debit")]
    Debit,
    /// Money entering the account
    #[serde(alias = "Income", alias = "CREDIT", alias = "credit")]
    Credit,
}

impl TransactionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "Debit",
            Self::Credit => "Credit",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debit" | "expense" => Ok(Self::Debit),
            "credit" | "income" => Ok(Self::Credit),
            other => Err(Error::InvalidInput(format!(
                "unknown transaction kind '{other}'"
            ))),
        }
    }
}

/// User-supplied content for a new transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub title: String,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub category: String,
    pub notes: String,
}

impl TransactionDraft {
    pub fn new(title: impl Into<String>, amount: Decimal, kind: TransactionKind) -> Self {
        Self {
            title: title.into(),
            amount,
            kind,
            category: String::new(),
            notes: String::new(),
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Reject drafts without a title
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidInput(
                "transaction title cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial content update applied by a user edit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionChanges {
    pub title: Option<String>,
    pub amount: Option<Decimal>,
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

impl TransactionChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.amount.is_none()
            && self.kind.is_none()
            && self.category.is_none()
            && self.notes.is_none()
    }
}

/// A financial transaction as held by the local store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Local identity
    pub local_id: LocalId,
    /// Identity on the remote store, `0` until created remotely
    pub remote_id: i64,
    pub title: String,
    /// Signed amount
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub category: String,
    pub notes: String,
    /// Creation timestamp (Unix ms), also the sync join key
    pub created_at: i64,
    /// Last modification timestamp (Unix ms)
    pub updated_at: i64,
    /// Content changed locally since the last successful push
    pub pending_update: bool,
    /// Deleted locally, remote delete still outstanding
    pub pending_delete: bool,
}

impl Transaction {
    /// `remote_id` value of a record not yet created remotely
    pub const NOT_CREATED: i64 = 0;

    /// Build an uninserted transaction stamped at `now`
    #[must_use]
    pub fn from_draft(draft: TransactionDraft, now: i64) -> Self {
        Self {
            local_id: LocalId::UNASSIGNED,
            remote_id: Self::NOT_CREATED,
            title: draft.title,
            amount: draft.amount,
            kind: draft.kind,
            category: draft.category,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
            pending_update: false,
            pending_delete: false,
        }
    }

    #[must_use]
    pub const fn has_remote(&self) -> bool {
        self.remote_id != Self::NOT_CREATED
    }

    /// Derived flag: never created remotely and not deleted
    #[must_use]
    pub const fn is_pending_create(&self) -> bool {
        !self.has_remote() && !self.pending_delete
    }

    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.is_pending_create() || self.pending_update || self.pending_delete
    }

    /// Apply a user edit. Returns `false` when nothing changed.
    ///
    /// `updated_at` strictly increases so the edit always outranks the
    /// previous version during conflict resolution.
    pub fn apply_changes(&mut self, changes: TransactionChanges, now: i64) -> bool {
        let before = self.clone();

        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(amount) = changes.amount {
            self.amount = amount;
        }
        if let Some(kind) = changes.kind {
            self.kind = kind;
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(notes) = changes.notes {
            self.notes = notes;
        }

        if *self == before {
            return false;
        }

        self.updated_at = next_modified_at(self.updated_at, now);
        if self.has_remote() {
            self.pending_update = true;
        }
        true
    }
}
