//! Results returned by a sync run.

use serde::Serialize;

/// How a sync attempt ended when it did not hard-fail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// No session; nothing was read or sent
    Skipped,
    /// Another run held the single-flight guard
    AlreadyRunning,
    Completed(SyncReport),
}

impl SyncOutcome {
    #[must_use]
    pub const fn report(&self) -> Option<&SyncReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Skipped | Self::AlreadyRunning => None,
        }
    }
}

/// Per-phase counters for one completed run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Remote deletes confirmed and purged locally
    pub deleted: usize,
    /// Never-synced records purged without a remote call
    pub purged: usize,
    pub delete_failures: usize,

    pub updated: usize,
    pub update_conflicts: usize,
    pub update_failures: usize,

    pub created: usize,

    /// Records returned by the incremental fetch
    pub pulled: usize,
    pub inserted: usize,
    pub overwritten: usize,
    pub marked_local_ahead: usize,
    /// Matches whose only change was gaining a remote id
    pub stamped: usize,
    pub pull_error: Option<String>,

    /// Cursor read at the start of the pull; `None` when it could not be read
    pub cursor_before: Option<i64>,
    pub cursor_after: Option<i64>,
}

impl SyncReport {
    /// True when a per-record push failed or the pull was abandoned.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.delete_failures > 0 || self.update_failures > 0 || self.pull_error.is_some()
    }

    /// Number of local store writes made by the run.
    #[must_use]
    pub const fn local_writes(&self) -> usize {
        self.deleted
            + self.purged
            + self.updated
            + self.update_conflicts
            + self.created
            + self.inserted
            + self.overwritten
            + self.marked_local_ahead
            + self.stamped
    }

    #[must_use]
    pub const fn cursor_advanced(&self) -> bool {
        matches!(
            (self.cursor_before, self.cursor_after),
            (Some(before), Some(after)) if after > before
        )
    }
}
