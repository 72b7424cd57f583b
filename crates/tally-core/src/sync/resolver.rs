//! Last-write-wins decision used by the pull phase.

use std::cmp::Ordering;

/// Which side of a matched pair holds the newer content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    RemoteWins,
    LocalAhead,
    Equal,
}

/// Compare modification timestamps; ties are a no-op.
#[must_use]
pub fn resolve(local_updated_at: i64, remote_updated_at: i64) -> Resolution {
    match remote_updated_at.cmp(&local_updated_at) {
        Ordering::Greater => Resolution::RemoteWins,
        Ordering::Less => Resolution::LocalAhead,
        Ordering::Equal => Resolution::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_remote_wins() {
        assert_eq!(resolve(100, 200), Resolution::RemoteWins);
    }

    #[test]
    fn newer_local_is_ahead() {
        assert_eq!(resolve(300, 200), Resolution::LocalAhead);
    }

    #[test]
    fn ties_are_equal() {
        assert_eq!(resolve(200, 200), Resolution::Equal);
        assert_eq!(resolve(i64::MIN, i64::MIN), Resolution::Equal);
    }
}
