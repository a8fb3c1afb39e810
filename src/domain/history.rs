//! History ledger for artifacts
//!
//! Each artifact keeps an append-only stack of prior snapshots, newest
//! first. Entries are only added when content actually changed, and
//! timestamps are strictly decreasing from the top of the stack down.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::artifact::ArtifactContent;

#[derive(Debug, Error, PartialEq)]
pub enum HistoryError {
    #[error("No history entry with timestamp {0}")]
    EntryNotFound(i64),
}

/// Why a history entry was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Manual commit point
    #[default]
    Commit,
    /// Content captured before a regenerated batch replaced it
    Regenerate,
    /// Content captured before a revert restored an older snapshot
    Revert,
}

impl EntryKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Commit => "commit",
            EntryKind::Regenerate => "regenerate",
            EntryKind::Revert => "revert",
        }
    }
}

/// A single immutable snapshot of artifact content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "C: ArtifactContent")]
pub struct HistoryEntry<C> {
    /// Milliseconds since epoch, strictly increasing per artifact
    pub timestamp: i64,

    pub snapshot: C,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default)]
    pub kind: EntryKind,
}

/// Returns current timestamp in milliseconds since epoch
pub fn current_timestamp() -> i64 {
    Utc::now().timestamp_millis()
}

/// Ordered snapshots of one artifact, newest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent, bound = "C: ArtifactContent")]
pub struct History<C>(Vec<HistoryEntry<C>>);

impl<C> Default for History<C> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<C: ArtifactContent> History<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the newest entry
    pub fn latest(&self) -> Option<&HistoryEntry<C>> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates newest to oldest
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry<C>> {
        self.0.iter()
    }

    /// Finds the entry recorded at `timestamp`
    pub fn get(&self, timestamp: i64) -> Option<&HistoryEntry<C>> {
        self.0.iter().find(|e| e.timestamp == timestamp)
    }

    /// Next timestamp to use, never colliding with the newest entry
    fn next_timestamp(&self, now: i64) -> i64 {
        match self.latest() {
            Some(latest) if now <= latest.timestamp => latest.timestamp + 1,
            _ => now,
        }
    }

    /// Records `current` unless it matches the newest snapshot
    ///
    /// Returns the new entry, or `None` if nothing changed.
    pub fn append_if_changed(
        &mut self,
        current: &C,
        message: Option<String>,
        kind: EntryKind,
    ) -> Option<&HistoryEntry<C>> {
        self.append_if_changed_at(current, message, kind, current_timestamp())
    }

    /// Like [`append_if_changed`](Self::append_if_changed) with an explicit clock reading
    pub fn append_if_changed_at(
        &mut self,
        current: &C,
        message: Option<String>,
        kind: EntryKind,
        now: i64,
    ) -> Option<&HistoryEntry<C>> {
        if self.latest().map(|e| &e.snapshot == current).unwrap_or(false) {
            return None;
        }

        let entry = HistoryEntry {
            timestamp: self.next_timestamp(now),
            snapshot: current.clone(),
            message,
            kind,
        };
        self.0.insert(0, entry);
        self.0.first()
    }

    /// Restores the snapshot recorded at `timestamp`
    ///
    /// Returns the restored content and the next history: the restored entry
    /// is removed, and the pre-revert content is pushed on top as a revert
    /// checkpoint (skipped when the new top already holds that content).
    /// `self` is left untouched on error.
    pub fn revert(&self, current: &C, timestamp: i64) -> Result<(C, History<C>), HistoryError> {
        self.revert_at(current, timestamp, current_timestamp())
    }

    pub fn revert_at(
        &self,
        current: &C,
        timestamp: i64,
        now: i64,
    ) -> Result<(C, History<C>), HistoryError> {
        let position = self
            .0
            .iter()
            .position(|e| e.timestamp == timestamp)
            .ok_or(HistoryError::EntryNotFound(timestamp))?;

        let mut entries = self.0.clone();
        let restored = entries.remove(position);

        // Closing the gap may leave two equal snapshots side by side; keep
        // the newer one.
        if position > 0
            && position < entries.len()
            && entries[position - 1].snapshot == entries[position].snapshot
        {
            entries.remove(position);
        }

        // Timestamps must stay above everything ever issued, including the
        // entry just removed from the top.
        let floor = self.latest().map(|e| e.timestamp).unwrap_or(i64::MIN);
        let mut next = History(entries);
        let now = now.max(floor.saturating_add(1));
        next.append_if_changed_at(
            current,
            Some(format!("Before revert to {}", timestamp)),
            EntryKind::Revert,
            now,
        );

        Ok((restored.snapshot, next))
    }

    /// Checks ordering and adjacency: strictly decreasing timestamps and no
    /// two neighbouring entries with equal snapshots
    pub fn is_well_formed(&self) -> bool {
        self.0.windows(2).all(|pair| {
            pair[0].timestamp > pair[1].timestamp && pair[0].snapshot != pair[1].snapshot
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn s(v: &str) -> String {
        v.to_string()
    }

    #[test]
    fn append_records_first_snapshot() {
        let mut history: History<String> = History::new();
        let entry = history.append_if_changed_at(&s("v1"), None, EntryKind::Commit, 100);

        assert!(entry.is_some());
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().unwrap().snapshot, "v1");
    }

    #[test]
    fn append_skips_unchanged_content() {
        let mut history: History<String> = History::new();
        history.append_if_changed_at(&s("v1"), None, EntryKind::Commit, 100);
        let entry = history.append_if_changed_at(&s("v1"), Some(s("again")), EntryKind::Commit, 200);

        assert!(entry.is_none());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn timestamps_bump_when_clock_stalls() {
        let mut history: History<String> = History::new();
        history.append_if_changed_at(&s("v1"), None, EntryKind::Commit, 100);
        history.append_if_changed_at(&s("v2"), None, EntryKind::Commit, 100);
        history.append_if_changed_at(&s("v3"), None, EntryKind::Commit, 50);

        let stamps: Vec<_> = history.iter().map(|e| e.timestamp).collect();
        assert_eq!(stamps, vec![102, 101, 100]);
        assert!(history.is_well_formed());
    }

    #[test]
    fn revert_round_trip() {
        // Commit X, move to Y (X is recorded), revert to X.
        let mut history: History<String> = History::new();
        history.append_if_changed_at(&s("X"), None, EntryKind::Commit, 100);
        let current = s("Y");

        let (restored, next) = history.revert_at(&current, 100, 200).unwrap();

        assert_eq!(restored, "X");
        assert_eq!(next.len(), 1);
        assert_eq!(next.latest().unwrap().snapshot, "Y");
        assert_eq!(next.latest().unwrap().kind, EntryKind::Revert);
        assert!(next.get(100).is_none());
    }

    #[test]
    fn revert_missing_timestamp_fails_without_mutation() {
        let mut history: History<String> = History::new();
        history.append_if_changed_at(&s("X"), None, EntryKind::Commit, 100);
        let before = history.clone();

        let result = history.revert_at(&s("Y"), 999, 200);

        assert_eq!(result, Err(HistoryError::EntryNotFound(999)));
        assert_eq!(history, before);
    }

    #[test]
    fn revert_does_not_duplicate_committed_content() {
        // History [Y, X] with current Y: Y is already on top.
        let mut history: History<String> = History::new();
        history.append_if_changed_at(&s("X"), None, EntryKind::Commit, 100);
        history.append_if_changed_at(&s("Y"), None, EntryKind::Commit, 200);

        let (restored, next) = history.revert_at(&s("Y"), 100, 300).unwrap();

        assert_eq!(restored, "X");
        assert_eq!(next.len(), 1);
        assert_eq!(next.latest().unwrap().snapshot, "Y");
        assert!(next.is_well_formed());
    }

    #[test]
    fn revert_from_middle_keeps_neighbours_distinct() {
        let mut history: History<String> = History::new();
        history.append_if_changed_at(&s("A"), None, EntryKind::Commit, 100);
        history.append_if_changed_at(&s("B"), None, EntryKind::Commit, 200);
        history.append_if_changed_at(&s("A"), None, EntryKind::Commit, 300);

        let (restored, next) = history.revert_at(&s("A"), 200, 400).unwrap();

        assert_eq!(restored, "B");
        assert_eq!(next.len(), 1);
        assert_eq!(next.latest().unwrap().timestamp, 300);
        assert!(next.is_well_formed());
    }

    #[test]
    fn revert_timestamp_stays_above_removed_top() {
        let mut history: History<String> = History::new();
        history.append_if_changed_at(&s("X"), None, EntryKind::Commit, 100);
        history.append_if_changed_at(&s("Y"), None, EntryKind::Commit, 500);

        // Clock went backwards; the revert checkpoint must still sort first.
        let (_, next) = history.revert_at(&s("Z"), 500, 10).unwrap();

        assert_eq!(next.latest().unwrap().timestamp, 501);
        assert!(next.is_well_formed());
    }

    proptest! {
        #[test]
        fn history_stays_well_formed(
            ops in proptest::collection::vec((0u8..4, 0i64..1000, 0usize..8), 1..40)
        ) {
            let mut history: History<String> = History::new();
            let mut current = s("initial");

            for (op, now, pick) in ops {
                match op {
                    0 | 1 => {
                        history.append_if_changed_at(&current, None, EntryKind::Commit, now);
                    }
                    2 => {
                        current = format!("content-{}", pick % 3);
                    }
                    _ => {
                        let target = history
                            .iter()
                            .nth(pick % history.len().max(1))
                            .map(|e| e.timestamp);
                        if let Some(ts) = target {
                            let (restored, next) = history.revert_at(&current, ts, now).unwrap();
                            current = restored;
                            history = next;
                        }
                    }
                }
                prop_assert!(history.is_well_formed());
            }
        }
    }
}
