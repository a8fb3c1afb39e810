//! Manual commit points and point-in-time revert
//!
//! Both operations take a collection snapshot and return the next one;
//! callers replace the whole collection with the result.

use super::artifact::{Artifact, ArtifactContent};
use super::error::WorkspaceError;
use super::history::{EntryKind, HistoryError};
use super::id::ArtifactId;

/// Snapshots every artifact whose content differs from its newest entry
///
/// Returns the next collection and the IDs that received a new entry.
pub fn commit_all<C: ArtifactContent>(
    artifacts: &[Artifact<C>],
    message: Option<&str>,
) -> (Vec<Artifact<C>>, Vec<ArtifactId>) {
    let mut committed = Vec::new();
    let next = artifacts
        .iter()
        .cloned()
        .map(|mut artifact| {
            let content = artifact.content.clone();
            if artifact
                .history
                .append_if_changed(&content, message.map(str::to_string), EntryKind::Commit)
                .is_some()
            {
                committed.push(artifact.id.clone());
            }
            artifact
        })
        .collect();

    (next, committed)
}

/// Restores artifact `id` to the snapshot taken at `timestamp`
///
/// Fails without producing a new collection when either the artifact or
/// the snapshot is unknown.
pub fn revert_artifact<C: ArtifactContent>(
    artifacts: &[Artifact<C>],
    id: &ArtifactId,
    timestamp: i64,
) -> Result<Vec<Artifact<C>>, WorkspaceError> {
    let position = artifacts
        .iter()
        .position(|a| &a.id == id)
        .ok_or_else(|| WorkspaceError::ArtifactNotFound {
            kind: id.kind(),
            id: id.clone(),
        })?;

    let target = &artifacts[position];
    let (restored, history) = target
        .history
        .revert(&target.content, timestamp)
        .map_err(|e| match e {
            HistoryError::EntryNotFound(timestamp) => WorkspaceError::SnapshotNotFound {
                id: id.clone(),
                timestamp,
            },
        })?;

    let mut next = artifacts.to_vec();
    next[position].content = restored;
    next[position].history = history;
    log::info!("Reverted {} to snapshot {}", id, timestamp);

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::artifact::ArtifactKind;

    fn artifact(key: &str, content: &str) -> Artifact<String> {
        Artifact::new(ArtifactKind::Schema, key, content.to_string())
    }

    #[test]
    fn commit_empty_collection_is_noop() {
        let (next, committed) = commit_all::<String>(&[], Some("empty"));

        assert!(next.is_empty());
        assert!(committed.is_empty());
    }

    #[test]
    fn commit_snapshots_uncommitted_content() {
        let collection = vec![artifact("User", "u1"), artifact("Post", "p1")];

        let (next, committed) = commit_all(&collection, Some("first"));

        assert_eq!(committed.len(), 2);
        assert!(next.iter().all(|a| a.is_committed()));
        assert_eq!(
            next[0].history.latest().unwrap().message.as_deref(),
            Some("first")
        );
    }

    #[test]
    fn commit_twice_adds_nothing() {
        let collection = vec![artifact("User", "u1")];
        let (once, _) = commit_all(&collection, None);

        let (twice, committed) = commit_all(&once, Some("again"));

        assert!(committed.is_empty());
        assert_eq!(twice, once);
    }

    #[test]
    fn commit_then_edit_then_revert() {
        let collection = vec![artifact("User", "X")];
        let (mut committed, _) = commit_all(&collection, None);
        let ts = committed[0].history.latest().unwrap().timestamp;
        committed[0].content = "Y".to_string();
        let id = committed[0].id.clone();

        let reverted = revert_artifact(&committed, &id, ts).unwrap();

        assert_eq!(reverted[0].content, "X");
        assert_eq!(reverted[0].history.latest().unwrap().snapshot, "Y");
        assert_eq!(reverted[0].history.latest().unwrap().kind, EntryKind::Revert);
    }

    #[test]
    fn revert_unknown_artifact_fails() {
        let collection = vec![artifact("User", "X")];
        let stranger = ArtifactId::generate(ArtifactKind::Schema, "Ghost");

        let err = revert_artifact(&collection, &stranger, 1).unwrap_err();

        assert!(err.is_not_found());
        assert!(matches!(err, WorkspaceError::ArtifactNotFound { .. }));
    }

    #[test]
    fn revert_unknown_timestamp_fails() {
        let collection = vec![artifact("User", "X")];
        let id = collection[0].id.clone();

        let err = revert_artifact(&collection, &id, 42).unwrap_err();

        assert_eq!(
            err,
            WorkspaceError::SnapshotNotFound { id, timestamp: 42 }
        );
    }
}
