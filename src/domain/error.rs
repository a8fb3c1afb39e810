//! Errors raised by workspace operations

use thiserror::Error;

use super::artifact::ArtifactKind;
use super::id::{ArtifactId, CollectionId};

#[derive(Debug, Error, PartialEq)]
pub enum WorkspaceError {
    #[error("{kind} not found: {id}")]
    ArtifactNotFound { kind: ArtifactKind, id: ArtifactId },

    #[error("No snapshot of {id} at timestamp {timestamp}")]
    SnapshotNotFound { id: ArtifactId, timestamp: i64 },

    #[error("Endpoint collection not found: {0}")]
    CollectionNotFound(CollectionId),

    #[error("Endpoint {endpoint} is not in collection {collection}")]
    EndpointNotInCollection {
        endpoint: ArtifactId,
        collection: CollectionId,
    },

    #[error("The default collection cannot be renamed or deleted")]
    DefaultCollectionImmutable,

    #[error("An endpoint collection named '{0}' already exists")]
    DuplicateCollectionName(String),

    #[error("Expected {expected} content, got {found}")]
    KindMismatch {
        expected: ArtifactKind,
        found: ArtifactKind,
    },
}

impl WorkspaceError {
    /// True for errors caused by a stale or unknown reference
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            WorkspaceError::ArtifactNotFound { .. }
                | WorkspaceError::SnapshotNotFound { .. }
                | WorkspaceError::CollectionNotFound(_)
                | WorkspaceError::EndpointNotInCollection { .. }
        )
    }
}
