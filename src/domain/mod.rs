//! Domain models for Scaffold
//!
//! Versioned artifacts, reconciliation, derivation and the dependency graph.
//! Contains the core logic without any I/O concerns.

mod artifact;
mod commit;
mod derive;
mod error;
mod graph;
mod history;
mod id;
mod reconcile;
mod workspace;

pub mod naming;
pub mod patterns;

pub use artifact::{Artifact, ArtifactContent, ArtifactKind, BatchItem, EndpointSpec, HttpMethod};
pub use commit::{commit_all, revert_artifact};
pub use derive::{derive_handler_groups, derive_routers, handler_name};
pub use error::WorkspaceError;
pub use graph::{
    column_x, DependencyGraph, GraphEdge, GraphNode, GraphSnapshot, GraphSources, Position,
    ROW_SPACING,
};
pub use history::{current_timestamp, EntryKind, History, HistoryEntry, HistoryError};
pub use id::{ArtifactId, CollectionId, IdError};
pub use reconcile::{reconcile, ReconcileReport, ReconcileStatus, Reconciled};
pub use workspace::{
    DeriveReport, EndpointCollection, GeneratedBatch, Preferences, WorkspaceState,
    DEFAULT_COLLECTION_NAME,
};
