//! Scaffold CLI - versioned workspaces for generated backend code
//!
//! A workspace holds five kinds of generated artifacts (schemas, handler
//! groups, routers, middleware and endpoints). Every artifact keeps an
//! append-only history of snapshots. Generated batches are reconciled into
//! the workspace by natural key, handler groups and routers can be derived
//! from the endpoints, and a dependency graph is extracted from the code.

pub mod cli;
pub mod domain;
pub mod generator;
pub mod storage;

pub use domain::{Artifact, ArtifactId, ArtifactKind, EndpointSpec, WorkspaceState};
