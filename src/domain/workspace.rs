//! Workspace state and the operations exposed to callers
//!
//! A workspace owns one ordered collection per source kind plus the named
//! endpoint collections. Every operation computes the next collection with
//! the pure functions in [`commit`](super::commit),
//! [`reconcile`](super::reconcile) and [`derive`](super::derive), then
//! replaces the affected collection wholesale.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::artifact::{Artifact, ArtifactKind, BatchItem, EndpointSpec};
use super::commit::{commit_all, revert_artifact};
use super::derive::{derive_handler_groups, derive_routers};
use super::error::WorkspaceError;
use super::graph::{DependencyGraph, GraphSources};
use super::id::{ArtifactId, CollectionId};
use super::reconcile::{reconcile, ReconcileReport};

/// Name of the catch-all endpoint collection
pub const DEFAULT_COLLECTION_NAME: &str = "Default";

/// A named group of endpoint artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointCollection {
    pub id: CollectionId,
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<Artifact<EndpointSpec>>,
}

impl EndpointCollection {
    pub fn new(id: CollectionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            endpoints: Vec::new(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.id.is_default()
    }
}

/// UI-level preferences, carried through untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub visible_panels: Vec<String>,

    #[serde(default)]
    pub target_framework: String,

    /// Keys written by other tools
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A batch returned by the generation collaborator, typed by content
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedBatch {
    Sources {
        kind: ArtifactKind,
        items: Vec<BatchItem<String>>,
    },
    Endpoints(Vec<BatchItem<EndpointSpec>>),
}

impl GeneratedBatch {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            GeneratedBatch::Sources { kind, .. } => *kind,
            GeneratedBatch::Endpoints(_) => ArtifactKind::Endpoint,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            GeneratedBatch::Sources { items, .. } => items.len(),
            GeneratedBatch::Endpoints(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reports of the two reconciliations run by [`WorkspaceState::derive`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeriveReport {
    pub handler_groups: ReconcileReport,
    pub routers: ReconcileReport,
}

impl DeriveReport {
    pub fn is_noop(&self) -> bool {
        self.handler_groups.is_noop() && self.routers.is_noop()
    }
}

/// Everything persisted for one workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceState {
    pub id: String,

    #[serde(default)]
    pub schemas: Vec<Artifact<String>>,

    #[serde(default)]
    pub handler_groups: Vec<Artifact<String>>,

    #[serde(default)]
    pub routers: Vec<Artifact<String>>,

    #[serde(default)]
    pub middleware: Vec<Artifact<String>>,

    pub endpoint_collections: Vec<EndpointCollection>,

    #[serde(default)]
    pub preferences: Preferences,
}

impl WorkspaceState {
    /// Creates an empty workspace holding only the default collection
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            schemas: Vec::new(),
            handler_groups: Vec::new(),
            routers: Vec::new(),
            middleware: Vec::new(),
            endpoint_collections: vec![EndpointCollection::new(
                CollectionId::default_collection(),
                DEFAULT_COLLECTION_NAME,
            )],
            preferences: Preferences::default(),
        }
    }

    pub fn with_target_framework(mut self, framework: impl Into<String>) -> Self {
        self.preferences.target_framework = framework.into();
        self
    }

    /// Restores the default collection if a hand-edited file lost it
    pub fn ensure_default_collection(&mut self) {
        if !self.endpoint_collections.iter().any(|c| c.is_default()) {
            log::warn!("Workspace '{}' had no default collection; recreating it", self.id);
            self.endpoint_collections.insert(
                0,
                EndpointCollection::new(CollectionId::default_collection(), DEFAULT_COLLECTION_NAME),
            );
        }
    }

    /// Source collection for a kind, `None` for endpoints
    pub fn sources(&self, kind: ArtifactKind) -> Option<&[Artifact<String>]> {
        match kind {
            ArtifactKind::Schema => Some(&self.schemas),
            ArtifactKind::HandlerGroup => Some(&self.handler_groups),
            ArtifactKind::Router => Some(&self.routers),
            ArtifactKind::Middleware => Some(&self.middleware),
            ArtifactKind::Endpoint => None,
        }
    }

    fn sources_mut(&mut self, kind: ArtifactKind) -> Option<&mut Vec<Artifact<String>>> {
        match kind {
            ArtifactKind::Schema => Some(&mut self.schemas),
            ArtifactKind::HandlerGroup => Some(&mut self.handler_groups),
            ArtifactKind::Router => Some(&mut self.routers),
            ArtifactKind::Middleware => Some(&mut self.middleware),
            ArtifactKind::Endpoint => None,
        }
    }

    /// All endpoints, collection by collection
    pub fn endpoints(&self) -> impl Iterator<Item = &Artifact<EndpointSpec>> {
        self.endpoint_collections
            .iter()
            .flat_map(|c| c.endpoints.iter())
    }

    /// Number of artifacts of a kind
    pub fn count(&self, kind: ArtifactKind) -> usize {
        match self.sources(kind) {
            Some(artifacts) => artifacts.len(),
            None => self.endpoints().count(),
        }
    }

    pub fn find_source(&self, kind: ArtifactKind, id: &ArtifactId) -> Option<&Artifact<String>> {
        self.sources(kind)?.iter().find(|a| &a.id == id)
    }

    /// An endpoint and the collection holding it
    pub fn find_endpoint(&self, id: &ArtifactId) -> Option<(&CollectionId, &Artifact<EndpointSpec>)> {
        self.endpoint_collections.iter().find_map(|c| {
            c.endpoints
                .iter()
                .find(|e| &e.id == id)
                .map(|e| (&c.id, e))
        })
    }

    pub fn collection(&self, id: &CollectionId) -> Option<&EndpointCollection> {
        self.endpoint_collections.iter().find(|c| &c.id == id)
    }

    fn collection_index(&self, id: &CollectionId) -> Result<usize, WorkspaceError> {
        self.endpoint_collections
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| WorkspaceError::CollectionNotFound(id.clone()))
    }

    fn default_index(&mut self) -> usize {
        self.ensure_default_collection();
        self.endpoint_collections
            .iter()
            .position(|c| c.is_default())
            .unwrap_or(0)
    }

    fn not_found(kind: ArtifactKind, id: &ArtifactId) -> WorkspaceError {
        WorkspaceError::ArtifactNotFound {
            kind,
            id: id.clone(),
        }
    }

    /// Snapshots every changed artifact of a kind; returns the IDs snapshotted
    pub fn commit(&mut self, kind: ArtifactKind, message: Option<&str>) -> Vec<ArtifactId> {
        let committed = match self.sources_mut(kind) {
            Some(artifacts) => {
                let (next, committed) = commit_all(artifacts, message);
                *artifacts = next;
                committed
            }
            None => {
                let mut committed = Vec::new();
                for collection in &mut self.endpoint_collections {
                    let (next, ids) = commit_all(&collection.endpoints, message);
                    collection.endpoints = next;
                    committed.extend(ids);
                }
                committed
            }
        };

        log::info!("Committed {} of {}", committed.len(), kind.plural());
        committed
    }

    /// Restores one artifact to the snapshot taken at `timestamp`
    pub fn revert(
        &mut self,
        kind: ArtifactKind,
        id: &ArtifactId,
        timestamp: i64,
    ) -> Result<(), WorkspaceError> {
        if id.kind() != kind {
            return Err(Self::not_found(kind, id));
        }

        match self.sources_mut(kind) {
            Some(artifacts) => {
                *artifacts = revert_artifact(artifacts, id, timestamp)?;
            }
            None => {
                let collection = self
                    .endpoint_collections
                    .iter_mut()
                    .find(|c| c.endpoints.iter().any(|e| &e.id == id))
                    .ok_or_else(|| Self::not_found(kind, id))?;
                collection.endpoints = revert_artifact(&collection.endpoints, id, timestamp)?;
            }
        }
        Ok(())
    }

    /// Merges a generated batch into the collection of `kind`
    pub fn reconcile(
        &mut self,
        kind: ArtifactKind,
        batch: GeneratedBatch,
    ) -> Result<ReconcileReport, WorkspaceError> {
        if batch.kind() != kind {
            return Err(WorkspaceError::KindMismatch {
                expected: kind,
                found: batch.kind(),
            });
        }

        match batch {
            GeneratedBatch::Sources { items, .. } => Ok(self.reconcile_sources(kind, items)),
            GeneratedBatch::Endpoints(items) => Ok(self.reconcile_endpoints(items)),
        }
    }

    fn reconcile_sources(&mut self, kind: ArtifactKind, items: Vec<BatchItem<String>>) -> ReconcileReport {
        let Some(artifacts) = self.sources_mut(kind) else {
            return ReconcileReport::default();
        };
        let reconciled = reconcile(kind, std::mem::take(artifacts), items);
        *artifacts = reconciled.artifacts;
        reconciled.report
    }

    /// Reconciles across every collection: matched endpoints stay where they
    /// are, new ones land in the default collection
    fn reconcile_endpoints(&mut self, items: Vec<BatchItem<EndpointSpec>>) -> ReconcileReport {
        let mut home: HashMap<ArtifactId, usize> = HashMap::new();
        let mut existing = Vec::new();
        for (index, collection) in self.endpoint_collections.iter_mut().enumerate() {
            for endpoint in collection.endpoints.drain(..) {
                home.insert(endpoint.id.clone(), index);
                existing.push(endpoint);
            }
        }

        let reconciled = reconcile(ArtifactKind::Endpoint, existing, items);
        let default = self.default_index();
        for endpoint in reconciled.artifacts {
            let index = home.get(&endpoint.id).copied().unwrap_or(default);
            self.endpoint_collections[index].endpoints.push(endpoint);
        }

        reconciled.report
    }

    /// Regenerates handler groups from the endpoints, then routers from the
    /// handler groups
    pub fn derive(&mut self) -> DeriveReport {
        let schema_names: Vec<&str> = self.schemas.iter().map(|s| s.natural_key.as_str()).collect();
        let endpoints: Vec<&EndpointSpec> = self.endpoints().map(|e| &e.content).collect();
        let groups = derive_handler_groups(&endpoints, &schema_names);

        let reconciled = reconcile(
            ArtifactKind::HandlerGroup,
            std::mem::take(&mut self.handler_groups),
            groups,
        );
        self.handler_groups = reconciled.artifacts;
        let handler_groups = reconciled.report;

        let endpoints: Vec<&EndpointSpec> = self.endpoints().map(|e| &e.content).collect();
        let routers = derive_routers(&self.handler_groups, &endpoints);
        let reconciled = reconcile(
            ArtifactKind::Router,
            std::mem::take(&mut self.routers),
            routers,
        );
        self.routers = reconciled.artifacts;

        DeriveReport {
            handler_groups,
            routers: reconciled.report,
        }
    }

    /// Removes one artifact
    pub fn delete_artifact(
        &mut self,
        kind: ArtifactKind,
        id: &ArtifactId,
    ) -> Result<(), WorkspaceError> {
        match self.sources_mut(kind) {
            Some(artifacts) => {
                let position = artifacts
                    .iter()
                    .position(|a| &a.id == id)
                    .ok_or_else(|| Self::not_found(kind, id))?;
                artifacts.remove(position);
            }
            None => {
                let collection = self
                    .endpoint_collections
                    .iter_mut()
                    .find(|c| c.endpoints.iter().any(|e| &e.id == id))
                    .ok_or_else(|| Self::not_found(kind, id))?;
                collection.endpoints.retain(|e| &e.id != id);
            }
        }
        log::info!("Deleted {} {}", kind, id);
        Ok(())
    }

    fn check_name_free(&self, name: &str, except: Option<&CollectionId>) -> Result<(), WorkspaceError> {
        let taken = self
            .endpoint_collections
            .iter()
            .filter(|c| Some(&c.id) != except)
            .any(|c| c.name.eq_ignore_ascii_case(name));
        if taken {
            return Err(WorkspaceError::DuplicateCollectionName(name.to_string()));
        }
        Ok(())
    }

    pub fn create_collection(&mut self, name: &str) -> Result<CollectionId, WorkspaceError> {
        let name = name.trim();
        self.check_name_free(name, None)?;

        let id = CollectionId::new(name, Utc::now());
        self.endpoint_collections
            .push(EndpointCollection::new(id.clone(), name));
        log::info!("Created endpoint collection '{}' ({})", name, id);
        Ok(id)
    }

    pub fn rename_collection(&mut self, id: &CollectionId, name: &str) -> Result<(), WorkspaceError> {
        if id.is_default() {
            return Err(WorkspaceError::DefaultCollectionImmutable);
        }
        let index = self.collection_index(id)?;
        let name = name.trim();
        self.check_name_free(name, Some(id))?;

        self.endpoint_collections[index].name = name.to_string();
        Ok(())
    }

    /// Deletes a collection, moving its endpoints to the end of the default
    /// collection; returns how many were moved
    pub fn delete_collection(&mut self, id: &CollectionId) -> Result<usize, WorkspaceError> {
        if id.is_default() {
            return Err(WorkspaceError::DefaultCollectionImmutable);
        }
        let index = self.collection_index(id)?;

        let removed = self.endpoint_collections.remove(index);
        let moved = removed.endpoints.len();
        let default = self.default_index();
        self.endpoint_collections[default]
            .endpoints
            .extend(removed.endpoints);

        log::info!(
            "Deleted endpoint collection '{}', moved {} endpoint(s) to the default",
            removed.name,
            moved
        );
        Ok(moved)
    }

    /// Moves an endpoint between collections; appended at the end of `to`
    pub fn move_endpoint(
        &mut self,
        id: &ArtifactId,
        from: &CollectionId,
        to: &CollectionId,
    ) -> Result<(), WorkspaceError> {
        let from_index = self.collection_index(from)?;
        let to_index = self.collection_index(to)?;

        let source = &mut self.endpoint_collections[from_index];
        let position = source
            .endpoints
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| WorkspaceError::EndpointNotInCollection {
                endpoint: id.clone(),
                collection: from.clone(),
            })?;

        if from_index == to_index {
            return Ok(());
        }

        let endpoint = source.endpoints.remove(position);
        self.endpoint_collections[to_index].endpoints.push(endpoint);
        Ok(())
    }

    /// Extracts the current dependency graph
    pub fn graph(&self) -> DependencyGraph {
        let endpoints: Vec<&Artifact<EndpointSpec>> = self.endpoints().collect();
        DependencyGraph::extract(&GraphSources {
            schemas: &self.schemas,
            handler_groups: &self.handler_groups,
            routers: &self.routers,
            middleware: &self.middleware,
            endpoints: &endpoints,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::artifact::HttpMethod;
    use crate::domain::history::EntryKind;

    fn sources(kind: ArtifactKind, items: &[(&str, &str)]) -> GeneratedBatch {
        GeneratedBatch::Sources {
            kind,
            items: items
                .iter()
                .map(|(k, c)| BatchItem::new(*k, c.to_string()))
                .collect(),
        }
    }

    fn endpoint(method: HttpMethod, path: &str, handler: &str) -> BatchItem<EndpointSpec> {
        BatchItem::endpoint(EndpointSpec::new(path, method, path).with_handler(handler))
    }

    fn populated() -> WorkspaceState {
        let mut ws = WorkspaceState::new("demo");
        ws.reconcile(
            ArtifactKind::Schema,
            sources(ArtifactKind::Schema, &[("User", "user schema"), ("Category", "category schema")]),
        )
        .unwrap();
        ws.reconcile(
            ArtifactKind::Endpoint,
            GeneratedBatch::Endpoints(vec![
                endpoint(
                    HttpMethod::Get,
                    "/api/users",
                    "import User from '../models/User.js';\nexport const listUsers = async (req, res) => {};",
                ),
                endpoint(
                    HttpMethod::Get,
                    "/api/categories",
                    "import Category from '../models/Category.js';\nexport const listCategories = async (req, res) => {};",
                ),
            ]),
        )
        .unwrap();
        ws
    }

    #[test]
    fn new_workspace_has_default_collection() {
        let ws = WorkspaceState::new("demo");

        assert_eq!(ws.endpoint_collections.len(), 1);
        assert!(ws.endpoint_collections[0].is_default());
        assert_eq!(ws.count(ArtifactKind::Endpoint), 0);
    }

    #[test]
    fn reconcile_rejects_mismatched_batch() {
        let mut ws = WorkspaceState::new("demo");

        let err = ws
            .reconcile(ArtifactKind::Router, sources(ArtifactKind::Schema, &[("User", "x")]))
            .unwrap_err();

        assert_eq!(
            err,
            WorkspaceError::KindMismatch {
                expected: ArtifactKind::Router,
                found: ArtifactKind::Schema
            }
        );
        assert!(ws.schemas.is_empty());
    }

    #[test]
    fn endpoint_reconcile_keeps_collection_membership() {
        let mut ws = populated();
        let api = ws.create_collection("Users API").unwrap();
        let users = ws.endpoints().next().unwrap().id.clone();
        ws.move_endpoint(&users, &CollectionId::default_collection(), &api)
            .unwrap();

        let report = ws
            .reconcile(
                ArtifactKind::Endpoint,
                GeneratedBatch::Endpoints(vec![
                    endpoint(HttpMethod::Get, "/api/users", "export const listUsers = () => 1;"),
                    endpoint(HttpMethod::Post, "/api/users", "export const createUser = () => 1;"),
                ]),
            )
            .unwrap();

        assert_eq!(report.updated, vec![users.clone()]);
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.dropped.len(), 1);
        assert_eq!(ws.find_endpoint(&users).unwrap().0, &api);
        let default = ws.collection(&CollectionId::default_collection()).unwrap();
        assert_eq!(default.endpoints.len(), 1);
        assert_eq!(default.endpoints[0].natural_key, "POST /api/users");
    }

    #[test]
    fn commit_and_revert_through_workspace() {
        let mut ws = populated();
        let committed = ws.commit(ArtifactKind::Schema, Some("baseline"));
        assert_eq!(committed.len(), 2);
        assert!(ws.commit(ArtifactKind::Schema, None).is_empty());

        let id = ws.schemas[0].id.clone();
        let ts = ws.schemas[0].history.latest().unwrap().timestamp;
        ws.schemas[0].content = "edited".to_string();

        ws.revert(ArtifactKind::Schema, &id, ts).unwrap();

        assert_eq!(ws.schemas[0].content, "user schema");
        let top = ws.schemas[0].history.latest().unwrap();
        assert_eq!(top.snapshot, "edited");
        assert_eq!(top.kind, EntryKind::Revert);
    }

    #[test]
    fn commit_endpoints_spans_collections() {
        let mut ws = populated();
        let other = ws.create_collection("Other").unwrap();
        let id = ws.endpoints().next().unwrap().id.clone();
        ws.move_endpoint(&id, &CollectionId::default_collection(), &other)
            .unwrap();

        let committed = ws.commit(ArtifactKind::Endpoint, None);

        assert_eq!(committed.len(), 2);
        assert!(ws.endpoints().all(|e| e.is_committed()));
    }

    #[test]
    fn revert_with_wrong_kind_is_not_found() {
        let mut ws = populated();
        ws.commit(ArtifactKind::Schema, None);
        let id = ws.schemas[0].id.clone();
        let ts = ws.schemas[0].history.latest().unwrap().timestamp;

        let err = ws.revert(ArtifactKind::Router, &id, ts).unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn derive_builds_groups_and_routers() {
        let mut ws = populated();

        let report = ws.derive();

        let groups: Vec<_> = ws.handler_groups.iter().map(|g| g.natural_key.as_str()).collect();
        let routers: Vec<_> = ws.routers.iter().map(|r| r.natural_key.as_str()).collect();
        assert_eq!(groups, vec!["userController", "categoryController"]);
        assert_eq!(routers, vec!["userRoutes", "categoryRoutes"]);
        assert_eq!(report.handler_groups.created.len(), 2);

        let again = ws.derive();
        assert!(again.is_noop());
    }

    #[test]
    fn derived_workspace_graph_is_connected() {
        let mut ws = populated();
        ws.derive();

        let graph = ws.graph();

        assert_eq!(graph.len(), 8);
        assert_eq!(graph.edge_count(), 6);
        assert!(graph.is_acyclic());
        let user = &ws.schemas[0].id;
        assert_eq!(graph.dependents(user), vec![ws.handler_groups[0].id.clone()]);
    }

    #[test]
    fn collection_names_are_unique_ignoring_case() {
        let mut ws = WorkspaceState::new("demo");
        ws.create_collection("Admin").unwrap();

        assert_eq!(
            ws.create_collection("admin").unwrap_err(),
            WorkspaceError::DuplicateCollectionName("admin".to_string())
        );
        assert!(ws.create_collection("default").is_err());
    }

    #[test]
    fn default_collection_is_immutable() {
        let mut ws = WorkspaceState::new("demo");
        let default = CollectionId::default_collection();

        assert_eq!(
            ws.rename_collection(&default, "Other"),
            Err(WorkspaceError::DefaultCollectionImmutable)
        );
        assert_eq!(
            ws.delete_collection(&default),
            Err(WorkspaceError::DefaultCollectionImmutable)
        );
    }

    #[test]
    fn rename_keeps_own_name_available() {
        let mut ws = WorkspaceState::new("demo");
        let id = ws.create_collection("Admin").unwrap();

        ws.rename_collection(&id, "ADMIN").unwrap();

        assert_eq!(ws.collection(&id).unwrap().name, "ADMIN");
    }

    #[test]
    fn deleting_collection_moves_endpoints_to_default() {
        let mut ws = populated();
        let admin = ws.create_collection("Admin").unwrap();
        let id = ws.endpoints().next().unwrap().id.clone();
        ws.move_endpoint(&id, &CollectionId::default_collection(), &admin)
            .unwrap();

        let moved = ws.delete_collection(&admin).unwrap();

        assert_eq!(moved, 1);
        assert!(ws.collection(&admin).is_none());
        let (home, _) = ws.find_endpoint(&id).unwrap();
        assert!(home.is_default());
        assert_eq!(ws.count(ArtifactKind::Endpoint), 2);
    }

    #[test]
    fn move_from_wrong_collection_fails_without_change() {
        let mut ws = populated();
        let admin = ws.create_collection("Admin").unwrap();
        let id = ws.endpoints().next().unwrap().id.clone();
        let before = ws.clone();

        let err = ws
            .move_endpoint(&id, &admin, &CollectionId::default_collection())
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(ws, before);
    }

    #[test]
    fn move_to_unknown_collection_fails() {
        let mut ws = populated();
        let id = ws.endpoints().next().unwrap().id.clone();
        let ghost: CollectionId = "c-abcdef0".parse().unwrap();

        let err = ws
            .move_endpoint(&id, &CollectionId::default_collection(), &ghost)
            .unwrap_err();

        assert_eq!(err, WorkspaceError::CollectionNotFound(ghost));
    }

    #[test]
    fn delete_artifact_removes_only_target() {
        let mut ws = populated();
        let id = ws.schemas[0].id.clone();

        ws.delete_artifact(ArtifactKind::Schema, &id).unwrap();

        assert_eq!(ws.schemas.len(), 1);
        assert!(ws.delete_artifact(ArtifactKind::Schema, &id).unwrap_err().is_not_found());
    }

    #[test]
    fn delete_endpoint_artifact() {
        let mut ws = populated();
        let id = ws.endpoints().next().unwrap().id.clone();

        ws.delete_artifact(ArtifactKind::Endpoint, &id).unwrap();

        assert!(ws.find_endpoint(&id).is_none());
    }

    #[test]
    fn state_roundtrips_through_json_with_extra_preferences() {
        let mut ws = populated().with_target_framework("express");
        ws.preferences
            .extra
            .insert("theme".to_string(), serde_json::json!("dark"));

        let json = serde_json::to_string(&ws).unwrap();
        let parsed: WorkspaceState = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, ws);
        assert!(json.contains("\"theme\":\"dark\""));
    }
}
