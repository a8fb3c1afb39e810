//! Dependency graph over artifacts
//!
//! Recovered purely from the text of generated sources (see
//! [`patterns`](super::patterns)); nothing in the workspace records these
//! relationships explicitly. Extraction never fails: unmatched imports and
//! route statements simply produce no edge.
//!
//! Edges:
//! - schema -> handler group, for each model import in the group
//! - handler group -> router, for the first controller import in the router
//! - router -> endpoint, for each route registration matching a live
//!   endpoint by verb and path
//!
//! Uses petgraph for graph operations.

use std::collections::HashMap;
use std::fmt;

use petgraph::algo::is_cyclic_directed;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;

use super::artifact::{Artifact, ArtifactKind, EndpointSpec};
use super::id::ArtifactId;
use super::patterns;

/// Vertical distance between stacked nodes in one column
pub const ROW_SPACING: f64 = 120.0;

/// Fixed x offset of each kind's column
pub fn column_x(kind: ArtifactKind) -> f64 {
    match kind {
        ArtifactKind::Schema => 0.0,
        ArtifactKind::HandlerGroup => 320.0,
        ArtifactKind::Router => 640.0,
        ArtifactKind::Endpoint => 960.0,
        ArtifactKind::Middleware => 1280.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: ArtifactId,
    pub kind: ArtifactKind,
    pub label: String,
    pub position: Position,
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: ArtifactId,
    pub target: ArtifactId,
}

/// Serializable view of the whole graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// The live collections a graph is extracted from
#[derive(Debug, Clone, Copy)]
pub struct GraphSources<'a> {
    pub schemas: &'a [Artifact<String>],
    pub handler_groups: &'a [Artifact<String>],
    pub routers: &'a [Artifact<String>],
    pub middleware: &'a [Artifact<String>],
    pub endpoints: &'a [&'a Artifact<EndpointSpec>],
}

/// y offset of the `index`-th of `count` nodes, centred on zero
fn row_y(index: usize, count: usize) -> f64 {
    let middle = (count.saturating_sub(1)) as f64 / 2.0;
    (index as f64 - middle) * ROW_SPACING
}

fn first_by_key<'a, C>(artifacts: &'a [Artifact<C>]) -> HashMap<&'a str, &'a ArtifactId> {
    let mut map = HashMap::new();
    for artifact in artifacts {
        map.entry(artifact.natural_key.as_str())
            .or_insert(&artifact.id);
    }
    map
}

/// A directed graph of artifact relationships with a column layout
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Edge weights are edge IDs
    graph: DiGraph<GraphNode, String>,

    node_map: HashMap<ArtifactId, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Builds the graph and its layout from the live collections
    pub fn extract(sources: &GraphSources<'_>) -> Self {
        let mut graph = Self::new();

        graph.add_column(
            ArtifactKind::Schema,
            sources
                .schemas
                .iter()
                .map(|a| (&a.id, a.natural_key.clone())),
        );
        graph.add_column(
            ArtifactKind::HandlerGroup,
            sources
                .handler_groups
                .iter()
                .map(|a| (&a.id, a.natural_key.clone())),
        );
        graph.add_column(
            ArtifactKind::Router,
            sources
                .routers
                .iter()
                .map(|a| (&a.id, a.natural_key.clone())),
        );
        graph.add_column(
            ArtifactKind::Endpoint,
            sources
                .endpoints
                .iter()
                .map(|a| (&a.id, format!("{} {}", a.content.method, a.content.path))),
        );
        graph.add_column(
            ArtifactKind::Middleware,
            sources
                .middleware
                .iter()
                .map(|a| (&a.id, a.natural_key.clone())),
        );

        let schemas = first_by_key(sources.schemas);
        for group in sources.handler_groups {
            for name in patterns::model_imports(&group.content) {
                if let Some(schema) = schemas.get(name.as_str()) {
                    graph.add_edge(schema, &group.id);
                }
            }
        }

        let groups = first_by_key(sources.handler_groups);
        for router in sources.routers {
            let imported = patterns::controller_imports(&router.content);
            if let Some(group) = imported.first().and_then(|n| groups.get(n.as_str())) {
                graph.add_edge(group, &router.id);
            }

            for (method, path) in patterns::route_registrations(&router.content) {
                let endpoint = sources
                    .endpoints
                    .iter()
                    .find(|e| e.content.method == method && e.content.path == path);
                match endpoint {
                    Some(endpoint) => {
                        graph.add_edge(&router.id, &endpoint.id);
                    }
                    None => log::debug!(
                        "Router '{}' registers {} {} with no live endpoint",
                        router.natural_key,
                        method,
                        path
                    ),
                }
            }
        }

        graph
    }

    /// Adds one column of nodes, stacked in the given order and centred
    fn add_column<'a>(
        &mut self,
        kind: ArtifactKind,
        nodes: impl ExactSizeIterator<Item = (&'a ArtifactId, String)>,
    ) {
        let count = nodes.len();
        for (index, (id, label)) in nodes.enumerate() {
            if self.node_map.contains_key(id) {
                continue;
            }
            let node = GraphNode {
                id: id.clone(),
                kind,
                label,
                position: Position {
                    x: column_x(kind),
                    y: row_y(index, count),
                },
            };
            let idx = self.graph.add_node(node);
            self.node_map.insert(id.clone(), idx);
        }
    }

    /// Adds an edge unless it already exists or an endpoint is unknown
    fn add_edge(&mut self, source: &ArtifactId, target: &ArtifactId) -> bool {
        let (Some(&from), Some(&to)) = (self.node_map.get(source), self.node_map.get(target))
        else {
            return false;
        };

        if self.graph.find_edge(from, to).is_some() {
            return false;
        }

        self.graph
            .add_edge(from, to, format!("{}->{}", source, target));
        true
    }

    /// Nodes in layout order
    pub fn nodes(&self) -> Vec<&GraphNode> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph.node_weight(idx))
            .collect()
    }

    /// Edges in discovery order
    pub fn edges(&self) -> Vec<GraphEdge> {
        self.graph
            .edge_references()
            .map(|edge| GraphEdge {
                id: edge.weight().clone(),
                source: self.graph[edge.source()].id.clone(),
                target: self.graph[edge.target()].id.clone(),
            })
            .collect()
    }

    pub fn node(&self, id: &ArtifactId) -> Option<&GraphNode> {
        self.node_map
            .get(id)
            .and_then(|idx| self.graph.node_weight(*idx))
    }

    /// Artifacts this one depends on (incoming edges)
    pub fn dependencies(&self, id: &ArtifactId) -> Vec<ArtifactId> {
        self.neighbors(id, petgraph::Direction::Incoming)
    }

    /// Artifacts depending on this one (outgoing edges)
    pub fn dependents(&self, id: &ArtifactId) -> Vec<ArtifactId> {
        self.neighbors(id, petgraph::Direction::Outgoing)
    }

    fn neighbors(&self, id: &ArtifactId, direction: petgraph::Direction) -> Vec<ArtifactId> {
        let idx = match self.node_map.get(id) {
            Some(idx) => *idx,
            None => return vec![],
        };

        self.graph
            .neighbors_directed(idx, direction)
            .filter_map(|n| self.graph.node_weight(n).map(|node| node.id.clone()))
            .collect()
    }

    /// True unless generated code produced a cycle
    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.graph)
    }

    pub fn contains(&self, id: &ArtifactId) -> bool {
        self.node_map.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes().into_iter().cloned().collect(),
            edges: self.edges(),
        }
    }

    /// Renders the graph in Graphviz DOT format
    pub fn to_dot(&self) -> String {
        format!("{}", Dot::with_config(&self.graph, &[Config::EdgeNoLabel]))
    }
}
