//! Dependency graph command

use std::collections::HashMap;

use anyhow::Result;

use super::output::Output;
use super::session::Session;
use crate::domain::{ArtifactId, ArtifactKind, DependencyGraph, GraphNode};

/// Prints the dependency graph, or one node's neighbourhood
pub fn run(output: &Output, workspace: Option<&str>, dot: bool, node: Option<&ArtifactId>) -> Result<()> {
    let session = Session::open(output, workspace)?;
    let graph = session.state.graph();
    output.verbose_ctx(
        "graph",
        &format!("{} nodes, {} edges", graph.len(), graph.edge_count()),
    );

    if dot {
        print!("{}", graph.to_dot());
        return Ok(());
    }

    match node {
        Some(id) => show_node(output, &graph, id),
        None => {
            show_graph(output, &graph);
            Ok(())
        }
    }
}

fn show_graph(output: &Output, graph: &DependencyGraph) {
    if output.is_json() {
        let mut data = serde_json::to_value(graph.snapshot()).unwrap_or_default();
        data["acyclic"] = serde_json::json!(graph.is_acyclic());
        output.data(&data);
        return;
    }

    if graph.is_empty() {
        println!("Graph is empty");
        return;
    }

    let nodes = graph.nodes();
    for kind in ArtifactKind::all() {
        let column: Vec<&&GraphNode> = nodes.iter().filter(|n| n.kind == *kind).collect();
        if column.is_empty() {
            continue;
        }
        println!("{} ({})", kind.plural(), column.len());
        for node in column {
            println!("  {}  {}", node.id, node.label);
        }
    }

    let labels: HashMap<&ArtifactId, &str> =
        nodes.iter().map(|n| (&n.id, n.label.as_str())).collect();
    let edges = graph.edges();
    if !edges.is_empty() {
        println!();
        println!("Edges ({})", edges.len());
        for edge in &edges {
            println!(
                "  {} -> {}",
                labels.get(&edge.source).copied().unwrap_or("?"),
                labels.get(&edge.target).copied().unwrap_or("?")
            );
        }
    }

    if !graph.is_acyclic() {
        println!();
        println!("warning: the graph contains a cycle");
    }
}

fn show_node(output: &Output, graph: &DependencyGraph, id: &ArtifactId) -> Result<()> {
    let node = graph
        .node(id)
        .ok_or_else(|| anyhow::anyhow!("Artifact not in graph: {}", id))?;
    let dependencies = graph.dependencies(id);
    let dependents = graph.dependents(id);

    if output.is_json() {
        output.data(&serde_json::json!({
            "node": node,
            "dependencies": dependencies,
            "dependents": dependents,
        }));
        return Ok(());
    }

    let label = |id: &ArtifactId| {
        graph
            .node(id)
            .map(|n| n.label.clone())
            .unwrap_or_else(|| id.to_string())
    };

    println!("{} {} ({})", node.kind, node.label, node.id);
    println!("Depends on:");
    for dep in &dependencies {
        println!("  {}  {}", dep, label(dep));
    }
    println!("Used by:");
    for dep in &dependents {
        println!("  {}  {}", dep, label(dep));
    }

    Ok(())
}
