//! Workspace CLI commands and project status

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use super::session::Session;
use crate::domain::{ArtifactKind, WorkspaceState};
use crate::storage::{validate_workspace_id, Project};

#[derive(Subcommand)]
pub enum WorkspaceCommands {
    /// List stored workspaces
    List,

    /// Create a new empty workspace
    New {
        /// Workspace id (letters, digits, '-' and '_')
        id: String,
    },

    /// Show the active workspace
    Show,
}

pub fn run(cmd: WorkspaceCommands, output: &Output, workspace: Option<&str>) -> Result<()> {
    match cmd {
        WorkspaceCommands::List => list_workspaces(output, workspace),
        WorkspaceCommands::New { id } => new_workspace(output, &id),
        WorkspaceCommands::Show => show_workspace(output, workspace),
    }
}

fn list_workspaces(output: &Output, workspace: Option<&str>) -> Result<()> {
    let project = Project::open_current()?;
    let active = project.workspace_id(workspace)?;
    let ids = project.workspace_store().list()?;

    if output.is_json() {
        let items: Vec<_> = ids
            .iter()
            .map(|id| serde_json::json!({ "id": id, "active": *id == active }))
            .collect();
        output.data(&items);
    } else if ids.is_empty() {
        println!("No workspaces. Create one with 'scaffold workspace new <id>'");
    } else {
        for id in &ids {
            let marker = if *id == active { "*" } else { " " };
            println!("{} {}", marker, id);
        }
    }

    Ok(())
}

fn new_workspace(output: &Output, id: &str) -> Result<()> {
    validate_workspace_id(id)?;
    let project = Project::open_current()?;
    let store = project.workspace_store();

    if store.exists(id) {
        anyhow::bail!("Workspace already exists: {}", id);
    }

    let state = project.new_workspace(id);
    store.save(&state)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": state.id,
            "target_framework": state.preferences.target_framework,
        }));
    } else {
        output.success(&format!("Created workspace: {}", id));
    }

    Ok(())
}

fn uncommitted(state: &WorkspaceState, kind: ArtifactKind) -> usize {
    match state.sources(kind) {
        Some(artifacts) => artifacts.iter().filter(|a| !a.is_committed()).count(),
        None => state.endpoints().filter(|a| !a.is_committed()).count(),
    }
}

/// Per-kind counts shown by `status` and `workspace show`
fn summary(state: &WorkspaceState) -> serde_json::Value {
    let kinds: serde_json::Map<String, serde_json::Value> = ArtifactKind::all()
        .iter()
        .map(|kind| {
            (
                kind.to_string(),
                serde_json::json!({
                    "count": state.count(*kind),
                    "uncommitted": uncommitted(state, *kind),
                }),
            )
        })
        .collect();

    let graph = state.graph();
    serde_json::json!({
        "id": state.id,
        "target_framework": state.preferences.target_framework,
        "artifacts": kinds,
        "collections": state.endpoint_collections.len(),
        "graph": {
            "nodes": graph.len(),
            "edges": graph.edge_count(),
            "acyclic": graph.is_acyclic(),
        },
    })
}

fn print_summary(state: &WorkspaceState) {
    println!("Workspace: {}", state.id);
    if !state.preferences.target_framework.is_empty() {
        println!("Target framework: {}", state.preferences.target_framework);
    }
    println!();
    println!("{:<16} {:>6} {:>12}", "KIND", "COUNT", "UNCOMMITTED");
    for kind in ArtifactKind::all() {
        println!(
            "{:<16} {:>6} {:>12}",
            kind.plural(),
            state.count(*kind),
            uncommitted(state, *kind)
        );
    }
    println!();
    println!("Endpoint collections: {}", state.endpoint_collections.len());

    let graph = state.graph();
    println!(
        "Dependency graph: {} nodes, {} edges{}",
        graph.len(),
        graph.edge_count(),
        if graph.is_acyclic() { "" } else { " (contains a cycle)" }
    );
}

fn show_workspace(output: &Output, workspace: Option<&str>) -> Result<()> {
    let session = Session::open(output, workspace)?;

    if output.is_json() {
        let mut data = summary(&session.state);
        data["preferences"] = serde_json::to_value(&session.state.preferences)?;
        output.data(&data);
    } else {
        print_summary(&session.state);
        if !session.state.preferences.visible_panels.is_empty() {
            println!(
                "Visible panels: {}",
                session.state.preferences.visible_panels.join(", ")
            );
        }
    }

    Ok(())
}

/// Shows project status for the active workspace
pub fn status(output: &Output, workspace: Option<&str>) -> Result<()> {
    let session = Session::open(output, workspace)?;
    let generator = &session.project.config().project.generator;

    if output.is_json() {
        let mut data = summary(&session.state);
        data["project"] = serde_json::json!(session.project.root().display().to_string());
        data["generator"] = serde_json::json!({
            "command": generator.command,
            "credential_env": generator.credential_env,
        });
        output.data(&data);
    } else {
        println!("Project: {}", session.project.root().display());
        match &generator.command {
            Some(command) => println!("Generator: {}", command),
            None => println!("Generator: not configured"),
        }
        println!();
        print_summary(&session.state);
    }

    Ok(())
}
