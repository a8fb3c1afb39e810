//! Artifact CLI commands: inspection, commit points and revert

use anyhow::Result;
use chrono::{DateTime, Local};
use clap::Subcommand;
use serde::Serialize;

use super::output::Output;
use super::session::Session;
use crate::domain::{
    Artifact, ArtifactContent, ArtifactId, ArtifactKind, CollectionId, EndpointSpec,
    WorkspaceError, WorkspaceState,
};

#[derive(Subcommand)]
pub enum ArtifactCommands {
    /// List artifacts of a kind
    List {
        /// Artifact kind (schema, handler_group, router, middleware, endpoint)
        kind: ArtifactKind,
    },

    /// Show an artifact's current content
    Show { kind: ArtifactKind, id: ArtifactId },

    /// Show an artifact's history, newest first
    History { kind: ArtifactKind, id: ArtifactId },

    /// Delete an artifact
    Delete { kind: ArtifactKind, id: ArtifactId },
}

pub fn run(cmd: ArtifactCommands, output: &Output, workspace: Option<&str>) -> Result<()> {
    match cmd {
        ArtifactCommands::List { kind } => list(output, workspace, kind),
        ArtifactCommands::Show { kind, id } => show(output, workspace, kind, &id),
        ArtifactCommands::History { kind, id } => history(output, workspace, kind, &id),
        ArtifactCommands::Delete { kind, id } => delete(output, workspace, kind, &id),
    }
}

/// An artifact of either content type, as found in a workspace
enum Found<'a> {
    Source(&'a Artifact<String>),
    Endpoint(&'a CollectionId, &'a Artifact<EndpointSpec>),
}

fn find<'a>(
    state: &'a WorkspaceState,
    kind: ArtifactKind,
    id: &ArtifactId,
) -> Result<Found<'a>, WorkspaceError> {
    let not_found = || WorkspaceError::ArtifactNotFound {
        kind,
        id: id.clone(),
    };

    if kind == ArtifactKind::Endpoint {
        let (collection, endpoint) = state.find_endpoint(id).ok_or_else(not_found)?;
        Ok(Found::Endpoint(collection, endpoint))
    } else {
        state
            .find_source(kind, id)
            .map(Found::Source)
            .ok_or_else(not_found)
    }
}

#[derive(Serialize)]
struct ListItem<'a> {
    id: &'a ArtifactId,
    natural_key: &'a str,
    history: usize,
    committed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    collection: Option<&'a CollectionId>,
}

fn list_item<'a, C: ArtifactContent>(
    artifact: &'a Artifact<C>,
    collection: Option<&'a CollectionId>,
) -> ListItem<'a> {
    ListItem {
        id: &artifact.id,
        natural_key: &artifact.natural_key,
        history: artifact.history.len(),
        committed: artifact.is_committed(),
        collection,
    }
}

fn list(output: &Output, workspace: Option<&str>, kind: ArtifactKind) -> Result<()> {
    let session = Session::open(output, workspace)?;
    let state = &session.state;

    let items: Vec<ListItem> = match state.sources(kind) {
        Some(artifacts) => artifacts.iter().map(|a| list_item(a, None)).collect(),
        None => state
            .endpoint_collections
            .iter()
            .flat_map(|c| c.endpoints.iter().map(move |e| list_item(e, Some(&c.id))))
            .collect(),
    };

    if output.is_json() {
        output.data(&items);
        return Ok(());
    }

    if items.is_empty() {
        println!("No {} in workspace '{}'", kind.plural(), state.id);
        return Ok(());
    }

    println!("{:<10} {:<32} {:>7}  STATE", "ID", "KEY", "HISTORY");
    println!("{}", "-".repeat(62));
    for item in &items {
        println!(
            "{:<10} {:<32} {:>7}  {}",
            item.id.to_string(),
            item.natural_key,
            item.history,
            if item.committed { "committed" } else { "uncommitted" }
        );
    }

    Ok(())
}

fn show(output: &Output, workspace: Option<&str>, kind: ArtifactKind, id: &ArtifactId) -> Result<()> {
    let session = Session::open(output, workspace)?;

    match find(&session.state, kind, id)? {
        Found::Source(artifact) => {
            if output.is_json() {
                output.data(artifact);
            } else {
                println!("{} {} ({})", kind, artifact.natural_key, artifact.id);
                println!();
                print!("{}", artifact.content);
                if !artifact.content.ends_with('\n') {
                    println!();
                }
            }
        }
        Found::Endpoint(collection, artifact) => {
            if output.is_json() {
                output.data(artifact);
            } else {
                let spec = &artifact.content;
                println!("{} {} ({})", spec.method, spec.path, artifact.id);
                println!("Name: {}", spec.name);
                if let Some(c) = session.state.collection(collection) {
                    println!("Collection: {} ({})", c.name, c.id);
                }
                if !spec.description.is_empty() {
                    println!("Description: {}", spec.description);
                }
                if let Some(example) = &spec.request_example {
                    println!("Request example: {}", example);
                }
                if let Some(example) = &spec.response_example {
                    println!("Response example: {}", example);
                }
                if !spec.handler.is_empty() {
                    println!();
                    println!("{}", spec.handler.trim_end());
                }
            }
        }
    }

    Ok(())
}

fn format_timestamp(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_history<C: ArtifactContent>(output: &Output, artifact: &Artifact<C>) {
    if output.is_json() {
        output.data(&artifact.history);
        return;
    }

    if artifact.history.is_empty() {
        println!("No history for {} ({})", artifact.natural_key, artifact.id);
        return;
    }

    println!("History of {} ({})", artifact.natural_key, artifact.id);
    println!("{:<15} {:<20} {:<11} MESSAGE", "TIMESTAMP", "WHEN", "KIND");
    for entry in artifact.history.iter() {
        println!(
            "{:<15} {:<20} {:<11} {}",
            entry.timestamp,
            format_timestamp(entry.timestamp),
            entry.kind.label(),
            entry.message.as_deref().unwrap_or("")
        );
    }
}

fn history(output: &Output, workspace: Option<&str>, kind: ArtifactKind, id: &ArtifactId) -> Result<()> {
    let session = Session::open(output, workspace)?;

    match find(&session.state, kind, id)? {
        Found::Source(artifact) => print_history(output, artifact),
        Found::Endpoint(_, artifact) => print_history(output, artifact),
    }

    Ok(())
}

fn delete(output: &Output, workspace: Option<&str>, kind: ArtifactKind, id: &ArtifactId) -> Result<()> {
    let mut session = Session::open(output, workspace)?;

    session.state.delete_artifact(kind, id)?;
    session.save()?;

    if output.is_json() {
        output.data(&serde_json::json!({ "deleted": id, "kind": kind }));
    } else {
        output.success(&format!("Deleted {} {}", kind, id));
    }

    Ok(())
}

/// Snapshots every changed artifact of a kind
pub fn commit(output: &Output, workspace: Option<&str>, kind: ArtifactKind, message: Option<&str>) -> Result<()> {
    let mut session = Session::open(output, workspace)?;

    let committed = session.state.commit(kind, message);
    output.verbose_ctx("commit", &format!("{} artifact(s) changed", committed.len()));
    if !committed.is_empty() {
        session.save()?;
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "kind": kind,
            "committed": committed,
        }));
    } else if committed.is_empty() {
        println!("Nothing to commit: all {} are committed", kind.plural());
    } else {
        output.success(&format!("Committed {} of {}", committed.len(), kind.plural()));
    }

    Ok(())
}

/// Restores one artifact to an earlier snapshot
pub fn revert(
    output: &Output,
    workspace: Option<&str>,
    kind: ArtifactKind,
    id: &ArtifactId,
    timestamp: i64,
) -> Result<()> {
    let mut session = Session::open(output, workspace)?;

    session.state.revert(kind, id, timestamp)?;
    session.save()?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "reverted": id,
            "kind": kind,
            "timestamp": timestamp,
        }));
    } else {
        output.success(&format!("Reverted {} to snapshot {}", id, timestamp));
    }

    Ok(())
}
