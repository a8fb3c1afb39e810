//! Endpoint collection CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use super::session::Session;
use crate::domain::{ArtifactId, ArtifactKind, CollectionId, WorkspaceError};

#[derive(Subcommand)]
pub enum CollectionCommands {
    /// List endpoint collections
    List,

    /// Create an empty collection
    New {
        /// Collection name (unique, case-insensitive)
        name: String,
    },

    /// Rename a collection
    Rename { id: CollectionId, name: String },

    /// Delete a collection, moving its endpoints to the default collection
    Delete { id: CollectionId },

    /// Move an endpoint into another collection
    Move {
        /// Endpoint ID
        endpoint: ArtifactId,

        /// Target collection ID
        #[arg(long)]
        to: CollectionId,
    },
}

pub fn run(cmd: CollectionCommands, output: &Output, workspace: Option<&str>) -> Result<()> {
    match cmd {
        CollectionCommands::List => list(output, workspace),
        CollectionCommands::New { name } => create(output, workspace, &name),
        CollectionCommands::Rename { id, name } => rename(output, workspace, &id, &name),
        CollectionCommands::Delete { id } => delete(output, workspace, &id),
        CollectionCommands::Move { endpoint, to } => move_endpoint(output, workspace, &endpoint, &to),
    }
}

fn list(output: &Output, workspace: Option<&str>) -> Result<()> {
    let session = Session::open(output, workspace)?;
    let collections = &session.state.endpoint_collections;

    if output.is_json() {
        let items: Vec<_> = collections
            .iter()
            .map(|c| {
                serde_json::json!({
                    "id": c.id,
                    "name": c.name,
                    "default": c.is_default(),
                    "endpoints": c.endpoints.iter().map(|e| &e.id).collect::<Vec<_>>(),
                })
            })
            .collect();
        output.data(&items);
        return Ok(());
    }

    for collection in collections {
        println!(
            "{} {} ({} endpoint{})",
            collection.id,
            collection.name,
            collection.endpoints.len(),
            if collection.endpoints.len() == 1 { "" } else { "s" }
        );
        for endpoint in &collection.endpoints {
            println!("    {}  {}", endpoint.id, endpoint.natural_key);
        }
    }

    Ok(())
}

fn create(output: &Output, workspace: Option<&str>, name: &str) -> Result<()> {
    let mut session = Session::open(output, workspace)?;

    let id = session.state.create_collection(name)?;
    session.save()?;

    if output.is_json() {
        output.data(&serde_json::json!({ "id": id, "name": name.trim() }));
    } else {
        output.success(&format!("Created collection {} ({})", name.trim(), id));
    }

    Ok(())
}

fn rename(output: &Output, workspace: Option<&str>, id: &CollectionId, name: &str) -> Result<()> {
    let mut session = Session::open(output, workspace)?;

    session.state.rename_collection(id, name)?;
    session.save()?;

    if output.is_json() {
        output.data(&serde_json::json!({ "id": id, "name": name.trim() }));
    } else {
        output.success(&format!("Renamed {} to {}", id, name.trim()));
    }

    Ok(())
}

fn delete(output: &Output, workspace: Option<&str>, id: &CollectionId) -> Result<()> {
    let mut session = Session::open(output, workspace)?;

    let moved = session.state.delete_collection(id)?;
    session.save()?;

    if output.is_json() {
        output.data(&serde_json::json!({ "deleted": id, "moved": moved }));
    } else {
        output.success(&format!(
            "Deleted collection {} ({} endpoint(s) moved to the default collection)",
            id, moved
        ));
    }

    Ok(())
}

fn move_endpoint(output: &Output, workspace: Option<&str>, endpoint: &ArtifactId, to: &CollectionId) -> Result<()> {
    let mut session = Session::open(output, workspace)?;

    let from = session
        .state
        .find_endpoint(endpoint)
        .map(|(collection, _)| collection.clone())
        .ok_or_else(|| WorkspaceError::ArtifactNotFound {
            kind: ArtifactKind::Endpoint,
            id: endpoint.clone(),
        })?;

    session.state.move_endpoint(endpoint, &from, to)?;
    session.save()?;

    if output.is_json() {
        output.data(&serde_json::json!({ "endpoint": endpoint, "from": from, "to": to }));
    } else {
        output.success(&format!("Moved {} from {} to {}", endpoint, from, to));
    }

    Ok(())
}
