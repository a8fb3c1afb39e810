//! Generation collaborator adapter
//!
//! The generation service itself lives outside this crate. A [`Generator`]
//! turns a kind and a [`PromptContext`] into a typed batch; the shipped
//! implementation, [`CommandGenerator`], talks to an external command over a
//! one-line JSON protocol on stdin/stdout.
//!
//! A failed generation never reaches the reconciliation engine, so the
//! workspace is left exactly as it was.

mod batch;
mod process;
mod protocol;
mod session;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ArtifactKind, GeneratedBatch, WorkspaceState};

pub use batch::{parse_batch_file, parse_batch_value, parse_items, BatchFile};
pub use process::CommandGenerator;
pub use protocol::{GenerateRequest, GenerateResponse};
pub use session::{run_generation, GenerationOutcome, GenerationTicket, GenerationTracker};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerationError {
    #[error("Missing credential: set the {0} environment variable")]
    MissingCredential(String),

    #[error("No generator configured. Set [generator] command in .scaffold/config.toml")]
    NotConfigured,

    #[error("Generation request failed: {0}")]
    Request(String),

    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),

    #[error("A {0} generation is already in progress")]
    Busy(ArtifactKind),
}

/// What the generator is told about the workspace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptContext {
    /// Free-form instructions from the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    #[serde(default)]
    pub target_framework: String,

    /// Known schema names
    #[serde(default)]
    pub schemas: Vec<String>,

    /// Natural keys already present for the requested kind
    #[serde(default)]
    pub existing: Vec<String>,

    /// `"<METHOD> <path>"` of every endpoint
    #[serde(default)]
    pub endpoints: Vec<String>,
}

impl PromptContext {
    /// Summarises a workspace for a generation request of `kind`
    pub fn from_workspace(state: &WorkspaceState, kind: ArtifactKind, prompt: Option<&str>) -> Self {
        let existing = match state.sources(kind) {
            Some(artifacts) => artifacts.iter().map(|a| a.natural_key.clone()).collect(),
            None => state.endpoints().map(|e| e.natural_key.clone()).collect(),
        };

        Self {
            prompt: prompt.map(str::to_string),
            target_framework: state.preferences.target_framework.clone(),
            schemas: state.schemas.iter().map(|s| s.natural_key.clone()).collect(),
            existing,
            endpoints: state.endpoints().map(|e| e.natural_key.clone()).collect(),
        }
    }
}

/// Produces a fresh batch of artifacts of one kind
pub trait Generator {
    fn generate(
        &self,
        kind: ArtifactKind,
        context: &PromptContext,
    ) -> Result<GeneratedBatch, GenerationError>;
}
