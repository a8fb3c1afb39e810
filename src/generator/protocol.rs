//! Generator protocol types
//!
//! One JSON request line is written to the generator's stdin and one JSON
//! response line is read back from its stdout.

use serde::{Deserialize, Serialize};

use super::PromptContext;
use crate::domain::ArtifactKind;

/// A message sent to the generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Always `"generate"`
    pub operation: String,

    pub kind: ArtifactKind,

    pub context: PromptContext,
}

impl GenerateRequest {
    pub fn new(kind: ArtifactKind, context: PromptContext) -> Self {
        Self {
            operation: "generate".to_string(),
            kind,
            context,
        }
    }
}

/// A response from the generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub success: bool,

    /// Raw batch items (if success)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<serde_json::Value>,

    /// Error message (if failure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateResponse {
    pub fn success(items: Vec<serde_json::Value>) -> Self {
        Self {
            success: true,
            items,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            items: Vec::new(),
            error: Some(message.into()),
        }
    }
}
