//! Artifact domain model
//!
//! An artifact is one versioned generated unit: a schema, a handler group,
//! a router, a piece of middleware or an endpoint definition. Every kind
//! shares the same shape (`id`, `natural_key`, `content`, `history`) and is
//! specialised only through its content type.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::history::History;
use super::id::ArtifactId;

/// The kind of a generated artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Schema,
    HandlerGroup,
    Router,
    Middleware,
    Endpoint,
}

impl ArtifactKind {
    /// Returns all kinds in layout order
    pub fn all() -> &'static [ArtifactKind] {
        &[
            ArtifactKind::Schema,
            ArtifactKind::HandlerGroup,
            ArtifactKind::Router,
            ArtifactKind::Endpoint,
            ArtifactKind::Middleware,
        ]
    }

    /// Single-letter prefix used in artifact IDs
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ArtifactKind::Schema => "s",
            ArtifactKind::HandlerGroup => "h",
            ArtifactKind::Router => "r",
            ArtifactKind::Middleware => "m",
            ArtifactKind::Endpoint => "e",
        }
    }

    /// Plural label for listings
    pub fn plural(&self) -> &'static str {
        match self {
            ArtifactKind::Schema => "schemas",
            ArtifactKind::HandlerGroup => "handler groups",
            ArtifactKind::Router => "routers",
            ArtifactKind::Middleware => "middleware",
            ArtifactKind::Endpoint => "endpoints",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Schema => write!(f, "schema"),
            ArtifactKind::HandlerGroup => write!(f, "handler_group"),
            ArtifactKind::Router => write!(f, "router"),
            ArtifactKind::Middleware => write!(f, "middleware"),
            ArtifactKind::Endpoint => write!(f, "endpoint"),
        }
    }
}

impl std::str::FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "schema" | "schemas" | "model" | "models" => Ok(ArtifactKind::Schema),
            "handler_group" | "handler-group" | "handler" | "handlers" | "controller"
            | "controllers" => Ok(ArtifactKind::HandlerGroup),
            "router" | "routers" | "route" | "routes" => Ok(ArtifactKind::Router),
            "middleware" | "middlewares" => Ok(ArtifactKind::Middleware),
            "endpoint" | "endpoints" => Ok(ArtifactKind::Endpoint),
            _ => Err(format!("Unknown artifact kind: {}", s)),
        }
    }
}

/// HTTP verb of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Lowercase verb as used in route registrations (`router.get(...)`)
    pub fn as_lower(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_lower().to_uppercase())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "post" => Ok(HttpMethod::Post),
            "put" => Ok(HttpMethod::Put),
            "patch" => Ok(HttpMethod::Patch),
            "delete" => Ok(HttpMethod::Delete),
            _ => Err(format!("Unknown HTTP method: {}", s)),
        }
    }
}

/// Structured payload of an endpoint artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointSpec {
    /// Display name (e.g. "List users")
    pub name: String,

    pub method: HttpMethod,

    pub path: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_example: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_example: Option<serde_json::Value>,

    /// Generated handler source
    #[serde(default)]
    pub handler: String,
}

impl EndpointSpec {
    pub fn new(name: impl Into<String>, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            path: path.into(),
            description: String::new(),
            request_example: None,
            response_example: None,
            handler: String::new(),
        }
    }

    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = handler.into();
        self
    }

    /// Natural key of an endpoint: `"<METHOD> <path>"`
    pub fn natural_key(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Content an artifact can carry
///
/// Implemented once per content type; the history ledger, reconciliation
/// and commit/revert are written against this bound only.
pub trait ArtifactContent: Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned {}

impl ArtifactContent for String {}

impl ArtifactContent for EndpointSpec {}

/// A versioned generated artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "C: ArtifactContent")]
pub struct Artifact<C> {
    /// Stable identifier, assigned once at creation
    pub id: ArtifactId,

    /// Name used to match this artifact across regenerations
    pub natural_key: String,

    pub content: C,

    /// Prior snapshots, newest first
    #[serde(default)]
    pub history: History<C>,
}

impl<C: ArtifactContent> Artifact<C> {
    /// Creates a brand-new artifact with a fresh ID and empty history
    pub fn new(kind: ArtifactKind, natural_key: impl Into<String>, content: C) -> Self {
        let natural_key = natural_key.into();
        Self {
            id: ArtifactId::generate(kind, &natural_key),
            natural_key,
            content,
            history: History::new(),
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        self.id.kind()
    }

    /// Returns true if the newest snapshot equals the current content
    pub fn is_committed(&self) -> bool {
        self.history
            .latest()
            .map(|entry| entry.snapshot == self.content)
            .unwrap_or(false)
    }
}

/// A freshly generated candidate: a natural key and content, nothing else
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "C: ArtifactContent")]
pub struct BatchItem<C> {
    pub natural_key: String,
    pub content: C,
}

impl<C> BatchItem<C> {
    pub fn new(natural_key: impl Into<String>, content: C) -> Self {
        Self {
            natural_key: natural_key.into(),
            content,
        }
    }
}

impl BatchItem<EndpointSpec> {
    /// Builds an endpoint batch item keyed by verb and path
    pub fn endpoint(spec: EndpointSpec) -> Self {
        Self {
            natural_key: spec.natural_key(),
            content: spec,
        }
    }
}
