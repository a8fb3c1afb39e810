//! Identifiers for artifacts and endpoint collections
//!
//! ID Format:
//! - Artifact IDs: `{kind-prefix}-{7-char-hash}` (e.g., `s-7f2b4c1` for a schema)
//! - Collection IDs: `c-{7-char-hash}`, with the catch-all collection fixed at `c-default`
//!
//! Kind prefixes: `s` schema, `h` handler group, `r` router, `m` middleware,
//! `e` endpoint.
//!
//! Hash is derived from the natural key, the creation timestamp and a
//! process-local sequence, so an ID is assigned once and never reassigned.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::artifact::ArtifactKind;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid artifact ID format: expected '{{s|h|r|m|e}}-{{7-char-hash}}', got '{0}'")]
    InvalidArtifactId(String),

    #[error("Invalid collection ID format: expected 'c-{{7-char-hash}}' or 'c-default', got '{0}'")]
    InvalidCollectionId(String),
}

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generates a 7-character hash from a name and timestamp
fn generate_hash(name: &str, timestamp: DateTime<Utc>) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let input = format!(
        "{}{}{}",
        name,
        timestamp.timestamp_nanos_opt().unwrap_or(0),
        seq
    );
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..7].to_string()
}

fn is_hash(s: &str) -> bool {
    s.len() == 7 && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Artifact ID in the format `{prefix}-{7-char-hash}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactId {
    kind: ArtifactKind,
    hash: String,
}

impl ArtifactId {
    /// Creates a new artifact ID for the given kind and natural key
    pub fn new(kind: ArtifactKind, natural_key: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            hash: generate_hash(natural_key, timestamp),
        }
    }

    /// Creates a new artifact ID stamped with the current time
    pub fn generate(kind: ArtifactKind, natural_key: &str) -> Self {
        Self::new(kind, natural_key, Utc::now())
    }

    /// Returns the kind encoded in the ID prefix
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Returns the hash portion of the ID
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.id_prefix(), self.hash)
    }
}

impl FromStr for ArtifactId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (prefix, hash) = s
            .split_once('-')
            .ok_or_else(|| IdError::InvalidArtifactId(s.to_string()))?;

        let kind = ArtifactKind::all()
            .iter()
            .copied()
            .find(|k| k.id_prefix() == prefix)
            .ok_or_else(|| IdError::InvalidArtifactId(s.to_string()))?;

        if !is_hash(hash) {
            return Err(IdError::InvalidArtifactId(s.to_string()));
        }

        Ok(Self {
            kind,
            hash: hash.to_string(),
        })
    }
}

impl TryFrom<String> for ArtifactId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ArtifactId> for String {
    fn from(id: ArtifactId) -> Self {
        id.to_string()
    }
}

const DEFAULT_COLLECTION: &str = "default";

/// Endpoint collection ID - `c-{hash}`, or `c-default` for the catch-all
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionId {
    hash: String,
}

impl CollectionId {
    /// Creates a new collection ID from a name and timestamp
    pub fn new(name: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            hash: generate_hash(name, timestamp),
        }
    }

    /// The fixed ID of the catch-all collection
    pub fn default_collection() -> Self {
        Self {
            hash: DEFAULT_COLLECTION.to_string(),
        }
    }

    /// Returns true if this is the catch-all collection
    pub fn is_default(&self) -> bool {
        self.hash == DEFAULT_COLLECTION
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c-{}", self.hash)
    }
}

impl FromStr for CollectionId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hash = s
            .strip_prefix("c-")
            .ok_or_else(|| IdError::InvalidCollectionId(s.to_string()))?;

        if hash != DEFAULT_COLLECTION && !is_hash(hash) {
            return Err(IdError::InvalidCollectionId(s.to_string()));
        }

        Ok(Self {
            hash: hash.to_string(),
        })
    }
}

impl TryFrom<String> for CollectionId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CollectionId> for String {
    fn from(id: CollectionId) -> Self {
        id.to_string()
    }
}
