//! Parsing of raw generated items into typed batches
//!
//! Source kinds expect `{"name": ..., "content": ...}` items. Endpoints
//! expect `{"name", "method", "path", "description", "handler", ...}`; their
//! natural key is derived from verb and path, never taken from the item.

use serde::Deserialize;
use serde_json::Value;

use super::GenerationError;
use crate::domain::{ArtifactKind, BatchItem, EndpointSpec, GeneratedBatch, HttpMethod};

#[derive(Debug, Deserialize)]
struct RawSource {
    name: String,
    #[serde(alias = "code")]
    content: String,
}

#[derive(Debug, Deserialize)]
struct RawEndpoint {
    name: String,
    method: String,
    path: String,
    #[serde(default)]
    description: String,
    #[serde(default, alias = "requestExample")]
    request_example: Option<Value>,
    #[serde(default, alias = "responseExample")]
    response_example: Option<Value>,
    #[serde(default, alias = "code")]
    handler: String,
}

/// A batch file as dropped into the inbox
#[derive(Debug, Clone, Deserialize)]
pub struct BatchFile {
    pub kind: ArtifactKind,
    pub items: Vec<Value>,
}

fn malformed(index: usize, message: impl std::fmt::Display) -> GenerationError {
    GenerationError::MalformedResponse(format!("item {}: {}", index, message))
}

fn parse_source(index: usize, value: Value) -> Result<BatchItem<String>, GenerationError> {
    let raw: RawSource = serde_json::from_value(value).map_err(|e| malformed(index, e))?;
    let name = raw.name.trim();
    if name.is_empty() {
        return Err(malformed(index, "empty name"));
    }
    Ok(BatchItem::new(name, raw.content))
}

fn parse_endpoint(index: usize, value: Value) -> Result<BatchItem<EndpointSpec>, GenerationError> {
    let raw: RawEndpoint = serde_json::from_value(value).map_err(|e| malformed(index, e))?;
    let method: HttpMethod = raw.method.parse().map_err(|e| malformed(index, e))?;
    let path = raw.path.trim();
    if !path.starts_with('/') {
        return Err(malformed(index, format!("path '{}' must start with '/'", path)));
    }

    let spec = EndpointSpec {
        name: raw.name,
        method,
        path: path.to_string(),
        description: raw.description,
        request_example: raw.request_example,
        response_example: raw.response_example,
        handler: raw.handler,
    };
    Ok(BatchItem::endpoint(spec))
}

/// Parses raw items for `kind`; any bad item rejects the whole batch
pub fn parse_items(kind: ArtifactKind, items: Vec<Value>) -> Result<GeneratedBatch, GenerationError> {
    if kind == ArtifactKind::Endpoint {
        let items = items
            .into_iter()
            .enumerate()
            .map(|(i, v)| parse_endpoint(i, v))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(GeneratedBatch::Endpoints(items));
    }

    let items = items
        .into_iter()
        .enumerate()
        .map(|(i, v)| parse_source(i, v))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(GeneratedBatch::Sources { kind, items })
}

/// Parses either a bare item array or a `{kind, items}` object for `kind`
pub fn parse_batch_value(kind: ArtifactKind, value: Value) -> Result<GeneratedBatch, GenerationError> {
    match value {
        Value::Array(items) => parse_items(kind, items),
        Value::Object(_) => {
            let file: BatchFile = serde_json::from_value(value)
                .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
            if file.kind != kind {
                return Err(GenerationError::MalformedResponse(format!(
                    "batch holds {} items, expected {}",
                    file.kind, kind
                )));
            }
            parse_items(kind, file.items)
        }
        _ => Err(GenerationError::MalformedResponse(
            "expected an array of items or a {kind, items} object".to_string(),
        )),
    }
}

/// Parses a self-describing `{kind, items}` batch file
pub fn parse_batch_file(text: &str) -> Result<GeneratedBatch, GenerationError> {
    let file: BatchFile =
        serde_json::from_str(text).map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
    parse_items(file.kind, file.items)
}
