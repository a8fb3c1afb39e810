//! Naming and grouping heuristics
//!
//! Derives stable natural keys for handler groups and routers from an
//! endpoint's path and display name, so regenerated artifacts keep matching
//! across runs even when wording drifts.
//!
//! Rules, first match wins:
//! 1. Take the first path segment after an optional `api` prefix, skipping
//!    `:param` segments.
//! 2. Lowercase and singularize it (`ies` -> `y`, trailing `s` dropped
//!    unless `ss`).
//! 3. If it equals a known schema name (case-insensitive), use that schema.
//! 4. Else if the endpoint name contains a known schema name, use that schema.
//! 5. Else fall back to [`FALLBACK_RESOURCE`].

use super::artifact::EndpointSpec;

/// Path segments starting with this marker are parameters
pub const PARAM_MARKER: char = ':';

/// Resource used when no schema can be associated
pub const FALLBACK_RESOURCE: &str = "general";

pub const CONTROLLER_SUFFIX: &str = "Controller";

pub const ROUTES_SUFFIX: &str = "Routes";

/// First meaningful path segment, e.g. `categories` for `/api/categories/:id`
pub fn resource_noun(path: &str) -> Option<&str> {
    let mut segments = path.split('/').filter(|s| !s.is_empty()).peekable();
    if segments
        .peek()
        .map(|s| s.eq_ignore_ascii_case("api"))
        .unwrap_or(false)
    {
        segments.next();
    }
    segments.find(|s| !s.starts_with(PARAM_MARKER))
}

/// Minimal singularization: `categories` -> `category`, `Users` -> `user`
///
/// The result is lowercase.
pub fn singularize(noun: &str) -> String {
    let noun = noun.to_lowercase();
    if let Some(stem) = noun.strip_suffix("ies") {
        format!("{}y", stem)
    } else if noun.ends_with('s') && !noun.ends_with("ss") {
        noun[..noun.len() - 1].to_string()
    } else {
        noun
    }
}

/// Lowercases the first character: `Category` -> `category`
pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Resource an endpoint belongs to (the handler group's base name)
pub fn resource_for_endpoint<S: AsRef<str>>(endpoint: &EndpointSpec, schemas: &[S]) -> String {
    if let Some(noun) = resource_noun(&endpoint.path) {
        let singular = singularize(noun);
        if let Some(schema) = schemas
            .iter()
            .find(|s| s.as_ref().eq_ignore_ascii_case(&singular))
        {
            return lower_first(schema.as_ref());
        }
    }

    let name = endpoint.name.to_lowercase();
    if let Some(schema) = schemas
        .iter()
        .find(|s| !s.as_ref().is_empty() && name.contains(&s.as_ref().to_lowercase()))
    {
        return lower_first(schema.as_ref());
    }

    FALLBACK_RESOURCE.to_string()
}

/// Handler-group natural key for a resource: `category` -> `categoryController`
pub fn controller_name(resource: &str) -> String {
    format!("{}{}", resource, CONTROLLER_SUFFIX)
}

/// Router natural key for a resource: `category` -> `categoryRoutes`
pub fn router_name(resource: &str) -> String {
    format!("{}{}", resource, ROUTES_SUFFIX)
}

/// Recovers the resource from a handler-group key
pub fn resource_of_controller(controller: &str) -> &str {
    controller
        .strip_suffix(CONTROLLER_SUFFIX)
        .unwrap_or(controller)
}
