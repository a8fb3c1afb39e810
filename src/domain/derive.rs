//! Derivation of handler groups and routers from endpoint definitions
//!
//! Handler groups bundle the handler sources of every endpoint associated
//! with one resource, preceded by an import preamble for the schemas those
//! handlers reference. Routers are purely structural: one per handler group,
//! one route per endpoint whose handler the group exports.

use std::collections::BTreeSet;

use super::artifact::{Artifact, BatchItem, EndpointSpec};
use super::naming::{controller_name, resource_for_endpoint, resource_of_controller, router_name};
use super::patterns;

/// Name of the handler an endpoint's source exports, if any
pub fn handler_name(endpoint: &EndpointSpec) -> Option<String> {
    patterns::exported_names(&endpoint.handler).into_iter().next()
}

/// Groups endpoints by resource, in order of first appearance
fn group_by_resource<'a, S: AsRef<str>>(
    endpoints: &[&'a EndpointSpec],
    schemas: &[S],
) -> Vec<(String, Vec<&'a EndpointSpec>)> {
    let mut groups: Vec<(String, Vec<&'a EndpointSpec>)> = Vec::new();

    for &endpoint in endpoints {
        let resource = resource_for_endpoint(endpoint, schemas);
        match groups.iter_mut().find(|(r, _)| *r == resource) {
            Some((_, members)) => members.push(endpoint),
            None => groups.push((resource, vec![endpoint])),
        }
    }

    groups
}

fn render_handler_group(schemas: &BTreeSet<String>, endpoints: &[&EndpointSpec]) -> String {
    let mut sections = Vec::new();

    if !schemas.is_empty() {
        let preamble: Vec<String> = schemas
            .iter()
            .map(|s| patterns::model_import_statement(s))
            .collect();
        sections.push(preamble.join("\n"));
    }

    for endpoint in endpoints {
        let body: Vec<&str> = endpoint
            .handler
            .lines()
            .filter(|line| !patterns::is_model_import_line(line))
            .collect();
        let body = body.join("\n");
        let body = body.trim();
        if !body.is_empty() {
            sections.push(body.to_string());
        }
    }

    let mut content = sections.join("\n\n");
    content.push('\n');
    content
}

/// Builds the handler-group batch for the current endpoints and schemas
///
/// A resource with no endpoints never produces a group.
pub fn derive_handler_groups<S: AsRef<str>>(
    endpoints: &[&EndpointSpec],
    schemas: &[S],
) -> Vec<BatchItem<String>> {
    group_by_resource(endpoints, schemas)
        .into_iter()
        .map(|(resource, members)| {
            let referenced: BTreeSet<String> = members
                .iter()
                .flat_map(|e| patterns::model_imports(&e.handler))
                .collect();
            log::debug!(
                "Handler group '{}' covers {} endpoint(s), imports {:?}",
                resource,
                members.len(),
                referenced
            );
            BatchItem::new(
                controller_name(&resource),
                render_handler_group(&referenced, &members),
            )
        })
        .collect()
}

/// Builds the router batch for the given handler groups
///
/// A handler group exporting none of the endpoints' handlers yields no router.
pub fn derive_routers(
    handler_groups: &[Artifact<String>],
    endpoints: &[&EndpointSpec],
) -> Vec<BatchItem<String>> {
    handler_groups
        .iter()
        .filter_map(|group| {
            let exported: BTreeSet<String> =
                patterns::exported_names(&group.content).into_iter().collect();

            let routes: Vec<String> = endpoints
                .iter()
                .filter_map(|endpoint| {
                    let handler = handler_name(endpoint)?;
                    exported.contains(&handler).then(|| {
                        patterns::route_statement(
                            endpoint.method,
                            &endpoint.path,
                            &group.natural_key,
                            &handler,
                        )
                    })
                })
                .collect();

            if routes.is_empty() {
                log::debug!("No routes matched handler group '{}'", group.natural_key);
                return None;
            }

            let content = format!(
                "import express from 'express';\n{}\n\nconst router = express.Router();\n\n{}\n\nexport default router;\n",
                patterns::controller_import_statement(&group.natural_key),
                routes.join("\n"),
            );
            let resource = resource_of_controller(&group.natural_key);
            Some(BatchItem::new(router_name(resource), content))
        })
        .collect()
}
