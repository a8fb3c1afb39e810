//! Textual conventions shared by derivation and graph extraction
//!
//! Generated code is never parsed. Every cross-artifact relationship is
//! recovered from these patterns, so changing an import or export convention
//! here changes both what derivation writes and what the graph can see.
//! Bump [`PATTERN_VERSION`] when a convention changes.

use std::sync::LazyLock;

use regex::Regex;

use super::artifact::HttpMethod;

pub const PATTERN_VERSION: u32 = 1;

/// Directory segment schemas are imported from
pub const MODELS_DIR: &str = "models";

/// Directory segment handler groups are imported from
pub const CONTROLLERS_DIR: &str = "controllers";

/// `from '../models/User'` or `require('../models/User.js')`
static MODEL_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:from\s+|require\(\s*)['"]\.\./models/([A-Za-z_$][\w$]*)(?:\.js)?['"]"#)
        .expect("model import pattern is valid")
});

/// `from '../controllers/userController'`
static CONTROLLER_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:from\s+|require\(\s*)['"]\.\./controllers/([A-Za-z_$][\w$]*)(?:\.js)?['"]"#,
    )
    .expect("controller import pattern is valid")
});

/// `get('/api/users', ...)`, usually as `router.get(...)`
static ROUTE_REGISTRATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(get|post|put|patch|delete)\(\s*['"]([^'"]+)['"]\s*,"#)
        .expect("route registration pattern is valid")
});

/// `export const listUsers`, `export async function listUsers`, `exports.listUsers =`
static EXPORTED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)(?:^|\s)(?:export\s+(?:const|let|var|function|async\s+function)\s+([A-Za-z_$][\w$]*)|exports\.([A-Za-z_$][\w$]*)\s*=)",
    )
    .expect("exported name pattern is valid")
});

/// Schema names imported by `source`, in order of appearance
pub fn model_imports(source: &str) -> Vec<String> {
    MODEL_IMPORT
        .captures_iter(source)
        .map(|c| c[1].to_string())
        .collect()
}

/// Handler-group names imported by `source`, in order of appearance
pub fn controller_imports(source: &str) -> Vec<String> {
    CONTROLLER_IMPORT
        .captures_iter(source)
        .map(|c| c[1].to_string())
        .collect()
}

/// `(verb, path)` of every route registration in `source`
pub fn route_registrations(source: &str) -> Vec<(HttpMethod, String)> {
    ROUTE_REGISTRATION
        .captures_iter(source)
        .filter_map(|c| {
            let method = c[1].parse::<HttpMethod>().ok()?;
            Some((method, c[2].to_string()))
        })
        .collect()
}

/// Names exported by `source`, in order of appearance
pub fn exported_names(source: &str) -> Vec<String> {
    EXPORTED_NAME
        .captures_iter(source)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// True if `line` is a model import statement
pub fn is_model_import_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    (trimmed.starts_with("import ") || trimmed.starts_with("const "))
        && MODEL_IMPORT.is_match(trimmed)
}

/// The import statement derivation writes for a schema
pub fn model_import_statement(schema: &str) -> String {
    format!("import {schema} from '../{MODELS_DIR}/{schema}.js';")
}

/// The import statement derivation writes for a handler group
pub fn controller_import_statement(controller: &str) -> String {
    format!("import * as {controller} from '../{CONTROLLERS_DIR}/{controller}.js';")
}

/// A route registration as derivation writes it
pub fn route_statement(method: HttpMethod, path: &str, controller: &str, handler: &str) -> String {
    format!(
        "router.{}('{}', {}.{});",
        method.as_lower(),
        path,
        controller,
        handler
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_esm_and_commonjs_model_imports() {
        let source = r#"
import User from '../models/User.js';
const Post = require('../models/Post');
import express from 'express';
"#;
        assert_eq!(model_imports(source), vec!["User", "Post"]);
    }

    #[test]
    fn finds_controller_import() {
        let source = "import * as userController from '../controllers/userController.js';";
        assert_eq!(controller_imports(source), vec!["userController"]);
    }

    #[test]
    fn finds_route_registrations() {
        let source = r#"
router.get('/api/users', userController.listUsers);
router.post("/api/users", userController.createUser);
router.head('/api/users', nothing);
"#;
        assert_eq!(
            route_registrations(source),
            vec![
                (HttpMethod::Get, "/api/users".to_string()),
                (HttpMethod::Post, "/api/users".to_string()),
            ]
        );
    }

    #[test]
    fn finds_exported_names() {
        let source = r#"
export const listUsers = async (req, res) => {};
export async function getUser(req, res) {}
exports.deleteUser = (req, res) => {};
const helper = () => {};
"#;
        assert_eq!(
            exported_names(source),
            vec!["listUsers", "getUser", "deleteUser"]
        );
    }

    #[test]
    fn generated_statements_match_their_patterns() {
        assert_eq!(model_imports(&model_import_statement("Category")), vec!["Category"]);
        assert_eq!(
            controller_imports(&controller_import_statement("categoryController")),
            vec!["categoryController"]
        );
        assert_eq!(
            route_registrations(&route_statement(
                HttpMethod::Delete,
                "/api/categories/:id",
                "categoryController",
                "deleteCategory"
            )),
            vec![(HttpMethod::Delete, "/api/categories/:id".to_string())]
        );
    }

    #[test]
    fn import_line_detection() {
        assert!(is_model_import_line("import User from '../models/User.js';"));
        assert!(is_model_import_line("  const User = require('../models/User');"));
        assert!(!is_model_import_line("// see ../models/User"));
    }
}
