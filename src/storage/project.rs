//! Project management
//!
//! Handles project initialization and provides access to stores.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{Config, WorkspaceStore};
use crate::domain::WorkspaceState;

/// Name of the per-project data directory
pub const SCAFFOLD_DIR: &str = ".scaffold";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Project already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("Not in a scaffold project. Run 'scaffold init' first.")]
    NotInProject,

    #[error("Invalid workspace id '{0}': use letters, digits, '-' and '_'")]
    InvalidWorkspaceId(String),

    #[error("Workspace not found: {0}")]
    WorkspaceNotFound(String),
}

/// Checks that a workspace id is safe to use as a file name
pub fn validate_workspace_id(id: &str) -> Result<(), ProjectError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ProjectError::InvalidWorkspaceId(id.to_string()))
    }
}

const DEFAULT_CONFIG: &str = r#"# Scaffold configuration

# Workspace used when --workspace is not given
default_workspace = "default"

# Framework label passed to the generator
target_framework = "express"

[generator]
# Executable answering generation requests (one JSON line in, one out)
# command = "scaffold-generator"
args = []
credential_env = "SCAFFOLD_API_KEY"

[persistence]
# Quiet interval before the watcher writes pending changes
debounce_ms = 1500
"#;

const GITIGNORE: &str = r#"# Temp files from interrupted writes
workspaces/*.tmp

# Processed inbox batches
inbox/processed/
inbox/failed/
"#;

/// A Scaffold project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let scaffold_dir = root.join(SCAFFOLD_DIR);

        if !scaffold_dir.is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let scaffold_dir = root.join(SCAFFOLD_DIR);

        for dir in [
            scaffold_dir.clone(),
            scaffold_dir.join("workspaces"),
            scaffold_dir.join("inbox"),
        ] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }

        let config_path = scaffold_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = scaffold_dir.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(&gitignore_path, GITIGNORE).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        let project = Self::open(root)?;

        let store = project.workspace_store();
        let default = &project.config.project.default_workspace;
        if store.load(default)?.is_none() {
            store.save(&project.new_workspace(default))?;
        }

        Ok(project)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .scaffold directory path
    pub fn scaffold_dir(&self) -> PathBuf {
        self.root.join(SCAFFOLD_DIR)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn workspace_store(&self) -> WorkspaceStore {
        WorkspaceStore::for_project(&self.root)
    }

    /// Directory watched for generated batch files
    pub fn inbox_dir(&self) -> PathBuf {
        self.scaffold_dir().join("inbox")
    }

    /// Resolves the workspace to operate on
    pub fn workspace_id(&self, requested: Option<&str>) -> Result<String, ProjectError> {
        let id = requested
            .unwrap_or(&self.config.project.default_workspace)
            .to_string();
        validate_workspace_id(&id)?;
        Ok(id)
    }

    /// A fresh workspace carrying the configured target framework
    pub fn new_workspace(&self, id: &str) -> WorkspaceState {
        WorkspaceState::new(id).with_target_framework(&self.config.project.target_framework)
    }

    /// Loads a workspace, failing if it does not exist
    pub fn load_workspace(&self, id: &str) -> Result<WorkspaceState> {
        validate_workspace_id(id)?;
        self.workspace_store()
            .load(id)?
            .ok_or_else(|| ProjectError::WorkspaceNotFound(id.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.scaffold_dir().is_dir());
        assert!(project.scaffold_dir().join("workspaces").is_dir());
        assert!(project.inbox_dir().is_dir());
        assert!(project.scaffold_dir().join("config.toml").is_file());
        assert!(project.scaffold_dir().join(".gitignore").is_file());
    }

    #[test]
    fn init_creates_default_workspace() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        let ws = project.load_workspace("default").unwrap();

        assert_eq!(ws.id, "default");
        assert_eq!(ws.preferences.target_framework, "express");
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();

        Project::init(dir.path()).unwrap();
        Project::init(dir.path()).unwrap();

        assert!(dir.path().join(SCAFFOLD_DIR).is_dir());
    }

    #[test]
    fn default_config_file_parses() {
        let config: crate::storage::ProjectConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, crate::storage::ProjectConfig::default());
    }

    #[test]
    fn open_non_project_fails() {
        let dir = TempDir::new().unwrap();
        assert!(Project::open(dir.path()).is_err());
    }

    #[test]
    fn workspace_id_resolution() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert_eq!(project.workspace_id(None).unwrap(), "default");
        assert_eq!(project.workspace_id(Some("shop_v2")).unwrap(), "shop_v2");
        assert!(project.workspace_id(Some("../escape")).is_err());
        assert!(project.workspace_id(Some("")).is_err());
    }

    #[test]
    fn missing_workspace_is_reported() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.load_workspace("ghost").is_err());
    }
}
