//! Configuration handling for Scaffold
//!
//! Configuration is stored in `.scaffold/config.toml` (project) and
//! `~/.config/scaffold/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::project::SCAFFOLD_DIR;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Settings for the external generation command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Executable that answers generation requests
    pub command: Option<String>,

    /// Extra arguments passed to the command
    pub args: Vec<String>,

    /// Environment variable that must hold the service credential
    pub credential_env: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            credential_env: "SCAFFOLD_API_KEY".to_string(),
        }
    }
}

/// Settings for debounced workspace saves
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Quiet interval before a pending change is written
    pub debounce_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self { debounce_ms: 1500 }
    }
}

impl PersistenceConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Workspace used when `--workspace` is not given
    pub default_workspace: String,

    /// Framework label copied into new workspaces and prompt contexts
    pub target_framework: String,

    pub generator: GeneratorConfig,

    pub persistence: PersistenceConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            default_workspace: "default".to_string(),
            target_framework: "express".to_string(),
            generator: GeneratorConfig::default(),
            persistence: PersistenceConfig::default(),
        }
    }
}

impl ProjectConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_workspace.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_workspace must not be empty".to_string(),
            ));
        }
        if self.generator.credential_env.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "generator.credential_env must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from default locations
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let (project, project_root) = Self::load_project()?;

        Ok(Self {
            project,
            global,
            project_root,
        })
    }

    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            global,
            project_root: Some(project_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "scaffold", "scaffold-cli")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    fn load_project() -> Result<(ProjectConfig, Option<PathBuf>)> {
        match Self::find_project_root() {
            Some(root) => {
                let config = Self::load_project_config(&root)?;
                Ok((config, Some(root)))
            }
            None => Ok((ProjectConfig::default(), None)),
        }
    }

    /// Loads and validates project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(SCAFFOLD_DIR).join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")?;
        config
            .validate()
            .with_context(|| format!("Invalid project config: {}", config_path.display()))?;

        Ok(config)
    }

    /// Finds the project root by looking for a `.scaffold/` directory
    pub fn find_project_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_root_from(&current)
    }

    /// Walks up from `start` looking for a `.scaffold/` directory
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(SCAFFOLD_DIR).is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    pub fn is_in_project(&self) -> bool {
        self.project_root.is_some()
    }

    /// Returns the project root, or an error if not in a project
    pub fn require_project_root(&self) -> Result<&Path> {
        self.project_root
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Not in a scaffold project. Run 'scaffold init' first."))
    }

    /// Saves the project configuration
    pub fn save_project(&self) -> Result<()> {
        let root = self.require_project_root()?;
        let config_path = root.join(SCAFFOLD_DIR).join("config.toml");

        let content =
            toml::to_string_pretty(&self.project).context("Failed to serialize project config")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write project config: {}", config_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config {
            project: ProjectConfig::default(),
            global: GlobalConfig::default(),
            project_root: None,
        };

        assert_eq!(config.project.default_workspace, "default");
        assert_eq!(config.project.target_framework, "express");
        assert_eq!(config.project.generator.credential_env, "SCAFFOLD_API_KEY");
        assert_eq!(config.project.persistence.debounce(), Duration::from_millis(1500));
        assert_eq!(config.global.default_format, OutputFormat::Text);
    }

    #[test]
    fn parse_project_config() {
        let toml = r#"
default_workspace = "shop"

[generator]
command = "scaffold-gen"
args = ["--model", "fast"]

[persistence]
debounce_ms = 250
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.default_workspace, "shop");
        assert_eq!(config.target_framework, "express");
        assert_eq!(config.generator.command.as_deref(), Some("scaffold-gen"));
        assert_eq!(config.generator.args, vec!["--model", "fast"]);
        assert_eq!(config.generator.credential_env, "SCAFFOLD_API_KEY");
        assert_eq!(config.persistence.debounce_ms, 250);
    }

    #[test]
    fn parse_global_config() {
        let config: GlobalConfig = toml::from_str(r#"default_format = "json""#).unwrap();
        assert_eq!(config.default_format, OutputFormat::Json);
    }

    #[test]
    fn empty_workspace_name_is_invalid() {
        let config = ProjectConfig {
            default_workspace: " ".to_string(),
            ..ProjectConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn invalid_project_file_is_reported() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(SCAFFOLD_DIR)).unwrap();
        fs::write(
            dir.path().join(SCAFFOLD_DIR).join("config.toml"),
            "default_workspace = 3",
        )
        .unwrap();

        assert!(Config::for_project(dir.path()).is_err());
    }

    #[test]
    fn find_project_root_walks_up() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(SCAFFOLD_DIR)).unwrap();
        let sub_dir = dir.path().join("sub").join("dir");
        fs::create_dir_all(&sub_dir).unwrap();

        let root = Config::find_project_root_from(&sub_dir);

        assert_eq!(root.as_deref(), Some(dir.path()));
    }

    #[test]
    fn config_not_in_project() {
        let config = Config {
            project: ProjectConfig::default(),
            global: GlobalConfig::default(),
            project_root: None,
        };

        assert!(!config.is_in_project());
        assert!(config.require_project_root().is_err());
    }
}
