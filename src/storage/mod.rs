//! # Storage Layer
//!
//! Persistence layer for Scaffold with git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Workspaces | Pretty JSON, one file each | `.scaffold/workspaces/{id}.json` |
//! | Generated batches | JSON `{kind, items}` | `.scaffold/inbox/*.json` |
//! | Config | TOML | `.scaffold/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`WorkspaceStore`] uses file locking (`fs2`) for concurrent access
//! - All writes are atomic (temp file + rename)
//! - [`DebouncedSaver`] coalesces bursts of changes into one write
//!
//! ## Project Structure
//!
//! ```text
//! .scaffold/
//! ├── workspaces/
//! │   └── default.json      # One document per workspace
//! ├── inbox/                # Batches picked up by `scaffold watch`
//! ├── config.toml           # Project configuration
//! └── .gitignore
//! ```

mod config;
mod debounce;
mod project;
mod workspace_store;

pub use config::{
    Config, ConfigError, GeneratorConfig, GlobalConfig, OutputFormat, PersistenceConfig,
    ProjectConfig,
};
pub use debounce::{DebouncedSaver, SaveScheduler, SaveStatus};
pub use project::{validate_workspace_id, Project, ProjectError, SCAFFOLD_DIR};
pub use workspace_store::{WorkspacePersistence, WorkspaceStore};
