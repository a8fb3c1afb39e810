//! JSON storage for workspaces
//!
//! Each workspace is stored in `.scaffold/workspaces/{id}.json` as one
//! pretty-printed document. Writes replace the whole file atomically under
//! an exclusive lock, so a persisted workspace is never half-written.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use super::project::{validate_workspace_id, SCAFFOLD_DIR};
use crate::domain::WorkspaceState;

/// Durable storage keyed by workspace id
pub trait WorkspacePersistence {
    /// Returns `None` when no workspace with this id was ever saved
    fn load_workspace(&self, id: &str) -> Result<Option<WorkspaceState>>;

    fn save_workspace(&self, id: &str, state: &WorkspaceState) -> Result<()>;
}

/// Store for workspace documents
#[derive(Debug, Clone)]
pub struct WorkspaceStore {
    dir: PathBuf,
}

impl WorkspaceStore {
    /// Creates a store rooted at the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(SCAFFOLD_DIR).join("workspaces"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    pub fn exists(&self, id: &str) -> bool {
        self.path_for(id).is_file()
    }

    /// Reads a workspace
    pub fn load(&self, id: &str) -> Result<Option<WorkspaceState>> {
        validate_workspace_id(id)?;
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(&path)
            .with_context(|| format!("Failed to open workspace: {}", path.display()))?;

        file.lock_shared()
            .context("Failed to acquire read lock on workspace")?;

        let mut state: WorkspaceState = serde_json::from_reader(BufReader::new(&file))
            .with_context(|| format!("Failed to parse workspace: {}", path.display()))?;

        if state.id != id {
            log::warn!(
                "Workspace file {} names itself '{}'; using '{}'",
                path.display(),
                state.id,
                id
            );
            state.id = id.to_string();
        }
        state.ensure_default_collection();

        Ok(Some(state))
    }

    /// Writes a workspace (full rewrite)
    pub fn save(&self, state: &WorkspaceState) -> Result<()> {
        validate_workspace_id(&state.id)?;
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;

        let path = self.path_for(&state.id);
        let temp_path = path.with_extension("json.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            file.lock_exclusive()
                .context("Failed to acquire write lock on workspace")?;

            let mut writer = BufWriter::new(&file);
            serde_json::to_writer_pretty(&mut writer, state)
                .context("Failed to serialize workspace")?;
            writeln!(writer).context("Failed to write workspace")?;
            writer.flush().context("Failed to flush workspace")?;
        }

        fs::rename(&temp_path, &path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                path.display()
            )
        })?;

        log::debug!("Saved workspace '{}' to {}", state.id, path.display());
        Ok(())
    }

    /// Ids of all stored workspaces, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read directory: {}", self.dir.display()))?;

        let mut ids: Vec<String> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .filter(|id| validate_workspace_id(id).is_ok())
            .collect();
        ids.sort();

        Ok(ids)
    }
}

impl WorkspacePersistence for WorkspaceStore {
    fn load_workspace(&self, id: &str) -> Result<Option<WorkspaceState>> {
        self.load(id)
    }

    fn save_workspace(&self, id: &str, state: &WorkspaceState) -> Result<()> {
        if state.id != id {
            let mut renamed = state.clone();
            renamed.id = id.to_string();
            return self.save(&renamed);
        }
        self.save(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArtifactKind, BatchItem, GeneratedBatch};
    use tempfile::TempDir;

    fn populated(id: &str) -> WorkspaceState {
        let mut state = WorkspaceState::new(id);
        state
            .reconcile(
                ArtifactKind::Schema,
                GeneratedBatch::Sources {
                    kind: ArtifactKind::Schema,
                    items: vec![BatchItem::new("User", "const User = {};".to_string())],
                },
            )
            .unwrap();
        state.commit(ArtifactKind::Schema, Some("first"));
        state
    }

    #[test]
    fn load_missing_workspace() {
        let dir = TempDir::new().unwrap();
        let store = WorkspaceStore::new(dir.path());

        assert!(store.load("nothing").unwrap().is_none());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = WorkspaceStore::new(dir.path());
        let state = populated("shop");

        store.save(&state).unwrap();

        assert_eq!(store.load("shop").unwrap(), Some(state));
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = WorkspaceStore::new(dir.path().join("nested").join("workspaces"));

        store.save(&WorkspaceState::new("a")).unwrap();

        assert!(store.exists("a"));
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = WorkspaceStore::new(dir.path());

        store.save(&populated("shop")).unwrap();

        assert!(!store.path_for("shop").with_extension("json.tmp").exists());
    }

    #[test]
    fn list_returns_sorted_ids() {
        let dir = TempDir::new().unwrap();
        let store = WorkspaceStore::new(dir.path());
        store.save(&WorkspaceState::new("zeta")).unwrap();
        store.save(&WorkspaceState::new("alpha")).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(store.list().unwrap(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = WorkspaceStore::new(dir.path());
        fs::write(store.path_for("broken"), "{not json").unwrap();

        assert!(store.load("broken").is_err());
    }

    #[test]
    fn rejects_unsafe_ids() {
        let dir = TempDir::new().unwrap();
        let store = WorkspaceStore::new(dir.path());

        assert!(store.load("../etc").is_err());
        assert!(store.save(&WorkspaceState::new("a/b")).is_err());
    }

    #[test]
    fn persistence_trait_saves_under_requested_id() {
        let dir = TempDir::new().unwrap();
        let store = WorkspaceStore::new(dir.path());

        store.save_workspace("copy", &populated("original")).unwrap();
        let loaded = store.load_workspace("copy").unwrap().unwrap();

        assert_eq!(loaded.id, "copy");
        assert_eq!(loaded.schemas.len(), 1);
    }
}
