//! Opening a project and its active workspace for one command

use anyhow::{Context, Result};

use super::output::Output;
use crate::domain::WorkspaceState;
use crate::storage::Project;

/// The project plus the workspace a command operates on
pub struct Session {
    pub project: Project,
    pub state: WorkspaceState,
}

impl Session {
    /// Opens the current project and loads the requested (or default) workspace
    pub fn open(output: &Output, workspace: Option<&str>) -> Result<Self> {
        let project = Project::open_current()?;
        let id = project.workspace_id(workspace)?;
        output.verbose_ctx("session", &format!("Loading workspace '{}'", id));

        let state = project.load_workspace(&id)?;
        Ok(Self { project, state })
    }

    /// Writes the workspace back to disk
    pub fn save(&self) -> Result<()> {
        self.project
            .workspace_store()
            .save(&self.state)
            .with_context(|| format!("Failed to save workspace '{}'", self.state.id))
    }
}
