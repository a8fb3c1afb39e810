//! Generation bookkeeping: busy flags and stale-result handling
//!
//! At most one request per artifact kind may be outstanding; requests for
//! other kinds proceed independently. A result is applied only if the
//! workspace it was requested for is still the active one.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use super::{GenerationError, Generator, PromptContext};
use crate::domain::{ArtifactKind, GeneratedBatch, ReconcileReport, WorkspaceState};

#[derive(Debug, Default)]
struct TrackerState {
    busy: HashSet<ArtifactKind>,
    active_workspace: Option<String>,
}

/// Tracks in-flight generations and the active workspace
#[derive(Debug, Default)]
pub struct GenerationTracker {
    state: Mutex<TrackerState>,
}

/// What happened to a finished generation
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Applied(ReconcileReport),

    /// The workspace changed while the request was in flight
    Discarded,
}

impl GenerationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes `workspace` the one results are applied to
    pub fn bind(&self, workspace: impl Into<String>) {
        self.lock().active_workspace = Some(workspace.into());
    }

    pub fn active_workspace(&self) -> Option<String> {
        self.lock().active_workspace.clone()
    }

    pub fn is_busy(&self, kind: ArtifactKind) -> bool {
        self.lock().busy.contains(&kind)
    }

    /// Marks `kind` busy for `workspace`; the flag clears when the ticket drops
    pub fn begin(&self, kind: ArtifactKind, workspace: &str) -> Result<GenerationTicket<'_>, GenerationError> {
        let mut state = self.lock();
        if !state.busy.insert(kind) {
            return Err(GenerationError::Busy(kind));
        }
        if state.active_workspace.is_none() {
            state.active_workspace = Some(workspace.to_string());
        }

        Ok(GenerationTicket {
            tracker: self,
            kind,
            workspace: workspace.to_string(),
        })
    }
}

/// An outstanding generation request
#[derive(Debug)]
pub struct GenerationTicket<'a> {
    tracker: &'a GenerationTracker,
    kind: ArtifactKind,
    workspace: String,
}

impl GenerationTicket<'_> {
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    fn is_current(&self, state: &WorkspaceState) -> bool {
        state.id == self.workspace
            && self.tracker.active_workspace().as_deref() == Some(self.workspace.as_str())
    }

    /// Applies a finished request to `state`
    ///
    /// Failures are returned untouched and never reach reconciliation.
    pub fn complete(
        self,
        result: Result<GeneratedBatch, GenerationError>,
        state: &mut WorkspaceState,
    ) -> Result<GenerationOutcome, GenerationError> {
        let batch = result?;

        if !self.is_current(state) {
            log::info!(
                "Discarding {} generated for workspace '{}'",
                self.kind.plural(),
                self.workspace
            );
            return Ok(GenerationOutcome::Discarded);
        }

        let report = state
            .reconcile(self.kind, batch)
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
        Ok(GenerationOutcome::Applied(report))
    }
}

impl Drop for GenerationTicket<'_> {
    fn drop(&mut self) {
        self.tracker.lock().busy.remove(&self.kind);
    }
}

/// Runs one generation request of `kind` against `state`
pub fn run_generation<G: Generator + ?Sized>(
    generator: &G,
    tracker: &GenerationTracker,
    state: &mut WorkspaceState,
    kind: ArtifactKind,
    prompt: Option<&str>,
) -> Result<GenerationOutcome, GenerationError> {
    let ticket = tracker.begin(kind, &state.id)?;
    let context = PromptContext::from_workspace(state, kind, prompt);
    let result = generator.generate(kind, &context);
    ticket.complete(result, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BatchItem;

    struct Fixed(Result<GeneratedBatch, GenerationError>);

    impl Generator for Fixed {
        fn generate(
            &self,
            _kind: ArtifactKind,
            _context: &PromptContext,
        ) -> Result<GeneratedBatch, GenerationError> {
            self.0.clone()
        }
    }

    fn schemas(keys: &[&str]) -> GeneratedBatch {
        GeneratedBatch::Sources {
            kind: ArtifactKind::Schema,
            items: keys
                .iter()
                .map(|k| BatchItem::new(*k, format!("schema {}", k)))
                .collect(),
        }
    }

    #[test]
    fn successful_generation_reconciles() {
        let tracker = GenerationTracker::new();
        let mut state = WorkspaceState::new("demo");

        let outcome = run_generation(
            &Fixed(Ok(schemas(&["User", "Post"]))),
            &tracker,
            &mut state,
            ArtifactKind::Schema,
            None,
        )
        .unwrap();

        let GenerationOutcome::Applied(report) = outcome else {
            panic!("expected the batch to be applied");
        };
        assert_eq!(report.created.len(), 2);
        assert_eq!(state.schemas.len(), 2);
        assert!(!tracker.is_busy(ArtifactKind::Schema));
    }

    #[test]
    fn failed_generation_leaves_workspace_untouched() {
        let tracker = GenerationTracker::new();
        let mut state = WorkspaceState::new("demo");
        run_generation(&Fixed(Ok(schemas(&["User"]))), &tracker, &mut state, ArtifactKind::Schema, None)
            .unwrap();
        let before = state.clone();

        let err = run_generation(
            &Fixed(Err(GenerationError::MalformedResponse("garbage".to_string()))),
            &tracker,
            &mut state,
            ArtifactKind::Schema,
            None,
        )
        .unwrap_err();

        assert_eq!(err, GenerationError::MalformedResponse("garbage".to_string()));
        assert_eq!(state, before);
        assert!(!tracker.is_busy(ArtifactKind::Schema));
    }

    #[test]
    fn same_kind_is_busy_other_kinds_proceed() {
        let tracker = GenerationTracker::new();

        let first = tracker.begin(ArtifactKind::Schema, "demo").unwrap();
        assert_eq!(
            tracker.begin(ArtifactKind::Schema, "demo").unwrap_err(),
            GenerationError::Busy(ArtifactKind::Schema)
        );
        let other = tracker.begin(ArtifactKind::Router, "demo").unwrap();

        assert!(tracker.is_busy(ArtifactKind::Schema));
        drop(first);
        drop(other);
        assert!(!tracker.is_busy(ArtifactKind::Schema));
        assert!(!tracker.is_busy(ArtifactKind::Router));
    }

    #[test]
    fn result_for_stale_workspace_is_discarded() {
        let tracker = GenerationTracker::new();
        tracker.bind("first");
        let mut state = WorkspaceState::new("first");

        let ticket = tracker.begin(ArtifactKind::Schema, "first").unwrap();
        tracker.bind("second");
        let outcome = ticket.complete(Ok(schemas(&["User"])), &mut state).unwrap();

        assert_eq!(outcome, GenerationOutcome::Discarded);
        assert!(state.schemas.is_empty());
        assert!(!tracker.is_busy(ArtifactKind::Schema));
    }
}
