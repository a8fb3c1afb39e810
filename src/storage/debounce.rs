//! Debounced workspace persistence
//!
//! Every state-affecting change pushes the save deadline out by the quiet
//! interval, so a burst of edits results in a single write. A failed write
//! is logged and retried after another quiet interval; the in-memory
//! workspace stays authoritative meanwhile.

use std::time::{Duration, Instant};

use super::workspace_store::WorkspacePersistence;
use crate::domain::WorkspaceState;

/// Debounce clock for pending saves
#[derive(Debug, Clone)]
pub struct SaveScheduler {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl SaveScheduler {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Records a change at `now`, replacing any earlier deadline
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.map(|d| now >= d).unwrap_or(false)
    }

    /// Time left until the pending save, if any
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    pub fn clear(&mut self) {
        self.deadline = None;
    }

    fn quiet(&self) -> Duration {
        self.quiet
    }
}

/// Result of one [`DebouncedSaver::poll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// Nothing pending
    Idle,
    /// A save is pending but the quiet interval has not elapsed
    Waiting,
    Saved,
    /// The write failed and was rescheduled
    Failed,
}

/// Couples a [`SaveScheduler`] with a persistence backend
pub struct DebouncedSaver<P> {
    persistence: P,
    scheduler: SaveScheduler,
    failures: usize,
}

impl<P: WorkspacePersistence> DebouncedSaver<P> {
    pub fn new(persistence: P, quiet: Duration) -> Self {
        Self {
            persistence,
            scheduler: SaveScheduler::new(quiet),
            failures: 0,
        }
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn scheduler(&self) -> &SaveScheduler {
        &self.scheduler
    }

    /// Consecutive failed writes since the last success
    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn changed(&mut self) {
        self.changed_at(Instant::now());
    }

    pub fn changed_at(&mut self, now: Instant) {
        self.scheduler.schedule(now);
    }

    pub fn poll(&mut self, state: &WorkspaceState) -> SaveStatus {
        self.poll_at(state, Instant::now())
    }

    /// Saves `state` if the quiet interval has elapsed
    pub fn poll_at(&mut self, state: &WorkspaceState, now: Instant) -> SaveStatus {
        if !self.scheduler.is_pending() {
            return SaveStatus::Idle;
        }
        if !self.scheduler.is_due(now) {
            return SaveStatus::Waiting;
        }
        self.write(state, now)
    }

    /// Writes any pending change immediately
    pub fn flush(&mut self, state: &WorkspaceState) -> SaveStatus {
        if !self.scheduler.is_pending() {
            return SaveStatus::Idle;
        }
        self.write(state, Instant::now())
    }

    fn write(&mut self, state: &WorkspaceState, now: Instant) -> SaveStatus {
        match self.persistence.save_workspace(&state.id, state) {
            Ok(()) => {
                self.scheduler.clear();
                self.failures = 0;
                log::debug!("Persisted workspace '{}'", state.id);
                SaveStatus::Saved
            }
            Err(e) => {
                self.failures += 1;
                self.scheduler.schedule(now);
                log::warn!(
                    "Failed to persist workspace '{}' (attempt {}), retrying in {:?}: {:#}",
                    state.id,
                    self.failures,
                    self.scheduler.quiet(),
                    e
                );
                SaveStatus::Failed
            }
        }
    }
}
