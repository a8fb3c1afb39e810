//! Inbox watcher
//!
//! Batch files dropped into `.scaffold/inbox/` are reconciled into the
//! active workspace in file-name order. Each file is then moved to
//! `inbox/processed/` or, when it cannot be applied, `inbox/failed/`.
//! Saves are debounced so a burst of files produces one write.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use serde::Serialize;

use super::generate::print_report;
use super::output::Output;
use super::session::Session;
use crate::domain::{current_timestamp, ArtifactKind, ReconcileReport, WorkspaceState};
use crate::generator::parse_batch_file;
use crate::storage::{DebouncedSaver, SaveStatus, WorkspaceStore};

/// How long the loop sleeps when no save is pending
const IDLE_TICK: Duration = Duration::from_secs(1);

/// Filesystem events are coalesced over this window before the inbox is scanned
const EVENT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Result of applying one inbox file
#[derive(Debug, Serialize)]
pub struct InboxResult {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ArtifactKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReconcileReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when the file could not be moved out of the inbox
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_error: Option<String>,
}

impl InboxResult {
    fn changed(&self) -> bool {
        self.report.as_ref().is_some_and(|r| !r.is_noop())
    }
}

/// Batch files waiting in the inbox, sorted by name
fn pending_files(inbox: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(inbox)
        .with_context(|| format!("Failed to read inbox: {}", inbox.display()))?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    files.sort();
    Ok(files)
}

/// Moves a handled file into `inbox/<folder>/`, prefixed with a timestamp
fn archive(path: &Path, folder: &str) -> Result<()> {
    let (Some(inbox), Some(name)) = (path.parent(), path.file_name()) else {
        return Ok(());
    };
    let dir = inbox.join(folder);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let target = dir.join(format!("{}-{}", current_timestamp(), name.to_string_lossy()));
    fs::rename(path, &target)
        .with_context(|| format!("Failed to move {} to {}", path.display(), target.display()))
}

/// Archives `path`, reporting a failure instead of propagating it
///
/// Earlier files in the same pass are already applied to the state, so a
/// failed move must not abort the pass before the caller can save.
fn try_archive(path: &Path, folder: &str) -> Option<String> {
    archive(path, folder).err().map(|e| {
        log::warn!("Could not archive {}: {:#}", path.display(), e);
        format!("{:#}", e)
    })
}

fn apply_file(path: &Path, state: &mut WorkspaceState) -> Result<(ArtifactKind, ReconcileReport)> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file: {}", path.display()))?;
    let batch = parse_batch_file(&text)?;
    let kind = batch.kind();
    let report = state.reconcile(kind, batch)?;
    Ok((kind, report))
}

/// Applies every pending inbox file to `state`
pub fn process_inbox(inbox: &Path, state: &mut WorkspaceState) -> Result<Vec<InboxResult>> {
    let mut results = Vec::new();

    for path in pending_files(inbox)? {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match apply_file(&path, state) {
            Ok((kind, report)) => {
                log::info!(
                    "Applied {}: {} created, {} updated, {} dropped",
                    file,
                    report.created.len(),
                    report.updated.len(),
                    report.dropped.len()
                );
                let archive_error = try_archive(&path, "processed");
                results.push(InboxResult {
                    file,
                    kind: Some(kind),
                    report: Some(report),
                    error: None,
                    archive_error,
                });
            }
            Err(e) => {
                log::warn!("Rejected {}: {:#}", file, e);
                let archive_error = try_archive(&path, "failed");
                results.push(InboxResult {
                    file,
                    kind: None,
                    report: None,
                    error: Some(format!("{:#}", e)),
                    archive_error,
                });
            }
        }
    }

    Ok(results)
}

fn print_results(output: &Output, results: &[InboxResult]) {
    for result in results {
        match (&result.kind, &result.report, &result.error) {
            (Some(kind), Some(report), _) => {
                if !output.is_json() {
                    println!("{}:", result.file);
                }
                print_report(output, *kind, report);
            }
            (_, _, Some(error)) => {
                if output.is_json() {
                    output.data(result);
                } else {
                    println!("{}: rejected: {}", result.file, error);
                }
            }
            _ => {}
        }
        if let Some(error) = &result.archive_error {
            output.error(&format!("{}: left in inbox: {}", result.file, error));
        }
    }
}

/// Processes the inbox once, or keeps watching it
pub fn run(output: &Output, workspace: Option<&str>, once: bool) -> Result<()> {
    let mut session = Session::open(output, workspace)?;
    let inbox = session.project.inbox_dir();
    fs::create_dir_all(&inbox)
        .with_context(|| format!("Failed to create inbox: {}", inbox.display()))?;

    if once {
        let results = process_inbox(&inbox, &mut session.state)?;
        if results.iter().any(InboxResult::changed) {
            session.save()?;
        }

        if output.is_json() {
            output.data(&results);
        } else if results.is_empty() {
            println!("Inbox is empty");
        } else {
            print_results(output, &results);
        }
        return Ok(());
    }

    watch_loop(output, session, &inbox)
}

fn watch_loop(output: &Output, session: Session, inbox: &Path) -> Result<()> {
    let Session { project, mut state } = session;
    let quiet = project.config().project.persistence.debounce();
    let mut saver = DebouncedSaver::new(project.workspace_store(), quiet);

    let (tx, rx) = mpsc::channel();
    let mut debouncer = new_debouncer(EVENT_DEBOUNCE, tx)?;
    debouncer
        .watcher()
        .watch(inbox, RecursiveMode::NonRecursive)?;

    if !output.is_json() {
        println!(
            "Watching {} for workspace '{}' (Ctrl-C to stop)",
            inbox.display(),
            state.id
        );
    }

    // Files dropped before the watcher started
    let mut outcome = drain_inbox(output, inbox, &mut state, &mut saver);

    while outcome.is_ok() {
        let timeout = saver
            .scheduler()
            .remaining(Instant::now())
            .unwrap_or(IDLE_TICK);

        match rx.recv_timeout(timeout) {
            Ok(Ok(events)) => {
                let relevant = events
                    .iter()
                    .any(|e| e.path.extension().and_then(|x| x.to_str()) == Some("json"));
                if !relevant {
                    continue;
                }

                outcome = drain_inbox(output, inbox, &mut state, &mut saver);
                if outcome.is_err() {
                    break;
                }
            }
            Ok(Err(error)) => {
                log::warn!("Watch error: {:?}", error);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("Watcher channel closed");
                break;
            }
        }

        match saver.poll(&state) {
            SaveStatus::Saved => output.verbose_ctx("watch", "Workspace saved"),
            SaveStatus::Failed => output.error(&format!(
                "Saving workspace '{}' failed ({} attempt(s)); will retry",
                state.id,
                saver.failures()
            )),
            SaveStatus::Idle | SaveStatus::Waiting => {}
        }
    }

    // Changes applied before an error still reach disk
    if saver.flush(&state) == SaveStatus::Failed {
        anyhow::bail!("Failed to save workspace '{}'", state.id);
    }
    outcome
}

fn drain_inbox(
    output: &Output,
    inbox: &Path,
    state: &mut WorkspaceState,
    saver: &mut DebouncedSaver<WorkspaceStore>,
) -> Result<()> {
    let results = process_inbox(inbox, state)?;
    if results.iter().any(InboxResult::changed) {
        saver.changed();
    }
    print_results(output, &results);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn processes_files_in_name_order() {
        let dir = TempDir::new().unwrap();
        let inbox = dir.path();
        write(
            inbox,
            "02-second.json",
            r#"{"kind": "schema", "items": [{"name": "User", "content": "v2"}]}"#,
        );
        write(
            inbox,
            "01-first.json",
            r#"{"kind": "schema", "items": [{"name": "User", "content": "v1"}]}"#,
        );
        let mut state = WorkspaceState::new("demo");

        let results = process_inbox(inbox, &mut state).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].file, "01-first.json");
        assert_eq!(state.schemas.len(), 1);
        assert_eq!(state.schemas[0].content, "v2");
        assert!(pending_files(inbox).unwrap().is_empty());
        assert_eq!(fs::read_dir(inbox.join("processed")).unwrap().count(), 2);
    }

    #[test]
    fn bad_file_is_moved_to_failed() {
        let dir = TempDir::new().unwrap();
        let inbox = dir.path();
        write(inbox, "broken.json", "{ not json");
        write(inbox, "notes.txt", "ignored");
        let mut state = WorkspaceState::new("demo");

        let results = process_inbox(inbox, &mut state).unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].error.is_some());
        assert!(!results[0].changed());
        assert_eq!(fs::read_dir(inbox.join("failed")).unwrap().count(), 1);
        assert!(inbox.join("notes.txt").exists());
    }

    #[test]
    fn unarchivable_file_keeps_earlier_changes() {
        let dir = TempDir::new().unwrap();
        let inbox = dir.path();
        write(
            inbox,
            "01-good.json",
            r#"{"kind": "schema", "items": [{"name": "User", "content": "v1"}]}"#,
        );
        write(inbox, "02-bad.json", "{ not json");
        // A plain file where the failed/ folder should go
        write(inbox, "failed", "");
        let mut state = WorkspaceState::new("demo");

        let results = process_inbox(inbox, &mut state).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(state.schemas.len(), 1);
        assert!(results[0].changed());
        assert!(results[0].archive_error.is_none());
        assert!(results[1].error.is_some());
        assert!(results[1].archive_error.is_some());
        assert!(inbox.join("02-bad.json").exists());
        assert_eq!(fs::read_dir(inbox.join("processed")).unwrap().count(), 1);
    }

    #[test]
    fn empty_inbox_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut state = WorkspaceState::new("demo");
        let before = state.clone();

        let results = process_inbox(dir.path(), &mut state).unwrap();

        assert!(results.is_empty());
        assert_eq!(state, before);
    }
}
