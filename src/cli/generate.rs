//! Reconciliation commands: batch files, the generator and derivation

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::output::Output;
use super::session::Session;
use crate::domain::{ArtifactKind, ReconcileReport};
use crate::generator::{
    parse_batch_value, run_generation, CommandGenerator, GenerationOutcome, GenerationTracker,
};

/// Prints one reconciliation report in the active format
pub(crate) fn print_report(output: &Output, kind: ArtifactKind, report: &ReconcileReport) {
    if output.is_json() {
        output.data(&serde_json::json!({
            "kind": kind,
            "status": report.status(),
            "report": report,
        }));
        return;
    }

    if report.is_noop() {
        println!("{}: no changes ({} unchanged)", kind.plural(), report.unchanged);
    } else {
        println!(
            "{}: {} created, {} updated, {} unchanged, {} dropped",
            kind.plural(),
            report.created.len(),
            report.updated.len(),
            report.unchanged,
            report.dropped.len()
        );
    }

    if !report.collisions.is_empty() {
        println!(
            "  warning: duplicate keys in batch (last one kept): {}",
            report.collisions.join(", ")
        );
    }
}

/// Reconciles a batch file into the active workspace
pub fn reconcile_file(output: &Output, workspace: Option<&str>, kind: ArtifactKind, path: &Path) -> Result<()> {
    let mut session = Session::open(output, workspace)?;

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file: {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in batch file: {}", path.display()))?;
    let batch = parse_batch_value(kind, value)?;
    output.verbose_ctx("reconcile", &format!("{} item(s) in batch", batch.len()));

    let report = session.state.reconcile(kind, batch)?;
    if !report.is_noop() {
        session.save()?;
    }

    print_report(output, kind, &report);
    Ok(())
}

/// Asks the configured generator for a batch of `kind` and reconciles it
pub fn generate(output: &Output, workspace: Option<&str>, kind: ArtifactKind, prompt: Option<&str>) -> Result<()> {
    let mut session = Session::open(output, workspace)?;
    let generator = CommandGenerator::from_config(&session.project.config().project.generator)?;

    let tracker = GenerationTracker::new();
    tracker.bind(session.state.id.clone());
    output.verbose_ctx("generate", &format!("Requesting {}", kind.plural()));

    match run_generation(&generator, &tracker, &mut session.state, kind, prompt)? {
        GenerationOutcome::Applied(report) => {
            if !report.is_noop() {
                session.save()?;
            }
            print_report(output, kind, &report);
        }
        GenerationOutcome::Discarded => {
            if output.is_json() {
                output.data(&serde_json::json!({ "kind": kind, "status": "discarded" }));
            } else {
                println!("Workspace changed during generation; result discarded");
            }
        }
    }

    Ok(())
}

/// Rebuilds handler groups and routers from the endpoints
pub fn derive(output: &Output, workspace: Option<&str>) -> Result<()> {
    let mut session = Session::open(output, workspace)?;

    let report = session.state.derive();
    if !report.is_noop() {
        session.save()?;
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "status": if report.is_noop() { "no_op" } else { "changed" },
            "handler_groups": report.handler_groups,
            "routers": report.routers,
        }));
    } else {
        print_report(output, ArtifactKind::HandlerGroup, &report.handler_groups);
        print_report(output, ArtifactKind::Router, &report.routers);
    }

    Ok(())
}
