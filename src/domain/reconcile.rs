//! Reconciliation of generated batches into artifact collections
//!
//! A batch is authoritative for its kind: existing artifacts are matched by
//! natural key and keep their IDs, unmatched existing artifacts are dropped,
//! and unmatched batch items become new artifacts. History is only written
//! for artifacts whose content actually changed.

use std::collections::HashMap;

use serde::Serialize;

use super::artifact::{Artifact, ArtifactContent, ArtifactKind, BatchItem};
use super::history::EntryKind;
use super::id::ArtifactId;

/// Whether a reconciliation changed anything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileStatus {
    Changed,
    /// The batch matched the collection exactly
    NoOp,
}

/// What a reconciliation did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub created: Vec<ArtifactId>,
    pub updated: Vec<ArtifactId>,
    pub unchanged: usize,
    pub dropped: Vec<ArtifactId>,

    /// Natural keys that appeared more than once in the batch
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collisions: Vec<String>,
}

impl ReconcileReport {
    pub fn status(&self) -> ReconcileStatus {
        if self.is_noop() {
            ReconcileStatus::NoOp
        } else {
            ReconcileStatus::Changed
        }
    }

    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.dropped.is_empty()
    }
}

/// The next collection state plus the report describing it
#[derive(Debug, Clone)]
pub struct Reconciled<C> {
    pub artifacts: Vec<Artifact<C>>,
    pub report: ReconcileReport,
}

/// Collapses repeated natural keys: the last item's content wins, the first
/// item's position is kept
fn dedupe_batch<C>(batch: Vec<BatchItem<C>>) -> (Vec<BatchItem<C>>, Vec<String>) {
    let mut items: Vec<BatchItem<C>> = Vec::with_capacity(batch.len());
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut collisions = Vec::new();

    for item in batch {
        match index.get(&item.natural_key) {
            Some(&i) => {
                if !collisions.contains(&item.natural_key) {
                    collisions.push(item.natural_key.clone());
                }
                items[i] = item;
            }
            None => {
                index.insert(item.natural_key.clone(), items.len());
                items.push(item);
            }
        }
    }

    (items, collisions)
}

/// Merges `batch` into `existing`
///
/// Result order: matched artifacts in their prior relative order, then new
/// artifacts in batch order.
pub fn reconcile<C: ArtifactContent>(
    kind: ArtifactKind,
    existing: Vec<Artifact<C>>,
    batch: Vec<BatchItem<C>>,
) -> Reconciled<C> {
    let (items, collisions) = dedupe_batch(batch);
    for key in &collisions {
        log::warn!("{} batch contains '{}' more than once; keeping the last", kind, key);
    }

    let lookup: HashMap<&str, usize> = items
        .iter()
        .enumerate()
        .map(|(i, item)| (item.natural_key.as_str(), i))
        .collect();
    let mut consumed = vec![false; items.len()];

    let mut report = ReconcileReport {
        collisions,
        ..ReconcileReport::default()
    };
    let mut artifacts = Vec::with_capacity(items.len());

    for mut artifact in existing {
        let Some(&i) = lookup.get(artifact.natural_key.as_str()) else {
            log::debug!("Dropping {} '{}' ({})", kind, artifact.natural_key, artifact.id);
            report.dropped.push(artifact.id);
            continue;
        };
        consumed[i] = true;

        let item = &items[i];
        if artifact.content == item.content {
            report.unchanged += 1;
        } else {
            artifact.history.append_if_changed(
                &artifact.content,
                Some("Replaced by regeneration".to_string()),
                EntryKind::Regenerate,
            );
            artifact.content = item.content.clone();
            log::debug!("Updated {} '{}' ({})", kind, artifact.natural_key, artifact.id);
            report.updated.push(artifact.id.clone());
        }
        artifacts.push(artifact);
    }

    for (item, used) in items.into_iter().zip(consumed) {
        if used {
            continue;
        }
        let artifact = Artifact::new(kind, item.natural_key, item.content);
        log::debug!("Created {} '{}' ({})", kind, artifact.natural_key, artifact.id);
        report.created.push(artifact.id.clone());
        artifacts.push(artifact);
    }

    log::info!(
        "Reconciled {}: {} created, {} updated, {} unchanged, {} dropped",
        kind.plural(),
        report.created.len(),
        report.updated.len(),
        report.unchanged,
        report.dropped.len()
    );

    Reconciled { artifacts, report }
}
