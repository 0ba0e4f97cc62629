//! Reconciler for Video Hunter.
//!
//! Merges the two update channels into the download registry:
//! low-latency push deltas from the WebSocket and periodic polled snapshots.
//! The merge policies are pure functions that return the new record plus the
//! side effects the App must carry out (notifications, render instructions),
//! so they can be exercised without any UI.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::managers::download_registry::{DownloadRegistry, DownloadRegistryTrait};
use crate::types::events::ProgressEvent;
use crate::types::job::{Job, JobStatus};

/// User-facing notice raised by a status edge.
#[derive(Debug, Clone, PartialEq)]
pub enum JobNotice {
    Completed { file: Option<String> },
    Failed { error: Option<String> },
}

/// Work the App performs after a merge.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Notify(JobNotice),
    /// Patch the one item in place.
    RenderItem(String),
    /// Rebuild the whole list (its shape changed).
    RenderList,
    /// Refresh the job counter only.
    UpdateCount,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub record: Job,
    pub effects: Vec<Effect>,
}

/// Applies a push delta onto an existing record.
///
/// Only `progress`, `speed`, `eta`, `status` and a non-empty `file` are
/// taken from the event. Completion and failure notices fire on the edge
/// into that status, judged against `existing.status`.
pub fn merge_delta(existing: &Job, event: &ProgressEvent, now: DateTime<Utc>) -> MergeOutcome {
    let mut record = existing.clone();
    record.progress = event.progress;
    record.speed = event.speed.clone();
    record.eta = event.eta.clone();
    record.status = event.status.clone();
    if let Some(file) = event.file.as_ref().filter(|f| !f.is_empty()) {
        record.file = Some(file.clone());
    }
    record.updated = now.max(existing.updated);

    let mut effects = vec![Effect::RenderItem(record.id.clone())];
    if record.status == JobStatus::Completed && existing.status != JobStatus::Completed {
        effects.push(Effect::Notify(JobNotice::Completed {
            file: record.file.clone(),
        }));
    }
    if record.status == JobStatus::Failed && existing.status != JobStatus::Failed {
        effects.push(Effect::Notify(JobNotice::Failed {
            error: event.error.clone(),
        }));
    }

    MergeOutcome { record, effects }
}

/// Builds a record for an id first seen on the push channel.
pub fn insert_from_event(event: &ProgressEvent, now: DateTime<Utc>) -> MergeOutcome {
    let stamp = event.updated.unwrap_or(now);
    let mut record = Job::new(event.id.clone(), event.status.clone(), stamp);
    record.progress = event.progress;
    record.speed = event.speed.clone();
    record.eta = event.eta.clone();
    record.file = event.file.clone();
    record.error = event.error.clone();

    MergeOutcome {
        record,
        effects: vec![Effect::RenderList],
    }
}

/// Takes a polled record wholesale.
///
/// Known ids that changed get an in-place render; ids not yet known are
/// inserted silently and show up on the next full render.
pub fn replace_snapshot(existing: Option<&Job>, polled: Job) -> MergeOutcome {
    let effects = match existing {
        Some(prev) if prev != &polled => vec![Effect::RenderItem(polled.id.clone())],
        _ => Vec::new(),
    };
    MergeOutcome {
        record: polled,
        effects,
    }
}

/// Merges one push event into the registry.
pub fn apply_push(
    registry: &mut DownloadRegistry,
    event: &ProgressEvent,
    now: DateTime<Utc>,
) -> Vec<Effect> {
    let outcome = match registry.get(&event.id) {
        Some(existing) => {
            if !existing.status.can_transition_to(&event.status) {
                warn!(
                    id = %event.id,
                    from = %existing.status,
                    to = %event.status,
                    "status moved backwards; applying latest update"
                );
            }
            merge_delta(existing, event, now)
        }
        None => insert_from_event(event, now),
    };
    registry.upsert(outcome.record);
    outcome.effects
}

/// Merges a polled snapshot. Never removes ids missing from `snapshot`.
pub fn apply_poll(registry: &mut DownloadRegistry, snapshot: Vec<Job>) -> Vec<Effect> {
    let mut effects = Vec::new();
    for polled in snapshot {
        let outcome = replace_snapshot(registry.get(&polled.id), polled);
        registry.upsert(outcome.record);
        effects.extend(outcome.effects);
    }
    effects.push(Effect::UpdateCount);
    effects
}

/// Rebuilds the registry from a fresh snapshot.
pub fn reload(registry: &mut DownloadRegistry, snapshot: Vec<Job>) -> Vec<Effect> {
    registry.replace_all(snapshot);
    vec![Effect::RenderList]
}
