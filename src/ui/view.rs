//! Pure job → view-model rendering.

use chrono::{DateTime, Local, Utc};

use crate::services::localization_engine::{params, LocalizationEngineTrait};
use crate::types::job::{Job, JobStatus};

/// Colour family a terminal printer maps to its palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Warning,
    Active,
    Success,
    Danger,
    Muted,
}

/// Presentation of one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    pub label_key: &'static str,
    pub tone: Tone,
    pub icon: &'static str,
    pub border: Tone,
}

/// Total over every status; anything unrecognised gets the unknown style.
pub fn status_style(status: &JobStatus) -> StatusStyle {
    match status {
        JobStatus::Pending => StatusStyle {
            label_key: "status.pending",
            tone: Tone::Warning,
            icon: "…",
            border: Tone::Warning,
        },
        JobStatus::Downloading => StatusStyle {
            label_key: "status.downloading",
            tone: Tone::Active,
            icon: "↓",
            border: Tone::Active,
        },
        JobStatus::Completed => StatusStyle {
            label_key: "status.completed",
            tone: Tone::Success,
            icon: "✓",
            border: Tone::Success,
        },
        JobStatus::Failed => StatusStyle {
            label_key: "status.failed",
            tone: Tone::Danger,
            icon: "✗",
            border: Tone::Danger,
        },
        JobStatus::Cancelled => StatusStyle {
            label_key: "status.cancelled",
            tone: Tone::Muted,
            icon: "⊘",
            border: Tone::Muted,
        },
        JobStatus::Unknown(_) => StatusStyle {
            label_key: "status.unknown",
            tone: Tone::Muted,
            icon: "?",
            border: Tone::Muted,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAction {
    Cancel,
    SaveToLocal,
    OpenFile,
}

impl ItemAction {
    pub fn label_key(self) -> &'static str {
        match self {
            ItemAction::Cancel => "actions.cancel",
            ItemAction::SaveToLocal => "actions.save_to_local",
            ItemAction::OpenFile => "actions.open_file",
        }
    }
}

/// Actions offered for a status. Full and partial renders both use this,
/// so re-rendering an item never changes its buttons.
pub fn actions_for(status: &JobStatus) -> Vec<ItemAction> {
    match status {
        JobStatus::Downloading => vec![ItemAction::Cancel],
        JobStatus::Completed => vec![ItemAction::SaveToLocal, ItemAction::OpenFile],
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionView {
    pub action: ItemAction,
    pub label: String,
}

/// Everything the printer needs to draw one list item.
#[derive(Debug, Clone, PartialEq)]
pub struct JobItemView {
    pub id: String,
    pub title: String,
    pub id_line: String,
    pub status_label: String,
    pub status_tone: Tone,
    pub icon: &'static str,
    pub border: Tone,
    /// Bar fill in percent, clamped to `0..=100`.
    pub progress_width: f64,
    pub progress_text: String,
    pub speed_text: String,
    pub eta_text: String,
    pub created_text: String,
    pub updated_text: String,
    pub actions: Vec<ActionView>,
    pub error_text: Option<String>,
}

pub fn format_created(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn format_updated(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M:%S").to_string()
}

pub fn clamp_progress(progress: f64) -> f64 {
    if progress.is_nan() {
        return 0.0;
    }
    progress.clamp(0.0, 100.0)
}

pub fn progress_text(progress: f64) -> String {
    format!("{:.1}%", clamp_progress(progress))
}

pub fn eta_text(job: &Job, loc: &dyn LocalizationEngineTrait) -> String {
    match job.eta.as_deref() {
        Some(eta) => loc.t("list.eta", Some(&params(&[("eta", eta)]))),
        None => String::new(),
    }
}

pub fn error_text(job: &Job, loc: &dyn LocalizationEngineTrait) -> Option<String> {
    job.error
        .as_deref()
        .map(|error| loc.t("list.error", Some(&params(&[("error", error)]))))
}

pub fn action_views(status: &JobStatus, loc: &dyn LocalizationEngineTrait) -> Vec<ActionView> {
    actions_for(status)
        .into_iter()
        .map(|action| ActionView {
            action,
            label: loc.t(action.label_key(), None),
        })
        .collect()
}

pub fn render_item(job: &Job, loc: &dyn LocalizationEngineTrait) -> JobItemView {
    let style = status_style(&job.status);
    let title = job
        .display_name()
        .map(str::to_string)
        .unwrap_or_else(|| loc.t("list.unknown_file", None));

    JobItemView {
        id: job.id.clone(),
        title,
        id_line: loc.t("list.id", Some(&params(&[("id", job.id.as_str())]))),
        status_label: loc.t(style.label_key, None),
        status_tone: style.tone,
        icon: style.icon,
        border: style.border,
        progress_width: clamp_progress(job.progress),
        progress_text: progress_text(job.progress),
        speed_text: job.speed.clone().unwrap_or_default(),
        eta_text: eta_text(job, loc),
        created_text: format_created(job.created),
        updated_text: format_updated(job.updated),
        actions: action_views(&job.status, loc),
        error_text: error_text(job, loc),
    }
}
