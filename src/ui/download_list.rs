//! The download list: item views keyed by job id.

use crate::managers::download_registry::{DownloadRegistry, DownloadRegistryTrait};
use crate::services::localization_engine::LocalizationEngineTrait;
use crate::types::job::Job;
use crate::ui::view::{
    action_views, clamp_progress, error_text, eta_text, format_updated, progress_text,
    render_item, status_style, JobItemView,
};

#[derive(Debug, Clone, PartialEq)]
pub struct EmptyState {
    pub title: String,
    pub hint: String,
}

/// What the printer draws for the list section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownloadListView {
    items: Vec<JobItemView>,
    count: usize,
    count_text: String,
    empty: Option<EmptyState>,
}

impl DownloadListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[JobItemView] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&JobItemView> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn count_text(&self) -> &str {
        &self.count_text
    }

    pub fn empty_state(&self) -> Option<&EmptyState> {
        self.empty.as_ref()
    }

    /// Rebuilds every item from the registry, newest first.
    pub fn render_full(&mut self, registry: &DownloadRegistry, loc: &dyn LocalizationEngineTrait) {
        self.items = registry
            .sorted_by_created_desc()
            .into_iter()
            .map(|job| render_item(job, loc))
            .collect();

        self.empty = if self.items.is_empty() {
            Some(EmptyState {
                title: loc.t("list.empty_title", None),
                hint: loc.t("list.empty_hint", None),
            })
        } else {
            None
        };
        self.set_count(registry.len(), loc);
    }

    /// Patches the item for `job.id` in place.
    ///
    /// Title, id line and created time are left as they were. Returns
    /// `false` without touching anything when no item has that id.
    pub fn render_partial(&mut self, job: &Job, loc: &dyn LocalizationEngineTrait) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == job.id) else {
            return false;
        };

        let style = status_style(&job.status);
        item.progress_width = clamp_progress(job.progress);
        item.progress_text = progress_text(job.progress);
        item.speed_text = job.speed.clone().unwrap_or_default();
        item.eta_text = eta_text(job, loc);
        item.updated_text = format_updated(job.updated);
        item.status_label = loc.t(style.label_key, None);
        item.status_tone = style.tone;
        item.icon = style.icon;
        item.border = style.border;
        item.actions = action_views(&job.status, loc);
        item.error_text = error_text(job, loc);
        true
    }

    pub fn set_count(&mut self, count: usize, loc: &dyn LocalizationEngineTrait) {
        self.count = count;
        self.count_text = loc.plural("list.count", count as u64, None);
    }
}
