//! App Core for Video Hunter.
//!
//! Central struct owning the registry, the view models and the services a
//! session needs. The transport and the confirmation prompt are injected so
//! the same App drives the terminal session, one-shot commands and tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::managers::download_registry::{DownloadRegistry, DownloadRegistryTrait};
use crate::services::api_client::DownloadApi;
use crate::services::debounce::Debouncer;
use crate::services::localization_engine::{params, LocalizationEngine, LocalizationEngineTrait};
use crate::services::reconciler::{self, Effect, JobNotice};
use crate::services::settings_store::{SettingsStore, SettingsStoreTrait};
use crate::session::AppEvent;
use crate::types::errors::{ActionError, SettingsError, TransportError, ValidationError};
use crate::types::events::StreamEvent;
use crate::types::job::Job;
use crate::types::settings::{ClientSettings, SettingsDraft};
use crate::types::video_info::VideoInfo;
use crate::ui::download_list::DownloadListView;
use crate::ui::modal::{is_affirmative, ConfirmDialog, ConfirmPrompt, ModalState};
use crate::ui::notifications::{NotificationCenter, NotificationKind};
use crate::ui::video_info_panel::VideoInfoPanel;

/// Format sent when the user picks none.
pub const DEFAULT_FORMAT: &str = "best";

/// URLs shorter than this are not looked up.
pub const MIN_LOOKUP_URL_LEN: usize = 10;

/// The new-download form.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadForm {
    pub url: String,
    pub format: String,
    pub download_enabled: bool,
}

impl Default for DownloadForm {
    fn default() -> Self {
        Self {
            url: String::new(),
            format: DEFAULT_FORMAT.to_string(),
            download_enabled: true,
        }
    }
}

/// A part of the screen that changed and must be printed again.
#[derive(Debug, Clone, PartialEq)]
pub enum Repaint {
    List,
    Item(String),
    Count,
    Panel,
    Modal,
    Loading,
}

/// Central application struct.
pub struct App {
    api: Arc<dyn DownloadApi>,
    confirm: Box<dyn ConfirmPrompt>,
    events: Option<UnboundedSender<AppEvent>>,
    debouncer: Debouncer,
    repaints: Vec<Repaint>,
    pub registry: DownloadRegistry,
    pub list: DownloadListView,
    pub panel: VideoInfoPanel,
    pub notifications: NotificationCenter,
    pub modal: ModalState,
    pub loading: Option<String>,
    pub form: DownloadForm,
    pub settings_store: SettingsStore,
    pub localization_engine: LocalizationEngine,
}

impl App {
    pub fn new(
        api: Arc<dyn DownloadApi>,
        confirm: Box<dyn ConfirmPrompt>,
        localization_engine: LocalizationEngine,
        settings_store: SettingsStore,
    ) -> Self {
        let mut app = Self {
            api,
            confirm,
            events: None,
            debouncer: Debouncer::default(),
            repaints: Vec::new(),
            registry: DownloadRegistry::new(),
            list: DownloadListView::new(),
            panel: VideoInfoPanel::Hidden,
            notifications: NotificationCenter::new(),
            modal: ModalState::Closed,
            loading: None,
            form: DownloadForm::default(),
            settings_store,
            localization_engine,
        };
        app.list.render_full(&app.registry, &app.localization_engine);
        app
    }

    /// Routes debounced lookups back into the session loop.
    pub fn attach_events(&mut self, events: UnboundedSender<AppEvent>) {
        self.events = Some(events);
    }

    pub fn api(&self) -> Arc<dyn DownloadApi> {
        Arc::clone(&self.api)
    }

    /// Screen parts changed since the last call, in order.
    pub fn take_repaints(&mut self) -> Vec<Repaint> {
        std::mem::take(&mut self.repaints)
    }

    fn tr(&self, key: &str, pairs: &[(&str, &str)]) -> String {
        if pairs.is_empty() {
            self.localization_engine.t(key, None)
        } else {
            self.localization_engine.t(key, Some(&params(pairs)))
        }
    }

    fn notify(&mut self, kind: NotificationKind, key: &str, pairs: &[(&str, &str)]) {
        let message = self.tr(key, pairs);
        self.notifications.notify(kind, message);
    }

    fn set_loading(&mut self, key: Option<&str>) {
        self.loading = key.map(|k| self.tr(k, &[]));
        self.repaints.push(Repaint::Loading);
    }

    fn render_list(&mut self) {
        self.list.render_full(&self.registry, &self.localization_engine);
        self.repaints.push(Repaint::List);
    }

    fn validation_message(&self, err: &ValidationError) -> String {
        match err {
            ValidationError::EmptyUrl => self.tr("create.empty_url", &[]),
            ValidationError::NotANumber { field } => {
                let label = self.tr(field_label_key(field), &[]);
                self.tr("settings.not_a_number", &[("field", label.as_str())])
            }
            ValidationError::OutOfRange { field, min, max } => {
                let label = self.tr(field_label_key(field), &[]);
                self.tr(
                    "settings.out_of_range",
                    &[
                        ("field", label.as_str()),
                        ("min", min.to_string().as_str()),
                        ("max", max.to_string().as_str()),
                    ],
                )
            }
        }
    }

    /// Carries out what a merge asked for.
    pub fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Notify(JobNotice::Completed { file }) => {
                    let file = file.unwrap_or_else(|| self.tr("list.unknown_file", &[]));
                    self.notify(
                        NotificationKind::Success,
                        "job.completed",
                        &[("file", file.as_str())],
                    );
                }
                Effect::Notify(JobNotice::Failed { error }) => {
                    let error = error.unwrap_or_else(|| self.tr("job.unknown_error", &[]));
                    self.notify(
                        NotificationKind::Error,
                        "job.failed",
                        &[("error", error.as_str())],
                    );
                }
                Effect::RenderItem(id) => {
                    if let Some(job) = self.registry.get(&id) {
                        if self.list.render_partial(job, &self.localization_engine) {
                            self.repaints.push(Repaint::Item(id));
                        }
                    }
                }
                Effect::RenderList => self.render_list(),
                Effect::UpdateCount => {
                    self.list.set_count(self.registry.len(), &self.localization_engine);
                    self.repaints.push(Repaint::Count);
                }
            }
        }
    }

    // === Downloads ===
    //
    // Each network action is split so the session loop can run the request
    // in a spawned task: `begin_*` checks input and shows the loading line,
    // `finish_*` applies the answer. The async methods chain the two for
    // one-shot commands.

    /// Checks the form and shows the loading line. Returns the trimmed URL
    /// and the format to submit.
    pub fn begin_download(
        &mut self,
        url: &str,
        format: &str,
    ) -> Result<(String, String), ActionError> {
        let url = url.trim();
        if url.is_empty() {
            let err = ValidationError::EmptyUrl;
            let message = self.validation_message(&err);
            self.notifications.notify(NotificationKind::Error, message);
            return Err(err.into());
        }
        if !self.form.download_enabled {
            warn!(url, "download refused, link is marked as not downloadable");
            self.notify(NotificationKind::Warning, "create.disabled", &[]);
            return Err(ActionError::DownloadDisabled);
        }

        let format = match format.trim() {
            "" => DEFAULT_FORMAT,
            f => f,
        };
        self.set_loading(Some("create.loading"));
        Ok((url.to_string(), format.to_string()))
    }

    pub fn finish_download(
        &mut self,
        result: Result<Job, TransportError>,
    ) -> Result<Job, ActionError> {
        self.set_loading(None);
        match result {
            Ok(job) => {
                self.registry.upsert(job.clone());
                self.render_list();
                self.clear_form();
                self.notify(NotificationKind::Success, "create.success", &[]);
                Ok(job)
            }
            Err(e) => {
                self.notify(
                    NotificationKind::Error,
                    "create.failed",
                    &[("error", e.to_string().as_str())],
                );
                Err(e.into())
            }
        }
    }

    /// Submits a new job for `url`.
    pub async fn start_download(&mut self, url: &str, format: &str) -> Result<Job, ActionError> {
        let (url, format) = self.begin_download(url, format)?;
        let result = self.api.create_job(&url, &format).await;
        self.finish_download(result)
    }

    /// Replaces the registry with a fresh list from the backend.
    pub fn finish_load(
        &mut self,
        result: Result<Vec<Job>, TransportError>,
    ) -> Result<usize, ActionError> {
        match result {
            Ok(jobs) => {
                let effects = reconciler::reload(&mut self.registry, jobs);
                self.apply_effects(effects);
                info!(count = self.registry.len(), "downloads loaded");
                Ok(self.registry.len())
            }
            Err(e) => {
                warn!(error = %e, "failed to load downloads");
                self.notify(NotificationKind::Error, "load.failed", &[]);
                Err(e.into())
            }
        }
    }

    pub async fn load_downloads(&mut self) -> Result<usize, ActionError> {
        let result = self.api.list_jobs().await;
        self.finish_load(result)
    }

    /// Reports a cancel. The caller reloads the list when it went through.
    pub fn finish_cancel(
        &mut self,
        id: &str,
        result: Result<(), TransportError>,
    ) -> Result<(), ActionError> {
        if let Err(e) = result {
            warn!(id, error = %e, "cancel failed");
            self.notify(NotificationKind::Error, "cancel.failed", &[]);
            return Err(e.into());
        }
        self.notify(NotificationKind::Success, "cancel.success", &[]);
        Ok(())
    }

    pub async fn cancel_download(&mut self, id: &str) -> Result<(), ActionError> {
        let result = self.api.cancel_job(id).await;
        self.finish_cancel(id, result)?;
        if self.load_downloads().await.is_err() {
            debug!(id, "reload after cancel failed");
        }
        Ok(())
    }

    pub fn clear_dialog(&self) -> ConfirmDialog {
        ConfirmDialog {
            title: self.tr("clear.title", &[]),
            message: self.tr("clear.message", &[]),
            confirm_label: self.tr("clear.confirm", &[]),
            cancel_label: self.tr("clear.cancel", &[]),
        }
    }

    /// Opens the clear-all question; the next typed line answers it.
    pub fn request_clear(&mut self) {
        self.modal = ModalState::Confirm(self.clear_dialog());
        self.repaints.push(Repaint::Modal);
    }

    pub fn awaiting_confirm(&self) -> bool {
        matches!(self.modal, ModalState::Confirm(_))
    }

    /// Closes the open question with `answer`. `None` when nothing was asked.
    pub fn answer_confirm(&mut self, answer: &str) -> Option<bool> {
        let accepted = match &self.modal {
            ModalState::Confirm(dialog) => is_affirmative(answer, &dialog.confirm_label),
            _ => return None,
        };
        self.close_modal();
        if !accepted {
            info!("clear all declined");
        }
        Some(accepted)
    }

    pub fn begin_clear(&mut self) {
        self.set_loading(Some("clear.loading"));
    }

    pub fn finish_clear(
        &mut self,
        result: Result<String, TransportError>,
    ) -> Result<(), ActionError> {
        self.set_loading(None);
        match result {
            Ok(message) => {
                self.registry.clear();
                self.render_list();
                if message.is_empty() {
                    self.notify(NotificationKind::Success, "clear.success", &[]);
                } else {
                    self.notifications.notify(NotificationKind::Success, message);
                }
                Ok(())
            }
            Err(e) => {
                self.notify(
                    NotificationKind::Error,
                    "clear.failed",
                    &[("error", e.to_string().as_str())],
                );
                Err(e.into())
            }
        }
    }

    /// Asks first; returns `Ok(false)` when the user declines.
    pub async fn clear_all_downloads(&mut self) -> Result<bool, ActionError> {
        let dialog = self.clear_dialog();
        if !self.confirm.confirm(&dialog).await {
            info!("clear all declined");
            return Ok(false);
        }

        self.begin_clear();
        let result = self.api.clear_all_jobs().await;
        self.finish_clear(result)?;
        Ok(true)
    }

    pub fn finish_fetch(
        &mut self,
        id: &str,
        result: Result<PathBuf, TransportError>,
    ) -> Result<PathBuf, ActionError> {
        match result {
            Ok(path) => {
                let shown = path.display().to_string();
                self.notify(
                    NotificationKind::Success,
                    "fetch.success",
                    &[("path", shown.as_str())],
                );
                Ok(path)
            }
            Err(e) => {
                warn!(id, error = %e, "fetch failed");
                self.notify(NotificationKind::Error, "fetch.failed", &[]);
                Err(e.into())
            }
        }
    }

    /// Saves a finished file under `dest_dir`.
    pub async fn trigger_file_download(
        &mut self,
        id: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, ActionError> {
        let result = self.api.fetch_file(id, dest_dir).await;
        self.finish_fetch(id, result)
    }

    pub fn open_file(&mut self, id: &str) {
        let name = self
            .registry
            .get(id)
            .and_then(|job| job.display_name())
            .map(str::to_string)
            .unwrap_or_else(|| self.tr("list.unknown_file", &[]));
        self.notify(NotificationKind::Info, "file.open", &[("file", name.as_str())]);
    }

    // === Video info ===

    /// Records typed input and restarts the lookup timer.
    pub fn on_url_input(&mut self, text: &str) {
        self.form.url = text.to_string();
        if let Some(events) = &self.events {
            let events = events.clone();
            let text = text.to_string();
            self.debouncer.schedule(async move {
                let _ = events.send(AppEvent::LookupDue(text));
            });
        }
    }

    /// Hides the panel for URLs too short to look up.
    pub fn should_lookup(&mut self, url: &str) -> bool {
        if url.trim().chars().count() < MIN_LOOKUP_URL_LEN {
            self.hide_panel();
            return false;
        }
        true
    }

    /// Shows a lookup result. Failures only hide the panel.
    pub fn apply_video_info(&mut self, result: Result<VideoInfo, TransportError>) {
        match result {
            Ok(info) => {
                self.panel = VideoInfoPanel::from_info(&info, &self.localization_engine);
                self.form.download_enabled = self.panel.allows_download();
                self.repaints.push(Repaint::Panel);
            }
            Err(e) => {
                debug!(error = %e, "video info lookup failed");
                self.hide_panel();
            }
        }
    }

    pub async fn lookup_video_info(&mut self, url: &str) {
        if !self.should_lookup(url) {
            return;
        }
        let result = self.api.fetch_video_info(url.trim()).await;
        self.apply_video_info(result);
    }

    fn hide_panel(&mut self) {
        self.form.download_enabled = true;
        if self.panel.is_visible() {
            self.panel = VideoInfoPanel::Hidden;
            self.repaints.push(Repaint::Panel);
        }
    }

    pub fn clear_form(&mut self) {
        self.debouncer.cancel();
        self.form.url.clear();
        self.form.format = DEFAULT_FORMAT.to_string();
        self.hide_panel();
    }

    // === Dialogs ===

    pub fn show_settings(&mut self) {
        let draft = SettingsDraft::from_settings(self.settings_store.get_settings());
        self.modal = ModalState::Settings(draft);
        self.repaints.push(Repaint::Modal);
    }

    /// Edits the open settings form. Returns `false` when no form is open
    /// or the field is unknown.
    pub fn edit_setting(&mut self, field: &str, value: &str) -> bool {
        let changed = match &mut self.modal {
            ModalState::Settings(draft) => draft.set_field(field, value),
            _ => false,
        };
        if changed {
            self.repaints.push(Repaint::Modal);
        }
        changed
    }

    pub fn close_settings(&mut self) {
        if matches!(self.modal, ModalState::Settings(_)) {
            self.close_modal();
        }
    }

    /// Validates and persists `draft`. The dialog stays open on failure.
    pub fn save_settings(&mut self, draft: &SettingsDraft) -> Result<ClientSettings, ActionError> {
        match self.settings_store.save(draft) {
            Ok(saved) => {
                self.close_settings();
                self.notify(NotificationKind::Success, "settings.saved", &[]);
                Ok(saved)
            }
            Err(SettingsError::Invalid(err)) => {
                let message = self.validation_message(&err);
                self.notifications.notify(NotificationKind::Error, message);
                Err(ActionError::Validation(err))
            }
            Err(e) => {
                self.notify(
                    NotificationKind::Error,
                    "settings.save_failed",
                    &[("error", e.to_string().as_str())],
                );
                Err(e.into())
            }
        }
    }

    /// Saves whatever the open settings form holds.
    pub fn save_open_settings(&mut self) -> Option<Result<ClientSettings, ActionError>> {
        let draft = match &self.modal {
            ModalState::Settings(draft) => draft.clone(),
            _ => return None,
        };
        Some(self.save_settings(&draft))
    }

    pub fn reset_settings(&mut self) -> Result<(), ActionError> {
        self.settings_store.reset()?;
        self.notify(NotificationKind::Success, "settings.reset", &[]);
        Ok(())
    }

    pub fn show_help(&mut self) {
        self.modal = ModalState::Help;
        self.repaints.push(Repaint::Modal);
    }

    pub fn close_help(&mut self) {
        if matches!(self.modal, ModalState::Help) {
            self.close_modal();
        }
    }

    pub fn close_modal(&mut self) {
        if self.modal.is_open() {
            self.modal = ModalState::Closed;
            self.repaints.push(Repaint::Modal);
        }
    }

    // === Live updates ===

    pub fn handle_stream_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Connected => {
                let message = self.tr("connection.connected", &[]);
                self.notifications.set_status(NotificationKind::Success, message);
            }
            StreamEvent::Disconnected => {
                let message = self.tr("connection.lost", &[]);
                self.notifications.set_status(NotificationKind::Warning, message);
            }
            StreamEvent::Progress(event) => {
                let effects = reconciler::apply_push(&mut self.registry, &event, Utc::now());
                self.apply_effects(effects);
            }
        }
    }

    /// Polling only runs while there is something to refresh.
    pub fn poll_due(&self) -> bool {
        !self.registry.is_empty()
    }

    pub fn handle_poll_snapshot(&mut self, result: Result<Vec<Job>, TransportError>) {
        match result {
            Ok(jobs) => {
                let effects = reconciler::apply_poll(&mut self.registry, jobs);
                self.apply_effects(effects);
            }
            Err(e) => debug!(error = %e, "poll failed"),
        }
    }

    /// Hides banners whose time is up.
    pub fn tick(&mut self, now: Instant) {
        self.notifications.expire(now);
    }
}

fn field_label_key(field: &str) -> &'static str {
    match field {
        "maxRetries" => "settings.max_retries",
        "timeout" => "settings.timeout",
        "maxConcurrent" => "settings.max_concurrent",
        _ => "settings.download_dir",
    }
}
