//! App actions driven against an in-memory backend.
//!
//! `FakeApi` records every call so tests can assert that validation and
//! declined confirmations never reach the network.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tempfile::TempDir;

use videohunter::app::{App, Repaint};
use videohunter::managers::download_registry::DownloadRegistryTrait;
use videohunter::services::api_client::DownloadApi;
use videohunter::services::localization_engine::{LocalizationEngine, LocalizationEngineTrait};
use videohunter::services::settings_store::{SettingsStore, SettingsStoreTrait};
use videohunter::types::errors::{ActionError, TransportError, ValidationError};
use videohunter::types::events::{ProgressEvent, StreamEvent};
use videohunter::types::job::{Job, JobStatus};
use videohunter::types::settings::{ClientSettings, SettingsDraft};
use videohunter::types::video_info::{SpecialNotice, VideoInfo, VideoMetadata};
use videohunter::ui::modal::{FixedAnswer, ModalState};
use videohunter::ui::notifications::NotificationKind;
use videohunter::ui::video_info_panel::VideoInfoPanel;

#[derive(Default)]
struct FakeApi {
    calls: Mutex<Vec<String>>,
    jobs: Mutex<Vec<Job>>,
    fail_create: bool,
    clear_message: String,
}

impl FakeApi {
    fn with_jobs(jobs: Vec<Job>) -> Self {
        Self {
            jobs: Mutex::new(jobs),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl DownloadApi for FakeApi {
    async fn create_job(&self, url: &str, format: &str) -> Result<Job, TransportError> {
        self.record(format!("create {} {}", url, format));
        if self.fail_create {
            return Err(TransportError::Http {
                status: 500,
                reason: "Internal Server Error".to_string(),
            });
        }
        let job = Job::new("job-1", JobStatus::Pending, Utc::now());
        self.jobs.lock().unwrap().push(job.clone());
        Ok(job)
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, TransportError> {
        self.record("list");
        Ok(self.jobs.lock().unwrap().clone())
    }

    async fn cancel_job(&self, id: &str) -> Result<(), TransportError> {
        self.record(format!("cancel {}", id));
        for job in self.jobs.lock().unwrap().iter_mut().filter(|j| j.id == id) {
            job.status = JobStatus::Cancelled;
        }
        Ok(())
    }

    async fn clear_all_jobs(&self) -> Result<String, TransportError> {
        self.record("clear");
        self.jobs.lock().unwrap().clear();
        Ok(self.clear_message.clone())
    }

    async fn fetch_video_info(&self, url: &str) -> Result<VideoInfo, TransportError> {
        self.record(format!("info {}", url));
        Ok(VideoInfo::Metadata(VideoMetadata {
            title: Some("A video".to_string()),
            ..VideoMetadata::default()
        }))
    }

    async fn fetch_file(&self, id: &str, dest_dir: &Path) -> Result<PathBuf, TransportError> {
        self.record(format!("fetch {}", id));
        Ok(dest_dir.join(format!("{}.mp4", id)))
    }
}

fn localizer() -> LocalizationEngine {
    let mut engine = LocalizationEngine::builtin();
    engine.initialize().unwrap();
    engine.set_locale("en").unwrap();
    engine
}

fn store_in(dir: &TempDir) -> SettingsStore {
    let path = dir.path().join("settings.json").to_string_lossy().to_string();
    SettingsStore::new(Some(path))
}

fn app_with(api: Arc<FakeApi>, confirm: bool, dir: &TempDir) -> App {
    App::new(api, Box::new(FixedAnswer(confirm)), localizer(), store_in(dir))
}

fn banner_messages(app: &mut App) -> Vec<(NotificationKind, String)> {
    app.notifications
        .take_unannounced()
        .into_iter()
        .map(|n| (n.kind, n.message))
        .collect()
}

// === Creating downloads ===

#[tokio::test]
async fn test_empty_url_never_reaches_backend() {
    let dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::default());
    let mut app = app_with(api.clone(), true, &dir);

    let result = app.start_download("   ", "best").await;

    assert!(matches!(
        result,
        Err(ActionError::Validation(ValidationError::EmptyUrl))
    ));
    assert!(api.calls().is_empty());
    assert_eq!(
        banner_messages(&mut app),
        vec![(NotificationKind::Error, "Please enter a video URL".to_string())]
    );
}

#[tokio::test]
async fn test_start_download_adds_job_and_resets_form() {
    let dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::default());
    let mut app = app_with(api.clone(), true, &dir);
    app.form.url = "https://v.example/watch?v=1".to_string();
    app.form.format = "720p".to_string();

    let job = app
        .start_download("https://v.example/watch?v=1", "")
        .await
        .unwrap();

    assert_eq!(job.id, "job-1");
    assert_eq!(api.calls(), vec!["create https://v.example/watch?v=1 best"]);
    assert!(app.registry.contains("job-1"));
    assert!(app.list.item("job-1").is_some());
    assert!(app.form.url.is_empty());
    assert_eq!(app.form.format, "best");
    assert!(app.loading.is_none());
    assert!(app.take_repaints().contains(&Repaint::List));
}

#[tokio::test]
async fn test_failed_create_shows_http_status() {
    let dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi {
        fail_create: true,
        ..FakeApi::default()
    });
    let mut app = app_with(api, true, &dir);

    assert!(app.start_download("https://v.example/1", "best").await.is_err());

    let banners = banner_messages(&mut app);
    assert_eq!(banners.len(), 1);
    assert_eq!(banners[0].0, NotificationKind::Error);
    assert!(banners[0].1.contains("HTTP 500"));
    assert!(app.registry.is_empty());
}

#[tokio::test]
async fn test_notice_blocks_download() {
    let dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::default());
    let mut app = app_with(api.clone(), true, &dir);

    app.apply_video_info(Ok(VideoInfo::Notice(SpecialNotice {
        special_note: "Use the desktop app for this site".to_string(),
        solutions: vec!["Try another link".to_string()],
        can_download: false,
    })));
    assert!(!app.form.download_enabled);
    assert!(matches!(app.panel, VideoInfoPanel::Notice(_)));

    let result = app.start_download("https://blocked.example/v", "best").await;
    assert!(matches!(result, Err(ActionError::DownloadDisabled)));
    assert!(api.calls().is_empty());
}

// === Video info ===

#[tokio::test]
async fn test_short_url_hides_panel_and_reenables_download() {
    let dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::default());
    let mut app = app_with(api.clone(), true, &dir);
    app.apply_video_info(Ok(VideoInfo::Notice(SpecialNotice {
        special_note: "blocked".to_string(),
        solutions: Vec::new(),
        can_download: false,
    })));

    app.lookup_video_info("http://a").await;

    assert_eq!(app.panel, VideoInfoPanel::Hidden);
    assert!(app.form.download_enabled);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_lookup_shows_metadata() {
    let dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::default());
    let mut app = app_with(api.clone(), true, &dir);

    app.lookup_video_info("  https://v.example/watch?v=2  ").await;

    assert_eq!(api.calls(), vec!["info https://v.example/watch?v=2"]);
    match &app.panel {
        VideoInfoPanel::Metadata(meta) => assert_eq!(meta.title, "A video"),
        other => panic!("expected metadata, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_lookup_hides_panel() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with(Arc::new(FakeApi::default()), true, &dir);
    app.lookup_video_info("https://v.example/watch?v=2").await;
    assert!(app.panel.is_visible());

    app.apply_video_info(Err(TransportError::Network("timeout".to_string())));

    assert!(!app.panel.is_visible());
    assert!(banner_messages(&mut app).is_empty());
}

// === Listing, cancelling, clearing ===

#[tokio::test]
async fn test_poll_only_due_with_jobs() {
    let dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::with_jobs(vec![Job::new(
        "a",
        JobStatus::Downloading,
        Utc::now(),
    )]));
    let mut app = app_with(api, true, &dir);
    assert!(!app.poll_due());

    assert_eq!(app.load_downloads().await.unwrap(), 1);
    assert!(app.poll_due());
    assert_eq!(app.list.count(), 1);
}

#[tokio::test]
async fn test_cancel_reloads_list() {
    let dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::with_jobs(vec![Job::new(
        "a",
        JobStatus::Downloading,
        Utc::now(),
    )]));
    let mut app = app_with(api.clone(), true, &dir);

    app.cancel_download("a").await.unwrap();

    assert_eq!(api.calls(), vec!["cancel a", "list"]);
    assert_eq!(app.registry.get("a").unwrap().status, JobStatus::Cancelled);
    assert!(app.list.item("a").unwrap().actions.is_empty());
}

#[tokio::test]
async fn test_declined_clear_makes_no_call() {
    let dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::with_jobs(vec![Job::new(
        "a",
        JobStatus::Completed,
        Utc::now(),
    )]));
    let mut app = app_with(api.clone(), false, &dir);
    app.load_downloads().await.unwrap();

    assert!(!app.clear_all_downloads().await.unwrap());

    assert_eq!(api.calls(), vec!["list"]);
    assert_eq!(app.registry.len(), 1);
}

#[tokio::test]
async fn test_confirmed_clear_empties_list_and_shows_server_message() {
    let dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi {
        clear_message: "Removed 1 record".to_string(),
        ..FakeApi::with_jobs(vec![Job::new("a", JobStatus::Completed, Utc::now())])
    });
    let mut app = app_with(api.clone(), true, &dir);
    app.load_downloads().await.unwrap();

    assert!(app.clear_all_downloads().await.unwrap());

    assert!(app.registry.is_empty());
    assert!(app.list.empty_state().is_some());
    let banners = banner_messages(&mut app);
    assert_eq!(
        banners.last(),
        Some(&(NotificationKind::Success, "Removed 1 record".to_string()))
    );
}

#[tokio::test]
async fn test_fetch_reports_saved_path() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with(Arc::new(FakeApi::default()), true, &dir);

    let path = app.trigger_file_download("a", dir.path()).await.unwrap();

    assert_eq!(path, dir.path().join("a.mp4"));
    let banners = banner_messages(&mut app);
    assert!(banners[0].1.starts_with("File saved to"));
}

// === Live updates ===

#[tokio::test]
async fn test_push_completion_notifies_once() {
    let dir = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::with_jobs(vec![Job::new(
        "a",
        JobStatus::Downloading,
        Utc::now(),
    )]));
    let mut app = app_with(api, true, &dir);
    app.load_downloads().await.unwrap();
    app.take_repaints();

    let event = ProgressEvent {
        id: "a".to_string(),
        progress: 100.0,
        speed: None,
        eta: None,
        status: JobStatus::Completed,
        file: Some("done.mp4".to_string()),
        error: None,
        updated: None,
    };
    app.handle_stream_event(StreamEvent::Progress(event.clone()));
    app.handle_stream_event(StreamEvent::Progress(event));

    let banners = banner_messages(&mut app);
    assert_eq!(
        banners,
        vec![(
            NotificationKind::Success,
            "Download completed: done.mp4".to_string()
        )]
    );
    assert!(app.take_repaints().contains(&Repaint::Item("a".to_string())));
}

#[tokio::test]
async fn test_connection_changes_go_to_status_bar() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with(Arc::new(FakeApi::default()), true, &dir);

    app.handle_stream_event(StreamEvent::Connected);
    assert_eq!(app.notifications.status().unwrap().message, "Connected");
    app.handle_stream_event(StreamEvent::Disconnected);

    let status = app.notifications.status().unwrap();
    assert_eq!(status.kind, NotificationKind::Warning);
    assert!(app.notifications.banners().is_empty());
}

#[tokio::test]
async fn test_failed_poll_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with(Arc::new(FakeApi::default()), true, &dir);

    app.handle_poll_snapshot(Err(TransportError::Network("down".to_string())));

    assert!(app.take_repaints().is_empty());
    assert!(banner_messages(&mut app).is_empty());
}

// === Settings ===

#[tokio::test]
async fn test_invalid_settings_keep_file_and_dialog() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with(Arc::new(FakeApi::default()), true, &dir);
    app.settings_store
        .save(&SettingsDraft::from_settings(&ClientSettings::default()))
        .unwrap();
    let path = dir.path().join("settings.json");
    let before = std::fs::read_to_string(&path).unwrap();

    app.show_settings();
    assert!(app.edit_setting("maxRetries", "15"));
    let result = app.save_open_settings().unwrap();

    assert!(matches!(
        result,
        Err(ActionError::Validation(ValidationError::OutOfRange { field: "maxRetries", .. }))
    ));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    assert!(matches!(app.modal, ModalState::Settings(_)));
    let banners = banner_messages(&mut app);
    assert_eq!(banners[0].1, "Max retries must be between 0 and 10");
}

#[tokio::test]
async fn test_valid_settings_save_and_close() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with(Arc::new(FakeApi::default()), true, &dir);

    app.show_settings();
    app.edit_setting("timeout", "600");
    let saved = app.save_open_settings().unwrap().unwrap();

    assert_eq!(saved.timeout, 600);
    assert_eq!(app.modal, ModalState::Closed);

    let mut reloaded = store_in(&dir);
    assert_eq!(reloaded.load().unwrap().timeout, 600);
}

#[tokio::test]
async fn test_edit_without_open_form_is_ignored() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with(Arc::new(FakeApi::default()), true, &dir);

    assert!(!app.edit_setting("timeout", "600"));
    assert!(app.save_open_settings().is_none());
}

#[tokio::test]
async fn test_help_opens_and_closes() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with(Arc::new(FakeApi::default()), true, &dir);

    app.show_help();
    assert_eq!(app.modal, ModalState::Help);
    app.close_settings();
    assert_eq!(app.modal, ModalState::Help);
    app.close_help();
    assert_eq!(app.modal, ModalState::Closed);
    assert_eq!(app.localization_engine.get_locale(), "en");
}
