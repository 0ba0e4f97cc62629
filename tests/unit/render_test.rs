//! Rendering jobs into list items: status styles, actions, and agreement
//! between full and in-place renders.

use chrono::{Duration, TimeZone, Utc};
use rstest::rstest;

use videohunter::managers::download_registry::{DownloadRegistry, DownloadRegistryTrait};
use videohunter::services::localization_engine::{LocalizationEngine, LocalizationEngineTrait};
use videohunter::types::job::{Job, JobStatus};
use videohunter::ui::download_list::DownloadListView;
use videohunter::ui::view::{actions_for, render_item, status_style, ItemAction, Tone};

fn loc(locale: &str) -> LocalizationEngine {
    let mut engine = LocalizationEngine::builtin();
    engine.initialize().unwrap();
    engine.set_locale(locale).unwrap();
    engine
}

fn job(id: &str, status: JobStatus) -> Job {
    let mut job = Job::new(id, status, Utc.with_ymd_and_hms(2024, 5, 4, 10, 0, 0).unwrap());
    job.file = Some(format!("{}.mp4", id));
    job
}

#[rstest]
#[case(JobStatus::Pending, "status.pending", Tone::Warning)]
#[case(JobStatus::Downloading, "status.downloading", Tone::Active)]
#[case(JobStatus::Completed, "status.completed", Tone::Success)]
#[case(JobStatus::Failed, "status.failed", Tone::Danger)]
#[case(JobStatus::Cancelled, "status.cancelled", Tone::Muted)]
#[case(JobStatus::from("paused"), "status.unknown", Tone::Muted)]
fn test_status_style(#[case] status: JobStatus, #[case] label_key: &str, #[case] tone: Tone) {
    let style = status_style(&status);
    assert_eq!(style.label_key, label_key);
    assert_eq!(style.tone, tone);
    assert_eq!(style.border, tone);
    assert!(!style.icon.is_empty());
}

#[rstest]
#[case(JobStatus::Pending, vec![])]
#[case(JobStatus::Downloading, vec![ItemAction::Cancel])]
#[case(JobStatus::Completed, vec![ItemAction::SaveToLocal, ItemAction::OpenFile])]
#[case(JobStatus::Failed, vec![])]
#[case(JobStatus::Cancelled, vec![])]
fn test_actions_per_status(#[case] status: JobStatus, #[case] expected: Vec<ItemAction>) {
    assert_eq!(actions_for(&status), expected);
}

#[rstest]
#[case("en", "Downloading")]
#[case("zh", "下载中")]
fn test_status_label_follows_locale(#[case] locale: &str, #[case] label: &str) {
    let item = render_item(&job("a", JobStatus::Downloading), &loc(locale));
    assert_eq!(item.status_label, label);
}

/// Patching an item with the job it already shows changes nothing.
#[test]
fn test_partial_render_is_idempotent() {
    let loc = loc("en");
    let mut registry = DownloadRegistry::new();
    registry.upsert(job("a", JobStatus::Downloading));
    let mut list = DownloadListView::new();
    list.render_full(&registry, &loc);
    let before = list.clone();

    assert!(list.render_partial(registry.get("a").unwrap(), &loc));
    assert!(list.render_partial(registry.get("a").unwrap(), &loc));

    assert_eq!(list, before);
}

/// After the same update, a partial and a full render agree on every
/// field a partial render owns.
#[test]
fn test_partial_matches_full_render() {
    let loc = loc("en");
    let mut registry = DownloadRegistry::new();
    registry.upsert(job("a", JobStatus::Downloading));
    let mut partial = DownloadListView::new();
    partial.render_full(&registry, &loc);

    let mut updated = job("a", JobStatus::Completed);
    updated.progress = 100.0;
    updated.speed = Some("2.5MiB/s".to_string());
    updated.eta = Some("00:00".to_string());
    updated.updated = updated.created + Duration::minutes(3);
    registry.upsert(updated.clone());

    partial.render_partial(&updated, &loc);
    let mut full = DownloadListView::new();
    full.render_full(&registry, &loc);

    let p = partial.item("a").unwrap();
    let f = full.item("a").unwrap();
    assert_eq!(p.status_label, f.status_label);
    assert_eq!(p.progress_text, f.progress_text);
    assert_eq!(p.speed_text, f.speed_text);
    assert_eq!(p.eta_text, f.eta_text);
    assert_eq!(p.updated_text, f.updated_text);
    assert_eq!(p.actions, f.actions);
    assert_eq!(p.progress_text, "100.0%");
}

#[test]
fn test_partial_render_ignores_unknown_id() {
    let loc = loc("en");
    let mut list = DownloadListView::new();
    list.render_full(&DownloadRegistry::new(), &loc);

    assert!(!list.render_partial(&job("ghost", JobStatus::Downloading), &loc));
    assert!(list.items().is_empty());
}

#[test]
fn test_empty_list_and_count() {
    let loc = loc("en");
    let mut list = DownloadListView::new();
    let mut registry = DownloadRegistry::new();
    list.render_full(&registry, &loc);
    assert_eq!(list.empty_state().unwrap().title, "No downloads yet");
    assert_eq!(list.count_text(), "0 downloads");

    registry.upsert(job("a", JobStatus::Pending));
    list.render_full(&registry, &loc);
    assert!(list.empty_state().is_none());
    assert_eq!(list.count_text(), "1 download");
}

#[test]
fn test_newest_job_listed_first() {
    let loc = loc("en");
    let mut registry = DownloadRegistry::new();
    let old = job("old", JobStatus::Completed);
    let mut new = job("new", JobStatus::Pending);
    new.created = old.created + Duration::hours(1);
    registry.upsert(old);
    registry.upsert(new);

    let mut list = DownloadListView::new();
    list.render_full(&registry, &loc);

    let ids: Vec<&str> = list.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["new", "old"]);
}

#[test]
fn test_failed_item_shows_error_line() {
    let loc = loc("en");
    let mut failed = job("a", JobStatus::Failed);
    failed.error = Some("HTTP 403".to_string());

    let item = render_item(&failed, &loc);

    assert_eq!(item.error_text.as_deref(), Some("Error: HTTP 403"));
    assert_eq!(item.id_line, "ID: a");
    assert_eq!(item.title, "a.mp4");
}
