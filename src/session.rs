//! Interactive `watch` session.
//!
//! One loop owns the App and handles every event in turn: WebSocket pushes,
//! poll ticks, typed commands and the answers of HTTP calls. Every request
//! runs in a spawned task that reports back here, so the registry is only
//! ever touched from this loop and nothing in it waits on the network or
//! on the user.

use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::app::App;
use crate::platform;
use crate::services::event_stream::{run_event_stream, FrameConnector};
use crate::types::errors::{ActionError, TransportError};
use crate::types::events::StreamEvent;
use crate::types::job::Job;
use crate::types::video_info::VideoInfo;
use crate::ui::console::{next_line, parse_command, Command, Console, SharedLines};

pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How often expired banners are swept.
const UI_TICK: Duration = Duration::from_millis(500);

/// Everything the session loop reacts to.
#[derive(Debug)]
pub enum AppEvent {
    Stream(StreamEvent),
    PollResult(Result<Vec<Job>, TransportError>),
    /// The input debounce elapsed for this text.
    LookupDue(String),
    VideoInfo {
        url: String,
        result: Result<VideoInfo, TransportError>,
    },
    Command(Command),
    /// A line typed while a question is open.
    Answer(String),
    Created(Result<Job, TransportError>),
    Loaded(Result<Vec<Job>, TransportError>),
    CancelDone {
        id: String,
        result: Result<(), TransportError>,
    },
    Cleared(Result<String, TransportError>),
    Fetched {
        id: String,
        result: Result<PathBuf, TransportError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

fn log_outcome<T>(action: &str, result: Result<T, ActionError>) {
    if let Err(e) = result {
        debug!(action, error = %e, "action did not complete");
    }
}

/// Runs `call` on the runtime and posts its event back to the loop.
fn spawn_call<F>(tx: &UnboundedSender<AppEvent>, call: F)
where
    F: Future<Output = AppEvent> + Send + 'static,
{
    let tx = tx.clone();
    tokio::spawn(async move {
        // the session may be gone by now
        let _ = tx.send(call.await);
    });
}

/// Fetches the full list; the answer replaces the registry.
pub fn spawn_load(app: &App, tx: &UnboundedSender<AppEvent>) {
    let api = app.api();
    spawn_call(tx, async move { AppEvent::Loaded(api.list_jobs().await) });
}

/// Starts a poll fetch when there is anything to refresh.
pub fn spawn_poll(app: &App, tx: &UnboundedSender<AppEvent>) {
    if !app.poll_due() {
        return;
    }
    let api = app.api();
    spawn_call(tx, async move { AppEvent::PollResult(api.list_jobs().await) });
}

/// Runs one typed command against the App.
pub fn run_command(app: &mut App, command: Command, tx: &UnboundedSender<AppEvent>) -> Flow {
    match command {
        Command::Add { url, format } => {
            let format = format.unwrap_or_else(|| app.form.format.clone());
            match app.begin_download(&url, &format) {
                Ok((url, format)) => {
                    let api = app.api();
                    spawn_call(tx, async move {
                        AppEvent::Created(api.create_job(&url, &format).await)
                    });
                }
                Err(e) => debug!(error = %e, "add refused"),
            }
        }
        Command::Url(text) => app.on_url_input(&text),
        Command::Cancel(id) => {
            let api = app.api();
            spawn_call(tx, async move {
                let result = api.cancel_job(&id).await;
                AppEvent::CancelDone { id, result }
            });
        }
        Command::Clear => app.request_clear(),
        Command::Refresh => spawn_load(app, tx),
        Command::Fetch { id, dir } => {
            let dir: PathBuf = dir.unwrap_or_else(platform::get_download_dir);
            let api = app.api();
            spawn_call(tx, async move {
                let result = api.fetch_file(&id, &dir).await;
                AppEvent::Fetched { id, result }
            });
        }
        Command::Open(id) => app.open_file(&id),
        Command::Settings => app.show_settings(),
        Command::Set { field, value } => {
            if !app.edit_setting(&field, &value) {
                debug!(field = %field, "setting not edited");
            }
        }
        Command::Save => {
            if let Some(result) = app.save_open_settings() {
                log_outcome("save settings", result);
            }
        }
        Command::Help => app.show_help(),
        Command::Close => app.close_modal(),
        Command::Quit => return Flow::Quit,
    }
    Flow::Continue
}

/// Handles one event without waiting on anything. Requests are spawned and
/// answer with another event on `tx`.
pub fn handle_event(app: &mut App, event: AppEvent, tx: &UnboundedSender<AppEvent>) -> Flow {
    match event {
        AppEvent::Stream(event) => app.handle_stream_event(event),
        AppEvent::PollResult(result) => app.handle_poll_snapshot(result),
        AppEvent::LookupDue(url) => {
            if app.should_lookup(&url) {
                let api = app.api();
                spawn_call(tx, async move {
                    let result = api.fetch_video_info(url.trim()).await;
                    AppEvent::VideoInfo { url, result }
                });
            }
        }
        AppEvent::VideoInfo { url, result } => {
            // the user may have typed on since the lookup started
            if url == app.form.url {
                app.apply_video_info(result);
            } else {
                debug!(%url, "dropping stale video info");
            }
        }
        AppEvent::Command(command) => return run_command(app, command, tx),
        AppEvent::Answer(line) => {
            if app.answer_confirm(&line) == Some(true) {
                app.begin_clear();
                let api = app.api();
                spawn_call(tx, async move { AppEvent::Cleared(api.clear_all_jobs().await) });
            }
        }
        AppEvent::Created(result) => log_outcome("add", app.finish_download(result)),
        AppEvent::Loaded(result) => log_outcome("refresh", app.finish_load(result)),
        AppEvent::CancelDone { id, result } => {
            if app.finish_cancel(&id, result).is_ok() {
                spawn_load(app, tx);
            }
        }
        AppEvent::Cleared(result) => log_outcome("clear", app.finish_clear(result)),
        AppEvent::Fetched { id, result } => log_outcome("fetch", app.finish_fetch(&id, result)),
    }
    Flow::Continue
}

/// Runs until `quit` or end of input.
pub async fn run_session<C, W>(
    mut app: App,
    connector: C,
    lines: SharedLines,
    console: &mut Console<W>,
) -> std::io::Result<()>
where
    C: FrameConnector + 'static,
    W: Write,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();
    app.attach_events(tx.clone());

    let (stream_tx, mut stream_rx) = mpsc::unbounded_channel::<StreamEvent>();
    let stream_task = tokio::spawn(run_event_stream(connector, stream_tx));
    let forward_tx = tx.clone();
    let forward_task = tokio::spawn(async move {
        while let Some(event) = stream_rx.recv().await {
            if forward_tx.send(AppEvent::Stream(event)).is_err() {
                break;
            }
        }
    });

    spawn_load(&app, &tx);

    let mut poll = tokio::time::interval(POLL_INTERVAL);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ui_tick = tokio::time::interval(UI_TICK);

    info!("session started");
    loop {
        let event = tokio::select! {
            Some(event) = rx.recv() => event,
            _ = poll.tick() => {
                spawn_poll(&app, &tx);
                continue;
            }
            _ = ui_tick.tick() => {
                app.tick(Instant::now());
                continue;
            }
            line = next_line(&lines) => match line {
                Some(line) if app.awaiting_confirm() => AppEvent::Answer(line),
                Some(line) => match parse_command(&line) {
                    Ok(Some(command)) => AppEvent::Command(command),
                    Ok(None) => continue,
                    Err(e) => {
                        console.line(&e.to_string())?;
                        continue;
                    }
                },
                None => break,
            },
        };

        let flow = handle_event(&mut app, event, &tx);
        console.present(&mut app)?;
        if flow == Flow::Quit {
            break;
        }
    }
    info!("session ended");

    stream_task.abort();
    forward_task.abort();
    Ok(())
}
