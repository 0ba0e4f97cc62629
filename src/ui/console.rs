//! Terminal front end: prints view models and reads commands.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tracing::warn;

use crate::app::{App, Repaint};
use crate::services::localization_engine::{params, LocalizationEngineTrait};
use crate::ui::download_list::DownloadListView;
use crate::ui::modal::{is_affirmative, ConfirmDialog, ConfirmPrompt, ModalState};
use crate::ui::notifications::{Notification, NotificationKind};
use crate::ui::video_info_panel::VideoInfoPanel;
use crate::ui::view::JobItemView;

const BAR_WIDTH: usize = 20;

// === Commands ===

/// One line typed during a `watch` session.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add { url: String, format: Option<String> },
    Url(String),
    Cancel(String),
    Clear,
    Refresh,
    Fetch { id: String, dir: Option<PathBuf> },
    Open(String),
    Settings,
    Set { field: String, value: String },
    Save,
    Help,
    Close,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command `{0}`, type `help` for the list")]
    Unknown(String),
    #[error("`{command}` needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
}

/// Parses one input line. Blank lines give `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let mut args = rest.split_whitespace();

    let command = match word.to_lowercase().as_str() {
        "add" => {
            let url = args.next().ok_or(CommandError::MissingArgument {
                command: "add",
                argument: "a URL",
            })?;
            Command::Add {
                url: url.to_string(),
                format: args.next().map(str::to_string),
            }
        }
        "url" => Command::Url(rest.to_string()),
        "cancel" => Command::Cancel(required(args.next(), "cancel", "a job id")?),
        "clear" => Command::Clear,
        "refresh" | "list" => Command::Refresh,
        "fetch" => Command::Fetch {
            id: required(args.next(), "fetch", "a job id")?,
            dir: args.next().map(PathBuf::from),
        },
        "open" => Command::Open(required(args.next(), "open", "a job id")?),
        "settings" => Command::Settings,
        "set" => {
            let field = required(args.next(), "set", "a field name")?;
            let value = rest
                .split_once(char::is_whitespace)
                .map(|(_, v)| v.trim().to_string())
                .unwrap_or_default();
            Command::Set { field, value }
        }
        "save" => Command::Save,
        "help" | "?" => Command::Help,
        "close" => Command::Close,
        "quit" | "exit" => Command::Quit,
        _ => return Err(CommandError::Unknown(word.to_string())),
    };
    Ok(Some(command))
}

fn required(
    arg: Option<&str>,
    command: &'static str,
    argument: &'static str,
) -> Result<String, CommandError> {
    arg.map(str::to_string)
        .ok_or(CommandError::MissingArgument { command, argument })
}

// === Input ===

/// Stdin lines shared by the session loop and the confirm prompt.
pub type SharedLines = Arc<Mutex<mpsc::UnboundedReceiver<String>>>;

/// Starts a reader thread that forwards stdin line by line.
///
/// Runs on a plain thread: a read still pending at `quit` must not hold
/// up runtime shutdown.
pub fn spawn_stdin_lines() -> SharedLines {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "stdin read failed");
                    break;
                }
            }
        }
    });
    Arc::new(Mutex::new(rx))
}

/// Waits for the next line; `None` once stdin is closed.
pub async fn next_line(lines: &SharedLines) -> Option<String> {
    lines.lock().await.recv().await
}

/// Confirms by reading the answer from stdin. The question is written to
/// `out`, which is stdout for the binary.
pub struct LineConfirm {
    lines: SharedLines,
    out: std::sync::Mutex<Box<dyn Write + Send>>,
}

impl LineConfirm {
    pub fn new(lines: SharedLines, out: impl Write + Send + 'static) -> Self {
        Self {
            lines,
            out: std::sync::Mutex::new(Box::new(out)),
        }
    }

    fn ask(&self, dialog: &ConfirmDialog) -> io::Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| io::Error::other("prompt writer poisoned"))?;
        write!(out, "{}> ", format_confirm(dialog))?;
        out.flush()
    }
}

#[async_trait]
impl ConfirmPrompt for LineConfirm {
    async fn confirm(&self, dialog: &ConfirmDialog) -> bool {
        if let Err(e) = self.ask(dialog) {
            warn!(error = %e, "could not show confirmation");
            return false;
        }
        match next_line(&self.lines).await {
            Some(answer) => is_affirmative(&answer, &dialog.confirm_label),
            None => false,
        }
    }
}

// === Output ===

pub fn progress_bar(width_percent: f64) -> String {
    let filled = ((width_percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn join_nonempty(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("  ")
}

/// Full block for one list item.
pub fn format_item(item: &JobItemView, loc: &dyn LocalizationEngineTrait) -> String {
    let mut out = format!("{} {}  [{}]\n", item.icon, item.title, item.status_label);
    out.push_str(&format!("    {}\n", item.id_line));
    let bar = progress_bar(item.progress_width);
    out.push_str(&format!(
        "    {}\n",
        join_nonempty(&[
            bar.as_str(),
            item.progress_text.as_str(),
            item.speed_text.as_str(),
            item.eta_text.as_str(),
        ])
    ));
    let created = loc.t("list.created", Some(&params(&[("time", item.created_text.as_str())])));
    let updated = loc.t("list.updated", Some(&params(&[("time", item.updated_text.as_str())])));
    out.push_str(&format!("    {}  ·  {}\n", created, updated));
    if !item.actions.is_empty() {
        let labels: Vec<&str> = item.actions.iter().map(|a| a.label.as_str()).collect();
        out.push_str(&format!("    > {}\n", labels.join(" | ")));
    }
    if let Some(error) = &item.error_text {
        out.push_str(&format!("    ! {}\n", error));
    }
    out
}

/// One-line update printed when a single item changes.
pub fn format_item_update(item: &JobItemView) -> String {
    let bar = progress_bar(item.progress_width);
    let line = join_nonempty(&[
        item.icon,
        item.title.as_str(),
        bar.as_str(),
        item.progress_text.as_str(),
        item.speed_text.as_str(),
        item.eta_text.as_str(),
    ]);
    format!("{}  [{}]", line, item.status_label)
}

pub fn format_list(list: &DownloadListView, loc: &dyn LocalizationEngineTrait) -> String {
    let mut out = format!("== {} ({}) ==\n", loc.t("list.title", None), list.count_text());
    if let Some(empty) = list.empty_state() {
        out.push_str(&format!("  {}\n  {}\n", empty.title, empty.hint));
        return out;
    }
    for item in list.items() {
        out.push_str(&format_item(item, loc));
    }
    out
}

pub fn format_panel(panel: &VideoInfoPanel, loc: &dyn LocalizationEngineTrait) -> Option<String> {
    match panel {
        VideoInfoPanel::Hidden => None,
        VideoInfoPanel::Metadata(meta) => {
            let mut out = format!("{}: {}\n", loc.t("info.title", None), meta.title);
            out.push_str(&format!("{}: {}\n", loc.t("info.duration", None), meta.duration));
            out.push_str(&format!(
                "{}: {}\n",
                loc.t("info.format_count", None),
                meta.format_count
            ));
            out.push_str(&format!(
                "{}: {}\n",
                loc.t("info.best_quality", None),
                meta.best_quality
            ));
            if !meta.formats.is_empty() {
                out.push_str(&format!("{}:\n", loc.t("info.available_formats", None)));
                for f in &meta.formats {
                    out.push_str(&format!(
                        "  {:<12} {:<6} {}\n",
                        f.format_id, f.extension, f.resolution
                    ));
                }
            }
            Some(out)
        }
        VideoInfoPanel::Notice(notice) => {
            let mut out = format!("! {}\n", notice.note);
            for solution in &notice.solutions {
                out.push_str(&format!("  - {}\n", solution));
            }
            Some(out)
        }
    }
}

/// The question, its message and the two answers.
pub fn format_confirm(dialog: &ConfirmDialog) -> String {
    format!(
        "== {} ==\n{}\n[y] {} / [N] {}\n",
        dialog.title, dialog.message, dialog.confirm_label, dialog.cancel_label
    )
}

pub fn format_modal(modal: &ModalState, loc: &dyn LocalizationEngineTrait) -> Option<String> {
    match modal {
        ModalState::Closed => None,
        ModalState::Help => Some(format!(
            "== {} ==\n{}\n",
            loc.t("help.title", None),
            loc.t("help.body", None)
        )),
        ModalState::Settings(draft) => {
            let rows = [
                ("downloadDir", "settings.download_dir", &draft.download_dir),
                ("maxRetries", "settings.max_retries", &draft.max_retries),
                ("timeout", "settings.timeout", &draft.timeout),
                ("maxConcurrent", "settings.max_concurrent", &draft.max_concurrent),
            ];
            let mut out = format!("== {} ==\n", loc.t("settings.title", None));
            for (field, label_key, value) in rows {
                let label = loc.t(label_key, None);
                out.push_str(&format!("  {:<14} {:<26} {}\n", field, label, value));
            }
            Some(out)
        }
        ModalState::Confirm(dialog) => Some(format_confirm(dialog)),
    }
}

pub fn format_notification(notification: &Notification) -> String {
    let marker = match notification.kind {
        NotificationKind::Success => "✓",
        NotificationKind::Error => "✗",
        NotificationKind::Warning => "!",
        NotificationKind::Info => "i",
    };
    format!("[{}] {}", marker, notification.message)
}

/// Drops repaints made redundant by a full list render, keeping order.
pub fn coalesce(repaints: Vec<Repaint>) -> Vec<Repaint> {
    let full = repaints.contains(&Repaint::List);
    let mut out: Vec<Repaint> = Vec::new();
    for repaint in repaints {
        let redundant = full && matches!(repaint, Repaint::Item(_) | Repaint::Count);
        if !redundant && !out.contains(&repaint) {
            out.push(repaint);
        }
    }
    out
}

/// Writes whatever changed in the App since the last call.
pub struct Console<W: Write> {
    out: W,
}

impl Console<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)
    }

    pub fn present(&mut self, app: &mut App) -> io::Result<()> {
        let repaints = coalesce(app.take_repaints());
        let loc = &app.localization_engine;
        for repaint in repaints {
            match repaint {
                Repaint::List => write!(self.out, "{}", format_list(&app.list, loc))?,
                Repaint::Item(id) => {
                    if let Some(item) = app.list.item(&id) {
                        writeln!(self.out, "{}", format_item_update(item))?;
                    }
                }
                Repaint::Count => writeln!(self.out, "== {} ==", app.list.count_text())?,
                Repaint::Panel => {
                    if let Some(text) = format_panel(&app.panel, loc) {
                        write!(self.out, "{}", text)?;
                    }
                }
                Repaint::Modal => {
                    if let Some(text) = format_modal(&app.modal, loc) {
                        write!(self.out, "{}", text)?;
                    }
                }
                Repaint::Loading => {
                    if let Some(text) = &app.loading {
                        writeln!(self.out, "… {}", text)?;
                    }
                }
            }
        }
        for notification in app.notifications.take_unannounced() {
            writeln!(self.out, "{}", format_notification(&notification))?;
        }
        self.out.flush()
    }
}
