//! Video Hunter terminal client.
//!
//! `watch` (the default) follows downloads live; the other subcommands run
//! one action against the backend, print the result and exit.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use videohunter::app::App;
use videohunter::config::{log_filter, Cli, CliCommand, ClientConfig, SettingsCommand};
use videohunter::platform;
use videohunter::services::api_client::HttpDownloadApi;
use videohunter::services::event_stream::{ws_url_for, TungsteniteConnector};
use videohunter::services::localization_engine::LocalizationEngineTrait;
use videohunter::services::settings_store::{SettingsStore, SettingsStoreTrait};
use videohunter::session::run_session;
use videohunter::types::settings::SettingsDraft;
use videohunter::ui::console::{spawn_stdin_lines, Console, LineConfirm};
use videohunter::ui::modal::{ConfirmPrompt, FixedAnswer};
use videohunter::ui::video_info_panel::VideoInfoPanel;

fn init_tracing(verbose: u8) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = ClientConfig::from_cli(&cli)?;
    let localizer = config.localizer().context("failed to load translations")?;

    let mut settings_store = SettingsStore::new(config.settings_path.clone());
    if let Err(e) = settings_store.load() {
        warn!(
            path = settings_store.get_config_path(),
            error = %e,
            "using default settings"
        );
    }

    let api = Arc::new(
        HttpDownloadApi::new(config.server.clone()).context("failed to build the HTTP client")?,
    );
    let command = cli.command.clone().unwrap_or(CliCommand::Watch);

    let lines = match command {
        CliCommand::Watch | CliCommand::Clear { yes: false } => Some(spawn_stdin_lines()),
        _ => None,
    };
    // `watch` answers its questions inside the session loop
    let confirm: Box<dyn ConfirmPrompt> = match (&command, &lines) {
        (CliCommand::Clear { yes: true }, _) => Box::new(FixedAnswer(true)),
        (CliCommand::Clear { yes: false }, Some(lines)) => {
            Box::new(LineConfirm::new(lines.clone(), std::io::stdout()))
        }
        _ => Box::new(FixedAnswer(false)),
    };

    let mut app = App::new(api, confirm, localizer, settings_store);
    let mut console = Console::stdout();
    info!(server = %config.server, locale = app.localization_engine.get_locale(), "starting");

    let ok = match command {
        CliCommand::Watch => {
            let connector = TungsteniteConnector::new(ws_url_for(&config.server)?);
            let lines = lines.unwrap_or_else(spawn_stdin_lines);
            run_session(app, connector, lines, &mut console).await?;
            return Ok(ExitCode::SUCCESS);
        }
        CliCommand::Add { url, format } => app.start_download(&url, &format).await.is_ok(),
        CliCommand::List => app.load_downloads().await.is_ok(),
        CliCommand::Cancel { id } => app.cancel_download(&id).await.is_ok(),
        CliCommand::Clear { .. } => app.clear_all_downloads().await.is_ok(),
        CliCommand::Info { url } => {
            app.form.url = url.clone();
            app.lookup_video_info(&url).await;
            if matches!(app.panel, VideoInfoPanel::Hidden) {
                let text = app.localization_engine.t("info.unavailable", None);
                console.line(&text)?;
            }
            true
        }
        CliCommand::Fetch { id, output } => {
            let dir = output.unwrap_or_else(platform::get_download_dir);
            app.trigger_file_download(&id, &dir).await.is_ok()
        }
        CliCommand::Settings { action } => match action {
            SettingsCommand::Show => {
                app.show_settings();
                true
            }
            SettingsCommand::Set {
                download_dir,
                max_retries,
                timeout,
                max_concurrent,
            } => {
                let mut draft = SettingsDraft::from_settings(app.settings_store.get_settings());
                let edits = [
                    ("downloadDir", download_dir),
                    ("maxRetries", max_retries),
                    ("timeout", timeout),
                    ("maxConcurrent", max_concurrent),
                ];
                for (field, value) in edits {
                    if let Some(value) = value {
                        draft.set_field(field, &value);
                    }
                }
                app.save_settings(&draft).is_ok()
            }
            SettingsCommand::Reset => app.reset_settings().is_ok(),
        },
    };

    console.present(&mut app)?;
    Ok(exit_code(ok))
}
