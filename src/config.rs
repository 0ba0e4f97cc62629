//! Command line and environment configuration.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use thiserror::Error;
use url::Url;

use crate::services::localization_engine::{LocalizationEngine, LocalizationEngineTrait};
use crate::types::errors::LocaleError;

pub const DEFAULT_SERVER: &str = "http://localhost:8080";

#[derive(Debug, Parser)]
#[command(
    name = "videohunter",
    version,
    about = "Terminal client for the Video Hunter download server"
)]
pub struct Cli {
    /// Base URL of the backend.
    #[arg(
        long,
        value_name = "URL",
        env = "VIDEOHUNTER_SERVER",
        default_value = DEFAULT_SERVER,
        global = true
    )]
    pub server: String,

    /// Interface language (en or zh). Detected from LANG when absent.
    #[arg(long, value_name = "LANG", env = "VIDEOHUNTER_LOCALE", global = true)]
    pub locale: Option<String>,

    /// Settings file to use instead of the one in the config directory.
    #[arg(long = "settings", value_name = "PATH", global = true)]
    pub settings_file: Option<PathBuf>,

    /// Directory with en.json / zh.json overriding the bundled texts.
    #[arg(long, value_name = "DIR", global = true)]
    pub locales_dir: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum CliCommand {
    /// Follow downloads live and type commands (default).
    Watch,
    /// Start downloading a video.
    Add {
        url: String,
        #[arg(short, long, default_value = "best")]
        format: String,
    },
    /// Show all download jobs.
    List,
    /// Cancel a running download.
    Cancel { id: String },
    /// Remove every download record.
    Clear {
        /// Skip the confirmation question.
        #[arg(short, long)]
        yes: bool,
    },
    /// Show title, duration and formats of a video.
    Info { url: String },
    /// Save a finished file locally.
    Fetch {
        id: String,
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },
    /// Show or change client settings.
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum SettingsCommand {
    Show,
    Set {
        #[arg(long)]
        download_dir: Option<String>,
        #[arg(long)]
        max_retries: Option<String>,
        #[arg(long)]
        timeout: Option<String>,
        #[arg(long)]
        max_concurrent: Option<String>,
    },
    Reset,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid server URL `{url}`: {reason}")]
    InvalidServer { url: String, reason: String },
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server: Url,
    pub locale: Option<String>,
    pub settings_path: Option<String>,
    pub locales_dir: Option<PathBuf>,
}

impl ClientConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let server = Url::parse(cli.server.trim()).map_err(|e| ConfigError::InvalidServer {
            url: cli.server.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(server.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidServer {
                url: cli.server.clone(),
                reason: "scheme must be http or https".to_string(),
            });
        }

        Ok(Self {
            server,
            locale: cli.locale.clone().filter(|l| !l.trim().is_empty()),
            settings_path: cli
                .settings_file
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
            locales_dir: cli.locales_dir.clone(),
        })
    }

    /// Loads the catalogs and picks the requested or detected locale.
    pub fn localizer(&self) -> Result<LocalizationEngine, LocaleError> {
        let mut engine = match &self.locales_dir {
            Some(dir) => LocalizationEngine::new(dir),
            None => LocalizationEngine::builtin(),
        };
        engine.initialize()?;
        let locale = match &self.locale {
            Some(locale) => locale.clone(),
            None => engine.detect_system_locale(),
        };
        engine.set_locale(&locale)?;
        Ok(engine)
    }
}

/// Default tracing filter for a `-v` count; `RUST_LOG` overrides it.
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
