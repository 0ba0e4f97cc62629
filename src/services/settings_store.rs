// Video Hunter Settings Store
// Loads, validates and saves client settings.
// Settings are stored as a JSON file at the platform-specific config path.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::{ClientSettings, SettingsDraft};

/// Trait defining the settings store interface.
pub trait SettingsStoreTrait {
    fn load(&mut self) -> Result<ClientSettings, SettingsError>;
    fn save(&mut self, draft: &SettingsDraft) -> Result<ClientSettings, SettingsError>;
    fn get_settings(&self) -> &ClientSettings;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings store that persists settings as JSON on disk.
pub struct SettingsStore {
    config_path: String,
    settings: ClientSettings,
}

impl SettingsStore {
    /// Creates a new SettingsStore.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise, uses the platform-specific config directory with `settings.json`.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = match path_override {
            Some(p) => p,
            None => platform::get_config_dir()
                .join("settings.json")
                .to_string_lossy()
                .to_string(),
        };

        Self {
            config_path,
            settings: ClientSettings::default(),
        }
    }

    fn write(&self, settings: &ClientSettings) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::Io(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(settings).map_err(|e| {
            SettingsError::Serialization(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::Io(format!("Failed to write config file: {}", e)))
    }
}

impl SettingsStoreTrait for SettingsStore {
    /// Loads settings from the JSON config file.
    ///
    /// If the file does not exist, returns default settings.
    /// If the file is not a JSON object, returns a serialization error.
    /// Individual fields that are mistyped or out of range are reset to
    /// their defaults with a warning; the rest of the file is kept.
    fn load(&mut self) -> Result<ClientSettings, SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            self.settings = ClientSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::Io(format!("Failed to read config file: {}", e)))?;

        let stored: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&content)
            .map_err(|e| {
                SettingsError::Serialization(format!("Failed to parse config file: {}", e))
            })?;

        let (settings, rejected) = ClientSettings::from_stored(&stored);
        for err in &rejected {
            warn!(path = %self.config_path, error = %err, "stored setting ignored, using default");
        }

        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Parses and validates `draft`, then writes it.
    ///
    /// On a validation failure nothing is written and the in-memory
    /// settings keep their previous value.
    fn save(&mut self, draft: &SettingsDraft) -> Result<ClientSettings, SettingsError> {
        let settings = draft.parse()?;
        self.write(&settings)?;
        info!(path = %self.config_path, "settings saved");
        self.settings = settings;
        Ok(self.settings.clone())
    }

    fn get_settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Restores defaults and persists them.
    fn reset(&mut self) -> Result<(), SettingsError> {
        let defaults = ClientSettings::default();
        self.write(&defaults)?;
        self.settings = defaults;
        Ok(())
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
