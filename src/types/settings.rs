use serde::{Deserialize, Serialize};

use super::errors::ValidationError;

pub const MAX_RETRIES_RANGE: (i64, i64) = (0, 10);
pub const TIMEOUT_RANGE: (i64, i64) = (30, 1800);
pub const MAX_CONCURRENT_RANGE: (i64, i64) = (1, 10);

/// Client-side preferences persisted between runs.
///
/// Field names on disk are camelCase; every field falls back to its own
/// default when missing so older files keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientSettings {
    #[serde(default = "default_download_dir")]
    pub download_dir: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u32,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: u32,
}

fn default_download_dir() -> String {
    "./downloads".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout() -> u32 {
    300
}

fn default_max_concurrent() -> u32 {
    3
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            max_retries: default_max_retries(),
            timeout: default_timeout(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

impl ClientSettings {
    /// Checks every numeric bound, reporting the first one violated.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("maxRetries", i64::from(self.max_retries), MAX_RETRIES_RANGE)?;
        check_range("timeout", i64::from(self.timeout), TIMEOUT_RANGE)?;
        check_range(
            "maxConcurrent",
            i64::from(self.max_concurrent),
            MAX_CONCURRENT_RANGE,
        )?;
        Ok(())
    }

    /// Builds settings from a stored JSON object one field at a time.
    ///
    /// A field that is missing, not a whole number, or out of range falls
    /// back to its default without disturbing the others. Every rejected
    /// field is returned alongside so the caller can report it.
    pub fn from_stored(
        stored: &serde_json::Map<String, serde_json::Value>,
    ) -> (Self, Vec<ValidationError>) {
        let defaults = Self::default();
        let mut rejected = Vec::new();
        let mut number = |field: &'static str, range: (i64, i64), default: u32| {
            let Some(value) = stored.get(field) else {
                return default;
            };
            let checked = value
                .as_i64()
                .ok_or(ValidationError::NotANumber { field })
                .and_then(|n| check_range(field, n, range).map(|()| n as u32));
            match checked {
                Ok(n) => n,
                Err(e) => {
                    rejected.push(e);
                    default
                }
            }
        };

        let max_retries = number("maxRetries", MAX_RETRIES_RANGE, defaults.max_retries);
        let timeout = number("timeout", TIMEOUT_RANGE, defaults.timeout);
        let max_concurrent = number(
            "maxConcurrent",
            MAX_CONCURRENT_RANGE,
            defaults.max_concurrent,
        );
        let download_dir = stored
            .get("downloadDir")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or(defaults.download_dir);

        (
            Self {
                download_dir,
                max_retries,
                timeout,
                max_concurrent,
            },
            rejected,
        )
    }
}

/// Raw form input for the settings dialog, before parsing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SettingsDraft {
    pub download_dir: String,
    pub max_retries: String,
    pub timeout: String,
    pub max_concurrent: String,
}

impl SettingsDraft {
    /// Pre-fills the form from stored settings.
    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self {
            download_dir: settings.download_dir.clone(),
            max_retries: settings.max_retries.to_string(),
            timeout: settings.timeout.to_string(),
            max_concurrent: settings.max_concurrent.to_string(),
        }
    }

    /// Sets one raw field by its on-disk name. Returns `false` for an unknown name.
    pub fn set_field(&mut self, name: &str, value: &str) -> bool {
        let slot = match name {
            "downloadDir" => &mut self.download_dir,
            "maxRetries" => &mut self.max_retries,
            "timeout" => &mut self.timeout,
            "maxConcurrent" => &mut self.max_concurrent,
            _ => return false,
        };
        *slot = value.to_string();
        true
    }

    /// Parses and bounds-checks the draft in field order.
    pub fn parse(&self) -> Result<ClientSettings, ValidationError> {
        let max_retries = parse_bounded("maxRetries", &self.max_retries, MAX_RETRIES_RANGE)?;
        let timeout = parse_bounded("timeout", &self.timeout, TIMEOUT_RANGE)?;
        let max_concurrent =
            parse_bounded("maxConcurrent", &self.max_concurrent, MAX_CONCURRENT_RANGE)?;

        Ok(ClientSettings {
            download_dir: self.download_dir.trim().to_string(),
            max_retries,
            timeout,
            max_concurrent,
        })
    }
}

fn parse_bounded(field: &'static str, raw: &str, range: (i64, i64)) -> Result<u32, ValidationError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::NotANumber { field })?;
    check_range(field, value, range)?;
    // in range, so it fits
    Ok(value as u32)
}

fn check_range(field: &'static str, value: i64, (min, max): (i64, i64)) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange { field, min, max });
    }
    Ok(())
}
