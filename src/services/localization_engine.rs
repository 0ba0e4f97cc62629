use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::types::errors::LocaleError;

/// Supported locales.
const SUPPORTED_LOCALES: &[&str] = &["en", "zh"];

/// Default locale when system locale is not supported.
const DEFAULT_LOCALE: &str = "en";

const BUILTIN_EN: &str = include_str!("../../locales/en.json");
const BUILTIN_ZH: &str = include_str!("../../locales/zh.json");

/// Trait defining the localization engine interface.
pub trait LocalizationEngineTrait {
    fn initialize(&mut self) -> Result<(), LocaleError>;
    fn set_locale(&mut self, lang: &str) -> Result<(), LocaleError>;
    fn get_locale(&self) -> &str;
    fn t(&self, key: &str, params: Option<&HashMap<String, String>>) -> String;
    fn plural(&self, key: &str, count: u64, params: Option<&HashMap<String, String>>) -> String;
    fn detect_system_locale(&self) -> String;
    fn get_available_locales(&self) -> Vec<String>;
}

/// Builds an interpolation map from `(name, value)` pairs.
pub fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Localization engine holding the English and Chinese catalogs.
pub struct LocalizationEngine {
    /// Current active locale (e.g., "en" or "zh").
    current_locale: String,
    /// Loaded locale data: maps locale name to its parsed JSON value.
    locales: HashMap<String, Value>,
    /// Directory with locale JSON files; `None` means the bundled catalogs.
    locales_dir: Option<PathBuf>,
}

impl LocalizationEngine {
    /// Creates an engine that loads `<dir>/<locale>.json` on `initialize`.
    pub fn new(locales_dir: impl Into<PathBuf>) -> Self {
        Self {
            current_locale: DEFAULT_LOCALE.to_string(),
            locales: HashMap::new(),
            locales_dir: Some(locales_dir.into()),
        }
    }

    /// Creates an engine backed by the catalogs compiled into the binary.
    pub fn builtin() -> Self {
        Self {
            current_locale: DEFAULT_LOCALE.to_string(),
            locales: HashMap::new(),
            locales_dir: None,
        }
    }

    /// Looks up a nested key in a JSON value using dot notation.
    /// For example, "status.pending" looks up `value["status"]["pending"]`.
    fn lookup_key<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
        let mut current = data;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Replaces `{param_name}` placeholders in a string with values from the params map.
    fn interpolate(template: &str, params: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in params {
            let placeholder = format!("{{{}}}", key);
            result = result.replace(&placeholder, value);
        }
        result
    }

    /// Chinese has a single plural form.
    fn chinese_plural_form(_count: u64) -> &'static str {
        "other"
    }

    /// Determines the English plural form for a given count.
    /// Returns one of: "one", "other".
    fn english_plural_form(count: u64) -> &'static str {
        if count == 1 {
            "one"
        } else {
            "other"
        }
    }

    /// Returns the plural form suffix for the current locale.
    fn get_plural_form(&self, count: u64) -> &'static str {
        match self.current_locale.as_str() {
            "zh" => Self::chinese_plural_form(count),
            _ => Self::english_plural_form(count),
        }
    }

    fn load_builtin(&mut self) -> Result<(), LocaleError> {
        for (locale, raw) in [("en", BUILTIN_EN), ("zh", BUILTIN_ZH)] {
            let data: Value = serde_json::from_str(raw)
                .map_err(|e| LocaleError::Parse(format!("builtin {}: {}", locale, e)))?;
            self.locales.insert(locale.to_string(), data);
        }
        Ok(())
    }
}

impl LocalizationEngineTrait for LocalizationEngine {
    /// Loads the catalogs, either from the bundled copies or from disk.
    fn initialize(&mut self) -> Result<(), LocaleError> {
        let dir = match &self.locales_dir {
            Some(dir) => dir.clone(),
            None => return self.load_builtin(),
        };

        if !dir.exists() {
            return Err(LocaleError::FileNotFound(dir.to_string_lossy().to_string()));
        }

        for locale in SUPPORTED_LOCALES {
            let file_path = dir.join(format!("{}.json", locale));
            if file_path.exists() {
                let content = fs::read_to_string(&file_path).map_err(|e| {
                    LocaleError::FileNotFound(format!("{}: {}", file_path.to_string_lossy(), e))
                })?;
                let data: Value = serde_json::from_str(&content).map_err(|e| {
                    LocaleError::Parse(format!("{}: {}", file_path.to_string_lossy(), e))
                })?;
                self.locales.insert(locale.to_string(), data);
            }
        }

        // At least one locale must be loaded
        if self.locales.is_empty() {
            return Err(LocaleError::FileNotFound("No locale files found".to_string()));
        }

        Ok(())
    }

    /// Switches the active locale. Returns an error if the locale is not supported
    /// or not loaded.
    fn set_locale(&mut self, lang: &str) -> Result<(), LocaleError> {
        if !SUPPORTED_LOCALES.contains(&lang) {
            return Err(LocaleError::UnsupportedLocale(lang.to_string()));
        }
        if !self.locales.contains_key(lang) {
            return Err(LocaleError::FileNotFound(format!("Locale '{}' not loaded", lang)));
        }
        self.current_locale = lang.to_string();
        Ok(())
    }

    fn get_locale(&self) -> &str {
        &self.current_locale
    }

    /// Looks up a translation key using dot notation and optionally interpolates parameters.
    /// Returns the key itself if the translation is not found.
    fn t(&self, key: &str, params: Option<&HashMap<String, String>>) -> String {
        let text = self
            .locales
            .get(&self.current_locale)
            .and_then(|data| Self::lookup_key(data, key))
            .and_then(|v| v.as_str());

        match (text, params) {
            (Some(text), Some(p)) => Self::interpolate(text, p),
            (Some(text), None) => text.to_string(),
            (None, _) => key.to_string(),
        }
    }

    /// Looks up `<key>_<form>` for the count, falling back to `<key>_other`.
    /// A `{count}` parameter is added automatically.
    fn plural(&self, key: &str, count: u64, params: Option<&HashMap<String, String>>) -> String {
        let form = self.get_plural_form(count);
        let plural_key = format!("{}_{}", key, form);

        let mut merged_params = params.cloned().unwrap_or_default();
        merged_params
            .entry("count".to_string())
            .or_insert_with(|| count.to_string());

        let result = self.t(&plural_key, Some(&merged_params));
        if result != plural_key {
            return result;
        }

        let other_key = format!("{}_other", key);
        let other_result = self.t(&other_key, Some(&merged_params));
        if other_result == other_key {
            return key.to_string();
        }
        other_result
    }

    /// Detects the system locale from `LANG` ("zh_CN.UTF-8" -> "zh").
    /// Falls back to "en" when unsupported.
    fn detect_system_locale(&self) -> String {
        let lang = std::env::var("LANG").unwrap_or_default();
        let lang_code = lang
            .split('_')
            .next()
            .unwrap_or("")
            .split('.')
            .next()
            .unwrap_or("");

        if SUPPORTED_LOCALES.contains(&lang_code) {
            lang_code.to_string()
        } else {
            DEFAULT_LOCALE.to_string()
        }
    }

    fn get_available_locales(&self) -> Vec<String> {
        let mut locales: Vec<String> = self.locales.keys().cloned().collect();
        locales.sort();
        locales
    }
}
