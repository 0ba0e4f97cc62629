use thiserror::Error;

// === TransportError ===

/// Failures talking to the backend over HTTP or the WebSocket channel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },
    /// The request never completed (DNS, connect, reset, timeout).
    #[error("network error: {0}")]
    Network(String),
    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
    /// Writing a fetched file to disk failed.
    #[error("file error: {0}")]
    Io(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return TransportError::Decode(err.to_string());
        }
        match err.status() {
            Some(status) => TransportError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            },
            None => TransportError::Network(err.to_string()),
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err.to_string())
    }
}

// === ValidationError ===

/// User input rejected before any request or write happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The URL field was empty or whitespace.
    #[error("a video URL is required")]
    EmptyUrl,
    /// A numeric settings field did not hold a whole number.
    #[error("{field} must be a whole number")]
    NotANumber { field: &'static str },
    /// A numeric settings field was outside its allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
}

// === ProtocolError ===

/// A WebSocket frame that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The frame was not valid JSON or did not match the expected shape.
    #[error("malformed frame: {0}")]
    Malformed(String),
    /// A required field was absent.
    #[error("frame is missing the `{0}` field")]
    MissingField(&'static str),
}

// === SettingsError ===

/// Errors related to the persisted settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("settings I/O error: {0}")]
    Io(String),
    /// Failed to serialize or deserialize settings.
    #[error("settings serialization error: {0}")]
    Serialization(String),
    /// The submitted values failed validation; nothing was written.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

// === LocaleError ===

/// Errors related to localization catalogs.
#[derive(Debug, Error)]
pub enum LocaleError {
    /// The requested locale is not supported.
    #[error("unsupported locale: {0}")]
    UnsupportedLocale(String),
    /// The locale file or directory was not found.
    #[error("locale file not found: {0}")]
    FileNotFound(String),
    /// A catalog was found but is not valid JSON.
    #[error("failed to parse locale catalog {0}")]
    Parse(String),
}

// === ActionError ===

/// Why a user action did not go through. The App has already shown a
/// notification by the time one of these is returned.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// A special notice marked the current link as not downloadable.
    #[error("downloading is disabled for this link")]
    DownloadDisabled,
}
