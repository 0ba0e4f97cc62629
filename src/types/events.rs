use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::errors::ProtocolError;
use super::job::{empty_as_none, JobStatus};

/// Live progress delta pushed over the WebSocket channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressEvent {
    pub id: String,
    #[serde(default)]
    pub progress: f64,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub speed: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub eta: Option<String>,
    pub status: JobStatus,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub file: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
}

/// A decoded WebSocket frame, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    Progress(ProgressEvent),
    #[serde(other)]
    Other,
}

impl InboundFrame {
    /// Decodes one text frame. Frames with an unrecognised `type` come back
    /// as `Other`; anything that is not a JSON object with a `type` is an error.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
        if value.get("type").and_then(|t| t.as_str()).is_none() {
            return Err(ProtocolError::MissingField("type"));
        }
        serde_json::from_value(value).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
}

/// What the WebSocket task reports to the session loop.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Connected,
    Disconnected,
    Progress(ProgressEvent),
}
