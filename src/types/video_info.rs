use serde::{Deserialize, Serialize};

use super::job::empty_as_none;

/// One downloadable rendition of a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoFormat {
    pub format_id: String,
    #[serde(default, alias = "ext")]
    pub extension: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub resolution: Option<String>,
    #[serde(default)]
    pub filesize: Option<i64>,
    #[serde(default)]
    pub quality: String,
}

/// Metadata returned by the video-info lookup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VideoMetadata {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub formats: Vec<VideoFormat>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
}

impl VideoMetadata {
    /// The format tagged `best`, else the first one listed.
    pub fn best_format(&self) -> Option<&VideoFormat> {
        self.formats
            .iter()
            .find(|f| f.quality == "best")
            .or_else(|| self.formats.first())
    }

    /// Resolution of the best format, falling back to its format id.
    pub fn best_quality(&self) -> Option<&str> {
        self.best_format().map(|f| {
            f.resolution
                .as_deref()
                .filter(|r| !r.is_empty())
                .unwrap_or(f.format_id.as_str())
        })
    }
}

/// Advisory the backend sends instead of metadata for links it cannot
/// handle directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialNotice {
    pub special_note: String,
    #[serde(default)]
    pub solutions: Vec<String>,
    #[serde(default = "default_can_download")]
    pub can_download: bool,
}

fn default_can_download() -> bool {
    true
}

/// Result of a video-info lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoInfo {
    Metadata(VideoMetadata),
    Notice(SpecialNotice),
}

impl VideoInfo {
    /// A body carrying a non-empty `special_note` is a notice; anything else
    /// is read as metadata.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let has_note = value
            .get("special_note")
            .and_then(|v| v.as_str())
            .map(|s| !s.is_empty())
            .unwrap_or(false);
        if has_note {
            Ok(VideoInfo::Notice(serde_json::from_value(value)?))
        } else {
            Ok(VideoInfo::Metadata(serde_json::from_value(value)?))
        }
    }
}
