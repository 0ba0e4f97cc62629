//! Preview of the video behind the typed URL.

use crate::services::localization_engine::LocalizationEngineTrait;
use crate::types::video_info::{SpecialNotice, VideoInfo, VideoMetadata};

/// Formats listed in the preview.
pub const MAX_LISTED_FORMATS: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct FormatRow {
    pub format_id: String,
    pub extension: String,
    pub resolution: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataView {
    pub title: String,
    pub duration: String,
    pub format_count: usize,
    pub best_quality: String,
    pub formats: Vec<FormatRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoticeView {
    pub note: String,
    pub solutions: Vec<String>,
    pub can_download: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum VideoInfoPanel {
    #[default]
    Hidden,
    Metadata(MetadataView),
    Notice(NoticeView),
}

impl VideoInfoPanel {
    pub fn from_info(info: &VideoInfo, loc: &dyn LocalizationEngineTrait) -> Self {
        match info {
            VideoInfo::Metadata(meta) => VideoInfoPanel::Metadata(metadata_view(meta, loc)),
            VideoInfo::Notice(notice) => VideoInfoPanel::Notice(notice_view(notice)),
        }
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, VideoInfoPanel::Hidden)
    }

    /// Only a notice can switch downloading off.
    pub fn allows_download(&self) -> bool {
        match self {
            VideoInfoPanel::Notice(notice) => notice.can_download,
            _ => true,
        }
    }
}

fn metadata_view(meta: &VideoMetadata, loc: &dyn LocalizationEngineTrait) -> MetadataView {
    let unknown = loc.t("info.unknown", None);
    MetadataView {
        title: meta.title.clone().unwrap_or_else(|| unknown.clone()),
        duration: meta.duration.clone().unwrap_or_else(|| unknown.clone()),
        format_count: meta.formats.len(),
        best_quality: meta
            .best_quality()
            .map(str::to_string)
            .unwrap_or_else(|| unknown.clone()),
        formats: meta
            .formats
            .iter()
            .take(MAX_LISTED_FORMATS)
            .map(|f| FormatRow {
                format_id: f.format_id.clone(),
                extension: f.extension.clone(),
                resolution: f.resolution.clone().unwrap_or_else(|| unknown.clone()),
            })
            .collect(),
    }
}

fn notice_view(notice: &SpecialNotice) -> NoticeView {
    NoticeView {
        note: notice.special_note.clone(),
        solutions: notice.solutions.clone(),
        can_download: notice.can_download,
    }
}
