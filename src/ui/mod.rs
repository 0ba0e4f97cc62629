//! Video Hunter UI layer.
//!
//! View models for the download list, the video info panel, dialogs and
//! notifications, plus the terminal console that prints them and reads
//! commands.

pub mod console;
pub mod download_list;
pub mod modal;
pub mod notifications;
pub mod video_info_panel;
pub mod view;
