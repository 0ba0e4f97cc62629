// Video Hunter platform paths for macOS
// Config:    ~/Library/Application Support/VideoHunter
// Downloads: ~/Downloads

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

pub fn get_config_dir() -> PathBuf {
    home_dir()
        .join("Library")
        .join("Application Support")
        .join("VideoHunter")
}

pub fn get_download_dir() -> PathBuf {
    home_dir().join("Downloads")
}
