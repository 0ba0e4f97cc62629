//! Video Hunter: terminal client for a video download server.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod config;
pub mod managers;
pub mod platform;
pub mod services;
pub mod session;
pub mod types;
pub mod ui;
