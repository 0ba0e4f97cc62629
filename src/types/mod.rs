// Video Hunter shared type definitions
// Each submodule defines types used across the client.

pub mod errors;
pub mod events;
pub mod job;
pub mod settings;
pub mod video_info;
