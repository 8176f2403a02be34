//! Avatar Core - media assembly for talking-avatar videos
//!
//! This crate turns per-stage artifacts (prepared avatar image, synthesized
//! speech, raw talking-head clip) into a final composited video. It has no
//! UI dependencies and can be driven by a GUI or the `avatar-video` CLI.

pub mod artifacts;
pub mod config;
pub mod engines;
pub mod logging;
pub mod media;
pub mod models;
pub mod orchestrator;
pub mod presets;
pub mod subtitles;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
