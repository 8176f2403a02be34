//! Configuration management.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Environment overrides for a fixed subset of keys
//!
//! # Example
//!
//! ```no_run
//! use avatar_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new("avatar.toml");
//! config.load_or_create().unwrap();
//!
//! // Settings a run should use (file + environment overrides)
//! let settings = config.effective_settings();
//! println!("Output folder: {}", settings.paths.output_folder);
//!
//! config.settings_mut().chunking.chunk_seconds = 45;
//! config.update_section(ConfigSection::Chunking).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ChunkingSettings, CompositionSettings, ConfigSection, EncodingSettings, ImageSettings,
    LoggingSettings, PathSettings, RendererSettings, Settings, ToolSettings, TtsSettings,
    ENV_ECHO_MIMIC_DIR, ENV_ECHO_MIMIC_WEIGHTS, ENV_FFMPEG_PATH, ENV_FFPROBE_PATH,
    ENV_RENDER_ENGINE,
};
