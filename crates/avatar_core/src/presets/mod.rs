//! Scene presets and their procedural backgrounds.
//!
//! - [`registry`]: the static preset catalog and key resolution
//! - [`style`]: background style recipes
//! - [`background`]: cached background generation
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use avatar_core::presets::{render_background, resolve_effective_preset};
//!
//! if let Some(preset) = resolve_effective_preset(Some("News Anchor"), Some("teacher")) {
//!     let bg = render_background(preset, Path::new("outputs/backgrounds"), None).unwrap();
//!     println!("{} -> {}", preset.key, bg.display());
//! }
//! ```

mod background;
mod registry;
mod style;

pub use background::{background_cache_path, draw_background, render_background};
pub use registry::{
    effective_preset_key, get_preset, is_raw_sentinel, list_presets, resolve_effective_preset,
    resolve_preset_key, Preset,
};
pub use style::{BackgroundStyle, Rgb, StyleRecipe};
