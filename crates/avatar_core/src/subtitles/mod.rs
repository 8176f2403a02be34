//! Karaoke subtitle generation.
//!
//! Turns a script and the duration of its synthesized speech into
//! word-timed ASS cues that fit a preset's content box.
//!
//! # Components
//!
//! - **types**: cue and layout types
//! - **karaoke**: tokenizing, word weighting and cue timing (pure)
//! - **ass**: ASS document rendering and file output
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//! use avatar_core::presets::get_preset;
//! use avatar_core::subtitles::write_karaoke_ass;
//!
//! let preset = get_preset("news_anchor").unwrap();
//! let written = write_karaoke_ass("Hello and welcome.", 2.4, preset, Path::new("speech.ass"))?;
//! # Ok::<(), avatar_core::subtitles::SubtitleError>(())
//! ```

mod ass;
mod error;
mod karaoke;
mod types;

pub use ass::{format_ass_time, render_ass, write_karaoke_ass};
pub use error::{SubtitleError, SubtitleResult};
pub use karaoke::{
    allocate_durations, build_cues, build_cues_with_layout, escape_ass_text, tokenize, word_weight,
};
pub use types::{CueLayout, SpeechMargins, SubtitleCue};
