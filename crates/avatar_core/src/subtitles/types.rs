//! Subtitle data types.

use serde::Serialize;

use crate::presets::Preset;

/// One timed subtitle event.
///
/// `text` is ASS markup carrying a `{\kf}` timing tag per word.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitleCue {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    pub text: String,
}

impl SubtitleCue {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Margins of the speech style, in pixels of the script's play resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeechMargins {
    pub left: u32,
    pub right: u32,
    pub vertical: u32,
}

/// Minimum margin on every side.
const MIN_MARGIN: u32 = 20;
/// Padding added inside the content box.
const BOX_PADDING: u32 = 20;

impl SpeechMargins {
    /// Margins that place text inside the preset's content box.
    ///
    /// Returns `None` when the preset has no content box.
    pub fn for_preset(preset: &Preset) -> Option<Self> {
        let content = preset.content_box?;
        let frame_width = preset.resolution.width;

        let right_gap = frame_width.saturating_sub(content.right());
        Some(Self {
            left: (content.x + BOX_PADDING).max(MIN_MARGIN),
            right: (right_gap + BOX_PADDING).max(MIN_MARGIN),
            vertical: (content.y + BOX_PADDING).max(MIN_MARGIN),
        })
    }
}

/// Layout knobs for karaoke cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CueLayout {
    /// Forced line break after this many words.
    pub words_per_line: usize,
    /// Lines per cue.
    pub lines_per_cue: usize,
}

impl Default for CueLayout {
    fn default() -> Self {
        Self {
            words_per_line: 7,
            lines_per_cue: 3,
        }
    }
}

impl CueLayout {
    pub fn words_per_cue(&self) -> usize {
        (self.words_per_line * self.lines_per_cue).max(1)
    }
}
