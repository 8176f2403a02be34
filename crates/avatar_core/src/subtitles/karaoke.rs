//! Word-weighted karaoke cue timing.
//!
//! The audio duration is distributed across the script's words in
//! proportion to a per-word weight, so longer or punctuated words hold
//! the highlight longer. Words are grouped into fixed-size cues and each
//! word carries a `{\kf}` tag with its duration in centiseconds.
//!
//! The output is fully deterministic for a given script, duration and
//! preset.

use super::types::{CueLayout, SubtitleCue};
use crate::presets::Preset;

/// Weight per alphanumeric character.
const CHAR_WEIGHT: f64 = 0.35;
/// Floor for a single word's weight.
const MIN_WORD_WEIGHT: f64 = 1.0;
/// Extra weight for words ending a clause.
const PAUSE_BONUS: f64 = 0.8;
/// Punctuation that earns the pause bonus when trailing a word.
const PAUSE_MARKS: [char; 6] = ['.', ',', ';', ':', '!', '?'];
/// Guards the weight sum against division by zero.
const MIN_TOTAL_WEIGHT: f64 = 1e-6;

/// Split a script into words.
///
/// All whitespace (including newlines) separates words; punctuation stays
/// attached to its word.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Relative speaking weight of one word.
pub fn word_weight(word: &str) -> f64 {
    let alnum = word.chars().filter(|c| c.is_ascii_alphanumeric()).count();
    let mut weight = (alnum as f64 * CHAR_WEIGHT).max(MIN_WORD_WEIGHT);
    if word.ends_with(PAUSE_MARKS) {
        weight += PAUSE_BONUS;
    }
    weight
}

/// Distribute `total` seconds across words in proportion to their weight.
pub fn allocate_durations(words: &[&str], total: f64) -> Vec<f64> {
    let weights: Vec<f64> = words.iter().map(|w| word_weight(w)).collect();
    let sum = weights.iter().sum::<f64>().max(MIN_TOTAL_WEIGHT);
    weights.iter().map(|w| total * (w / sum)).collect()
}

/// Build karaoke cues for a script spoken over `duration` seconds.
///
/// Returns `None` when there is nothing to show: blank script, a preset
/// without a content box, no words, or a non-positive duration.
pub fn build_cues(script: &str, duration: f64, preset: &Preset) -> Option<Vec<SubtitleCue>> {
    build_cues_with_layout(script, duration, preset, CueLayout::default())
}

/// [`build_cues`] with an explicit cue layout.
pub fn build_cues_with_layout(
    script: &str,
    duration: f64,
    preset: &Preset,
    layout: CueLayout,
) -> Option<Vec<SubtitleCue>> {
    if script.trim().is_empty() || !preset.has_subtitles() {
        return None;
    }

    let words = tokenize(script);
    if words.is_empty() || duration.is_nan() || duration <= 0.0 {
        return None;
    }

    let durations = allocate_durations(&words, duration);
    let per_cue = layout.words_per_cue();

    let mut cues = Vec::with_capacity(words.len().div_ceil(per_cue));
    let mut t = 0.0;
    for (chunk_words, chunk_durations) in words.chunks(per_cue).zip(durations.chunks(per_cue)) {
        let start = t;
        let end = t + chunk_durations.iter().sum::<f64>();
        t = end;
        cues.push(SubtitleCue {
            start,
            end,
            text: karaoke_text(chunk_words, chunk_durations, layout.words_per_line),
        });
    }

    Some(cues)
}

/// Render one cue's words with per-word `{\kf}` tags.
///
/// A forced break `\N` follows every `words_per_line`th word except the
/// cue's last word.
fn karaoke_text(words: &[&str], durations: &[f64], words_per_line: usize) -> String {
    let words_per_line = words_per_line.max(1);
    let last = words.len().saturating_sub(1);
    let mut text = String::new();

    for (i, (word, dur)) in words.iter().zip(durations).enumerate() {
        text.push_str(&format!("{{\\kf{}}}", centiseconds(*dur)));
        text.push_str(&escape_ass_text(word));
        if (i + 1) % words_per_line == 0 && i != last {
            text.push_str("\\N");
        } else {
            text.push(' ');
        }
    }

    text.trim().to_string()
}

/// Word duration as a `\kf` value: centiseconds rounded half-to-even, at least 1.
fn centiseconds(seconds: f64) -> u64 {
    ((seconds * 100.0).round_ties_even() as u64).max(1)
}

/// Escape text for an ASS dialogue line.
///
/// Backslashes are doubled; braces become parentheses so they cannot open
/// an override block.
pub fn escape_ass_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('{', "(")
        .replace('}', ")")
}
