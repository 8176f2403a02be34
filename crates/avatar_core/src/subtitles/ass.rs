//! ASS karaoke script writer.
//!
//! # Timing Precision
//!
//! ASS uses centisecond timing (`H:MM:SS.cc`, hours not padded). Seconds
//! are rounded to whole centiseconds before being split into fields, so
//! `59.999` formats as `0:01:00.00` rather than `0:00:60.00`.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::{SubtitleError, SubtitleResult};
use super::karaoke::build_cues;
use super::types::{SpeechMargins, SubtitleCue};
use crate::models::Size;
use crate::presets::Preset;

const STYLE_FORMAT: &str = "Format: Name,Fontname,Fontsize,PrimaryColour,SecondaryColour,\
OutlineColour,BackColour,Bold,Italic,Underline,StrikeOut,ScaleX,ScaleY,Spacing,Angle,\
BorderStyle,Outline,Shadow,Alignment,MarginL,MarginR,MarginV,Encoding";

/// Speech style: white text, amber karaoke fill, top-left aligned.
const SPEECH_STYLE_PREFIX: &str = "Style: Speech,Segoe UI,40,&H00FFFFFF,&H0010B8FF,&H00202020,\
&H64000000,0,0,0,0,100,100,0,0,1,2,1,7";

const EVENT_FORMAT: &str = "Format: Layer,Start,End,Style,Name,MarginL,MarginR,MarginV,Effect,Text";

/// Format seconds as an ASS timestamp (`H:MM:SS.cc`).
pub fn format_ass_time(seconds: f64) -> String {
    let cs = (seconds * 100.0).round().max(0.0) as u64;

    let centis = cs % 100;
    let total_secs = cs / 100;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;

    format!("{}:{:02}:{:02}.{:02}", hours, mins, secs, centis)
}

/// Render a complete ASS document for the given cues.
pub fn render_ass(cues: &[SubtitleCue], resolution: Size, margins: SpeechMargins) -> String {
    let mut lines = vec![
        "[Script Info]".to_string(),
        "ScriptType: v4.00+".to_string(),
        format!("PlayResX: {}", resolution.width),
        format!("PlayResY: {}", resolution.height),
        "WrapStyle: 2".to_string(),
        "ScaledBorderAndShadow: yes".to_string(),
        String::new(),
        "[V4+ Styles]".to_string(),
        STYLE_FORMAT.to_string(),
        format!(
            "{},{},{},{},1",
            SPEECH_STYLE_PREFIX, margins.left, margins.right, margins.vertical
        ),
        String::new(),
        "[Events]".to_string(),
        EVENT_FORMAT.to_string(),
    ];

    for cue in cues {
        lines.push(format!(
            "Dialogue: 0,{},{},Speech,,0,0,0,,{}",
            format_ass_time(cue.start),
            format_ass_time(cue.end),
            cue.text
        ));
    }

    lines.push(String::new());
    lines.join("\n")
}

/// Build karaoke cues and write them as an ASS file.
///
/// Returns `Ok(None)` without touching the filesystem when there is
/// nothing to show (see [`build_cues`]).
pub fn write_karaoke_ass(
    script: &str,
    duration: f64,
    preset: &Preset,
    out_path: &Path,
) -> SubtitleResult<Option<PathBuf>> {
    let Some(margins) = SpeechMargins::for_preset(preset) else {
        return Ok(None);
    };
    let Some(cues) = build_cues(script, duration, preset) else {
        return Ok(None);
    };

    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| SubtitleError::CreateDirError {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let content = render_ass(&cues, preset.resolution, margins);
    fs::write(out_path, content).map_err(|source| SubtitleError::WriteError {
        path: out_path.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        "Wrote {} karaoke cues to {}",
        cues.len(),
        out_path.display()
    );
    Ok(Some(out_path.to_path_buf()))
}
