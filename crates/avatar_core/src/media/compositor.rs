//! Scene compositing with ffmpeg.
//!
//! Builds the filter graph that scales the background to the preset frame,
//! scales the avatar clip to the preset's avatar box, overlays it at the
//! avatar position, and optionally burns in karaoke subtitles.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use avatar_core::media::{compose, CompositeCommandBuilder, EncoderOptions, MediaTools};
//! use avatar_core::presets::get_preset;
//!
//! let preset = get_preset("news_anchor").unwrap();
//! let encoder = EncoderOptions::default();
//! let builder = CompositeCommandBuilder::new(
//!     Path::new("bg.png"),
//!     Path::new("raw.mp4"),
//!     Path::new("final.mp4"),
//!     preset,
//!     &encoder,
//! )
//! .subtitles(Some(Path::new("speech.ass")));
//!
//! compose(&MediaTools::default(), &builder, None).unwrap();
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::chunking::ensure_output;
use super::error::{MediaError, MediaResult};
use super::tool::{absolute_path, path_arg, MediaTools, ToolCommand};
use crate::config::EncodingSettings;
use crate::logging::RunLogger;
use crate::presets::Preset;

/// Background extensions treated as still images (looped).
const STILL_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Output pixel format.
const PIX_FMT: &str = "yuv420p";

/// Video encoder settings for the final render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderOptions {
    pub encoder: String,
    pub speed_preset: String,
    pub quality: u32,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self::from_settings(&EncodingSettings::default())
    }
}

impl EncoderOptions {
    pub fn from_settings(settings: &EncodingSettings) -> Self {
        Self {
            encoder: settings.encoder.clone(),
            speed_preset: settings.speed_preset.clone(),
            quality: settings.quality,
        }
    }

    /// Whether the encoder is an NVENC hardware encoder.
    pub fn is_hardware(&self) -> bool {
        self.encoder.contains("nvenc")
    }

    /// Quality arguments: `-crf N` for software, `-rc vbr -cq N` for NVENC.
    pub fn quality_args(&self) -> Vec<String> {
        if self.is_hardware() {
            vec![
                "-rc".to_string(),
                "vbr".to_string(),
                "-cq".to_string(),
                self.quality.to_string(),
            ]
        } else {
            vec!["-crf".to_string(), self.quality.to_string()]
        }
    }
}

/// Whether a background path is a still image rather than a video.
pub fn is_still_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| STILL_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Escape a value for use inside an ffmpeg filter graph.
fn escape_filter_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.replace('\\', "/").chars() {
        if matches!(c, ':' | '\'' | ',' | ';' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Builds the ffmpeg command for one composite render.
pub struct CompositeCommandBuilder<'a> {
    background: &'a Path,
    avatar_clip: &'a Path,
    out_path: &'a Path,
    preset: &'a Preset,
    encoder: &'a EncoderOptions,
    duration: Option<f64>,
    subtitles: Option<&'a Path>,
}

impl<'a> CompositeCommandBuilder<'a> {
    pub fn new(
        background: &'a Path,
        avatar_clip: &'a Path,
        out_path: &'a Path,
        preset: &'a Preset,
        encoder: &'a EncoderOptions,
    ) -> Self {
        Self {
            background,
            avatar_clip,
            out_path,
            preset,
            encoder,
            duration: None,
            subtitles: None,
        }
    }

    /// Cap the output at an explicit duration instead of the shortest input.
    pub fn duration(mut self, seconds: Option<f64>) -> Self {
        self.duration = seconds.filter(|s| s.is_finite() && *s > 0.0);
        self
    }

    /// Burn in an ASS subtitle file.
    pub fn subtitles(mut self, path: Option<&'a Path>) -> Self {
        self.subtitles = path;
        self
    }

    pub fn background(&self) -> &Path {
        self.background
    }

    pub fn avatar_clip(&self) -> &Path {
        self.avatar_clip
    }

    pub fn out_path(&self) -> &Path {
        self.out_path
    }

    pub fn subtitle_path(&self) -> Option<&Path> {
        self.subtitles
    }

    pub fn preset(&self) -> &Preset {
        self.preset
    }

    /// Directory the command runs in (the output's parent).
    pub fn work_dir(&self) -> Option<&Path> {
        self.out_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Subtitle reference as seen from the working directory.
    ///
    /// A file beside the output is referenced by name; anything else by its
    /// escaped full path.
    fn subtitle_ref(&self, subtitles: &Path) -> String {
        let same_dir = match (subtitles.parent(), self.work_dir()) {
            (Some(sub_dir), Some(work)) => sub_dir == work,
            (Some(sub_dir), None) => sub_dir.as_os_str().is_empty(),
            _ => false,
        };

        match subtitles.file_name() {
            Some(name) if same_dir => escape_filter_value(&name.to_string_lossy()),
            _ => escape_filter_value(&subtitles.to_string_lossy()),
        }
    }

    /// The `-filter_complex` graph.
    pub fn filter_graph(&self) -> String {
        let frame = self.preset.resolution;
        let avatar = self.preset.avatar_box;
        let pos = self.preset.avatar_pos;

        let mut graph = format!(
            "[0:v]scale={}:{}[bg];[1:v]scale={}:{}[av];[bg][av]overlay={}:{}:format=auto[ov]",
            frame.width, frame.height, avatar.width, avatar.height, pos.x, pos.y
        );

        match self.subtitles {
            Some(subs) => graph.push_str(&format!(
                ";[ov]subtitles={},format={}[v]",
                self.subtitle_ref(subs),
                PIX_FMT
            )),
            None => graph.push_str(&format!(";[ov]format={}[v]", PIX_FMT)),
        }

        graph
    }

    /// Build the ffmpeg argument list (without the program name).
    pub fn build(&self) -> Vec<String> {
        let mut args = vec!["-y".to_string()];

        if is_still_image(self.background) {
            args.push("-loop".to_string());
            args.push("1".to_string());
        }
        args.push("-i".to_string());
        args.push(path_arg(self.background));
        args.push("-i".to_string());
        args.push(path_arg(self.avatar_clip));

        args.push("-filter_complex".to_string());
        args.push(self.filter_graph());
        args.push("-r".to_string());
        args.push(self.preset.fps.to_string());

        // Audio from the avatar clip is optional
        args.extend(
            ["-map", "[v]", "-map", "1:a?"]
                .iter()
                .map(|s| s.to_string()),
        );

        args.push("-c:v".to_string());
        args.push(self.encoder.encoder.clone());
        args.push("-preset".to_string());
        args.push(self.encoder.speed_preset.clone());
        args.extend(self.encoder.quality_args());
        args.push("-pix_fmt".to_string());
        args.push(PIX_FMT.to_string());
        args.push("-shortest".to_string());

        if let Some(seconds) = self.duration {
            args.push("-t".to_string());
            args.push(format!("{:.3}", seconds));
        }

        args.push(path_arg(self.out_path));
        args
    }

    /// Full command, run from the output directory.
    pub fn command(&self, tools: &MediaTools) -> ToolCommand {
        let cmd = tools.ffmpeg_command(self.build());
        match self.work_dir() {
            Some(dir) => cmd.with_cwd(dir),
            None => cmd,
        }
    }
}

/// Composite the avatar clip onto the background.
///
/// Paths are made absolute before running because ffmpeg runs from the
/// output directory. A non-zero exit is returned as an error.
pub fn compose(
    tools: &MediaTools,
    request: &CompositeCommandBuilder<'_>,
    logger: Option<&RunLogger>,
) -> MediaResult<PathBuf> {
    for input in [request.background, request.avatar_clip] {
        if !input.exists() {
            return Err(MediaError::NotFound(input.to_path_buf()));
        }
    }
    if let Some(subs) = request.subtitles {
        if !subs.exists() {
            return Err(MediaError::NotFound(subs.to_path_buf()));
        }
    }

    let background = absolute_path(request.background)?;
    let avatar_clip = absolute_path(request.avatar_clip)?;
    let out_path = absolute_path(request.out_path)?;
    let subtitles = request.subtitles.map(absolute_path).transpose()?;

    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).map_err(|e| MediaError::io("creating output directory", e))?;
    }

    let resolved = CompositeCommandBuilder::new(
        &background,
        &avatar_clip,
        &out_path,
        request.preset,
        request.encoder,
    )
    .duration(request.duration)
    .subtitles(subtitles.as_deref());

    resolved.command(tools).run(logger)?;
    ensure_output(&out_path)?;

    Ok(out_path)
}
