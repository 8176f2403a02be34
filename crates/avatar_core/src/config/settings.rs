//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.
//! A fixed subset of keys can be overridden from the environment.

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;
use crate::models::RenderEngine;

/// Environment variable overriding `renderer.echomimic_dir`.
pub const ENV_ECHO_MIMIC_DIR: &str = "ECHO_MIMIC_DIR";
/// Environment variable overriding `renderer.echomimic_weights`.
pub const ENV_ECHO_MIMIC_WEIGHTS: &str = "ECHO_MIMIC_WEIGHTS";
/// Environment variable overriding `tools.ffmpeg_path`.
pub const ENV_FFMPEG_PATH: &str = "FFMPEG_PATH";
/// Environment variable overriding `tools.ffprobe_path`.
pub const ENV_FFPROBE_PATH: &str = "FFPROBE_PATH";
/// Environment variable overriding `renderer.engine`.
pub const ENV_RENDER_ENGINE: &str = "AVATAR_RENDER_ENGINE";

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Output, log and cache directories.
    #[serde(default)]
    pub paths: PathSettings,

    /// External media tool locations.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Avatar image preparation.
    #[serde(default)]
    pub image: ImageSettings,

    /// Speech synthesis.
    #[serde(default)]
    pub tts: TtsSettings,

    /// Talking-head renderer selection and paths.
    #[serde(default)]
    pub renderer: RendererSettings,

    /// Video encoder options for compositing.
    #[serde(default)]
    pub encoding: EncodingSettings,

    /// Long-form chunking.
    #[serde(default)]
    pub chunking: ChunkingSettings,

    /// Scene composition defaults.
    #[serde(default)]
    pub composition: CompositionSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides using the given lookup.
    ///
    /// Empty values are ignored. An unknown renderer engine is logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get(ENV_ECHO_MIMIC_DIR) {
            self.renderer.echomimic_dir = dir;
        }
        if let Some(weights) = get(ENV_ECHO_MIMIC_WEIGHTS) {
            self.renderer.echomimic_weights = weights;
        }
        if let Some(ffmpeg) = get(ENV_FFMPEG_PATH) {
            self.tools.ffmpeg_path = ffmpeg;
        }
        if let Some(ffprobe) = get(ENV_FFPROBE_PATH) {
            self.tools.ffprobe_path = ffprobe;
        }
        if let Some(engine) = get(ENV_RENDER_ENGINE) {
            match RenderEngine::parse(&engine) {
                Some(parsed) => self.renderer.engine = parsed,
                None => tracing::warn!(
                    "Ignoring {}={}: unknown render engine",
                    ENV_RENDER_ENGINE,
                    engine
                ),
            }
        }
    }
}

/// Path configuration for outputs, logs and the background cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folder receiving every run artifact.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Folder for per-run log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Folder holding generated preset backgrounds (permanent cache).
    #[serde(default = "default_background_cache")]
    pub background_cache_folder: String,
}

fn default_output_folder() -> String {
    "outputs".to_string()
}

fn default_logs_folder() -> String {
    "outputs/logs".to_string()
}

fn default_background_cache() -> String {
    "outputs/backgrounds".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            logs_folder: default_logs_folder(),
            background_cache_folder: default_background_cache(),
        }
    }
}

/// External media tool locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg_path: String,

    #[serde(default = "default_ffprobe")]
    pub ffprobe_path: String,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg(),
            ffprobe_path: default_ffprobe(),
        }
    }
}

/// Avatar image preparation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSettings {
    /// Edge length of the square image handed to the renderer.
    #[serde(default = "default_image_size")]
    pub size: u32,
}

fn default_image_size() -> u32 {
    512
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            size: default_image_size(),
        }
    }
}

/// Speech synthesis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsSettings {
    /// Run speech synthesis. A disabled TTS is a configuration error for a run.
    #[serde(default = "default_true")]
    pub enable: bool,

    /// Model identifier substituted for `{model}`.
    #[serde(default = "default_tts_model")]
    pub model_name: String,

    /// Target language substituted for `{language}`.
    #[serde(default = "default_language")]
    pub language: String,

    /// Command template. Placeholders: `{text}`, `{voice}`, `{language}`,
    /// `{model}`, `{out_path}`.
    #[serde(default = "default_tts_command")]
    pub command: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_tts_model() -> String {
    "tts_models/multilingual/multi-dataset/xtts_v2".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_tts_command() -> Vec<String> {
    [
        "tts",
        "--model_name",
        "{model}",
        "--text",
        "{text}",
        "--speaker_wav",
        "{voice}",
        "--language_idx",
        "{language}",
        "--out_path",
        "{out_path}",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            enable: true,
            model_name: default_tts_model(),
            language: default_language(),
            command: default_tts_command(),
        }
    }
}

/// Talking-head renderer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererSettings {
    /// Renderer driving the render stage.
    #[serde(default)]
    pub engine: RenderEngine,

    /// Python interpreter used for EchoMimic.
    #[serde(default = "default_python")]
    pub python_path: String,

    /// EchoMimic checkout (contains `infer_audio2vid.py`).
    #[serde(default = "default_echomimic_dir")]
    pub echomimic_dir: String,

    /// EchoMimic pretrained weights.
    #[serde(default = "default_echomimic_weights")]
    pub echomimic_weights: String,

    /// Inference config, relative to `echomimic_dir`.
    #[serde(default = "default_echomimic_config")]
    pub echomimic_config: String,

    /// Command template for the `command` engine. Placeholders:
    /// `{image_path}`, `{audio_path}`, `{out_path}`, `{prompt}`,
    /// `{duration}`, `{reference}`.
    #[serde(default)]
    pub command: Vec<String>,

    /// Working directory for the `command` engine (empty = inherit).
    #[serde(default)]
    pub command_workdir: String,

    /// Prompt substituted for `{prompt}`.
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

fn default_python() -> String {
    "python".to_string()
}

fn default_echomimic_dir() -> String {
    "../EchoMimic".to_string()
}

fn default_echomimic_weights() -> String {
    "../EchoMimic/pretrained_weights".to_string()
}

fn default_echomimic_config() -> String {
    "configs/infer_audio2vid.yaml".to_string()
}

fn default_prompt() -> String {
    "A presenter speaking directly to the camera".to_string()
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            engine: RenderEngine::default(),
            python_path: default_python(),
            echomimic_dir: default_echomimic_dir(),
            echomimic_weights: default_echomimic_weights(),
            echomimic_config: default_echomimic_config(),
            command: Vec::new(),
            command_workdir: String::new(),
            prompt: default_prompt(),
        }
    }
}

/// Video encoder options used by the compositor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingSettings {
    /// ffmpeg video encoder (e.g. `libx264`, `h264_nvenc`).
    #[serde(default = "default_encoder")]
    pub encoder: String,

    /// Encoder speed/quality preset.
    #[serde(default = "default_speed_preset")]
    pub speed_preset: String,

    /// Quality parameter (CRF, or CQ for hardware encoders).
    #[serde(default = "default_quality")]
    pub quality: u32,
}

fn default_encoder() -> String {
    "libx264".to_string()
}

fn default_speed_preset() -> String {
    "veryfast".to_string()
}

fn default_quality() -> u32 {
    23
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self {
            encoder: default_encoder(),
            speed_preset: default_speed_preset(),
            quality: default_quality(),
        }
    }
}

/// Long-form chunking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingSettings {
    /// Split long audio into segments rendered independently.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Segment length in seconds. Zero disables chunking.
    #[serde(default = "default_chunk_seconds")]
    pub chunk_seconds: u32,
}

fn default_chunk_seconds() -> u32 {
    60
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            chunk_seconds: default_chunk_seconds(),
        }
    }
}

impl ChunkingSettings {
    /// Whether chunked rendering is engaged.
    pub fn is_active(&self) -> bool {
        self.enabled && self.chunk_seconds > 0
    }
}

/// Scene composition defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionSettings {
    /// Preset used when a run has no override. Empty or `none` = raw output.
    #[serde(default = "default_preset")]
    pub default_preset: String,

    /// Burn karaoke subtitles into presets that have a content box.
    #[serde(default = "default_true")]
    pub subtitles: bool,
}

fn default_preset() -> String {
    "news_anchor".to_string()
}

impl Default for CompositionSettings {
    fn default() -> Self {
        Self {
            default_preset: default_preset(),
            subtitles: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default level for the global subscriber (RUST_LOG wins).
    #[serde(default)]
    pub level: LogLevel,

    /// Use compact log format (tool output only kept in the tail buffer).
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of tool output lines to show on error.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Log external command arguments one per line.
    #[serde(default)]
    pub show_command_pretty: bool,
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
            show_command_pretty: false,
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Tools,
    Image,
    Tts,
    Renderer,
    Encoding,
    Chunking,
    Composition,
    Logging,
}

impl ConfigSection {
    /// All sections in file order.
    pub const ALL: [ConfigSection; 9] = [
        ConfigSection::Paths,
        ConfigSection::Tools,
        ConfigSection::Image,
        ConfigSection::Tts,
        ConfigSection::Renderer,
        ConfigSection::Encoding,
        ConfigSection::Chunking,
        ConfigSection::Composition,
        ConfigSection::Logging,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Tools => "tools",
            ConfigSection::Image => "image",
            ConfigSection::Tts => "tts",
            ConfigSection::Renderer => "renderer",
            ConfigSection::Encoding => "encoding",
            ConfigSection::Chunking => "chunking",
            ConfigSection::Composition => "composition",
            ConfigSection::Logging => "logging",
        }
    }

    /// Comment written above the section in generated files.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Output, log and background cache directories",
            ConfigSection::Tools => "External media tools",
            ConfigSection::Image => "Avatar image preparation",
            ConfigSection::Tts => "Speech synthesis",
            ConfigSection::Renderer => "Talking-head renderer (echomimic | command | still)",
            ConfigSection::Encoding => "Video encoding for the composited output",
            ConfigSection::Chunking => "Split long audio into segments rendered separately",
            ConfigSection::Composition => "Scene preset and subtitles",
            ConfigSection::Logging => "Logging configuration",
        }
    }
}
