//! Core types for the orchestrator pipeline.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::artifacts::ArtifactSet;
use crate::config::Settings;
use crate::engines::Engines;
use crate::logging::RunLogger;
use crate::media::MediaBackend;
use crate::presets::Preset;

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (stage_name, percent_complete, message)
pub type ProgressCallback = Arc<dyn Fn(&str, u32, &str) + Send + Sync>;

/// Stages of a run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    ImagePrep,
    Speech,
    /// Direct render, or chunked render followed by concatenation.
    Render,
    /// Background resolve, subtitles and compositing.
    Composite,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::ImagePrep, Stage::Speech, Stage::Render, Stage::Composite];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ImagePrep => "ImagePrep",
            Stage::Speech => "Speech",
            Stage::Render => "Render",
            Stage::Composite => "Composite",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller asks a run to produce.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunInputs {
    /// Source avatar image.
    pub image: PathBuf,
    /// Voice sample for cloning.
    pub voice_sample: PathBuf,
    pub script: String,
    /// Optional motion reference video for the renderer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_video: Option<PathBuf>,
    /// Per-run preset override (key, label or a raw sentinel).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    /// User-supplied background used instead of the generated one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<PathBuf>,
}

impl RunInputs {
    pub fn new(
        image: impl Into<PathBuf>,
        voice_sample: impl Into<PathBuf>,
        script: impl Into<String>,
    ) -> Self {
        Self {
            image: image.into(),
            voice_sample: voice_sample.into(),
            script: script.into(),
            ..Default::default()
        }
    }

    pub fn with_reference_video(mut self, path: impl Into<PathBuf>) -> Self {
        self.reference_video = Some(path.into());
        self
    }

    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    pub fn with_background(mut self, path: impl Into<PathBuf>) -> Self {
        self.background = Some(path.into());
        self
    }
}

/// Read-only context passed to pipeline steps.
///
/// Contains run configuration and shared resources. Mutable state goes in
/// `RunState`.
pub struct Context {
    pub settings: Settings,
    pub inputs: RunInputs,
    /// Pre-computed paths for every artifact of this run.
    pub artifacts: ArtifactSet,
    /// Effective preset; `None` means raw output.
    pub preset: Option<&'static Preset>,
    pub engines: Arc<Engines>,
    pub media: Arc<dyn MediaBackend>,
    /// Per-run logger.
    pub logger: Arc<RunLogger>,
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    pub fn new(
        settings: Settings,
        inputs: RunInputs,
        artifacts: ArtifactSet,
        preset: Option<&'static Preset>,
        engines: Arc<Engines>,
        media: Arc<dyn MediaBackend>,
        logger: Arc<RunLogger>,
    ) -> Self {
        Self {
            settings,
            inputs,
            artifacts,
            preset,
            engines,
            media,
            logger,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: Option<ProgressCallback>) -> Self {
        self.progress_callback = callback;
        self
    }

    /// Log progress and forward it to the callback (if set).
    pub fn report_progress(&self, stage: &str, percent: u32, message: &str) {
        let percent = percent.min(100);
        self.logger.progress(stage, percent);
        if let Some(ref callback) = self.progress_callback {
            callback(stage, percent, message);
        }
    }

    /// Logger handle for tool invocations.
    pub fn tool_logger(&self) -> Option<&RunLogger> {
        Some(self.logger.as_ref())
    }

    pub fn run_id(&self) -> &str {
        self.artifacts.run_id.as_str()
    }

    pub fn reference_video(&self) -> Option<&Path> {
        self.inputs.reference_video.as_deref()
    }
}

/// Mutable run state that accumulates results from the stages.
///
/// Steps add their own section and never overwrite another stage's. The
/// serialized state is the run manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunState {
    pub run_id: String,
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
    /// Effective preset key, absent for raw output.
    pub preset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech: Option<SpeechOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render: Option<RenderOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite: Option<CompositeOutput>,
    /// The deliverable: the composite, or the raw clip without a preset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_video: Option<PathBuf>,
    #[serde(default)]
    pub stages_completed: Vec<String>,
    #[serde(default)]
    pub stages_skipped: Vec<String>,
}

impl RunState {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Audio duration recorded by the speech stage.
    pub fn audio_duration(&self) -> Option<f64> {
        self.speech.as_ref().map(|s| s.duration)
    }

    /// Raw clip recorded by the render stage.
    pub fn raw_video(&self) -> Option<&Path> {
        self.render.as_ref().map(|r| r.raw_video.as_path())
    }
}

/// Output of the image preparation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageOutput {
    pub path: PathBuf,
    pub size: u32,
}

/// Output of the speech stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechOutput {
    pub audio: PathBuf,
    /// Probed length in seconds.
    pub duration: f64,
}

/// How the raw clip was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Direct,
    Chunked,
}

/// One rendered chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkOutput {
    /// 1-based position.
    pub index: usize,
    pub start: f64,
    pub duration: f64,
    pub audio: PathBuf,
    pub clip: PathBuf,
}

/// Output of the render stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOutput {
    pub mode: RenderMode,
    pub raw_video: PathBuf,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chunks: Vec<ChunkOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concat_list: Option<PathBuf>,
}

/// Output of the composite stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeOutput {
    pub preset: String,
    pub background: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitles: Option<PathBuf>,
    pub video: PathBuf,
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step was skipped (nothing to do, not an error).
    Skipped(String),
}

/// Final descriptor of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutputs {
    pub run_id: String,
    pub preset: Option<String>,
    pub image: PathBuf,
    pub audio: PathBuf,
    pub raw_video: PathBuf,
    pub chunks: Vec<PathBuf>,
    pub subtitles: Option<PathBuf>,
    pub final_video: PathBuf,
    pub manifest: PathBuf,
    pub log_file: PathBuf,
}
