//! Run driver: turns one request into a finished video.
//!
//! `AvatarPipeline` owns the settings and the collaborators, and for every
//! run it:
//! - validates the inputs
//! - allocates a run id and the artifact paths
//! - resolves the effective preset
//! - opens the per-run log
//! - runs the standard pipeline
//! - writes the JSON run manifest

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::artifacts::{ArtifactSet, RunId};
use crate::config::Settings;
use crate::engines::Engines;
use crate::logging::{LogCallback, LogConfig, RunLogger};
use crate::media::{FfmpegBackend, MediaBackend, MediaTools};
use crate::presets::{list_presets, resolve_effective_preset, Preset};

use super::errors::{PipelineError, PipelineResult};
use super::types::{Context, ProgressCallback, RunInputs, RunOutputs, RunState};
use super::create_standard_pipeline;

type SharedLogCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Runs talking-avatar jobs with one configuration.
///
/// # Example
///
/// ```ignore
/// let pipeline = AvatarPipeline::new(settings);
/// let outputs = pipeline.run(
///     RunInputs::new("face.png", "voice.wav", "Hello and welcome.").with_preset("teacher"),
/// )?;
/// println!("{}", outputs.final_video.display());
/// ```
pub struct AvatarPipeline {
    settings: Settings,
    engines: Arc<Engines>,
    media: Arc<dyn MediaBackend>,
    log_callback: Option<SharedLogCallback>,
    progress_callback: Option<ProgressCallback>,
}

impl AvatarPipeline {
    /// Pipeline with the configured engines and ffmpeg.
    pub fn new(settings: Settings) -> Self {
        let engines = Engines::from_settings(&settings);
        let media = FfmpegBackend::new(MediaTools::from_settings(&settings.tools));
        Self {
            settings,
            engines: Arc::new(engines),
            media: Arc::new(media),
            log_callback: None,
            progress_callback: None,
        }
    }

    /// Replace the image preparer, synthesizer and renderer.
    pub fn with_engines(mut self, engines: Engines) -> Self {
        self.engines = Arc::new(engines);
        self
    }

    pub fn with_media_backend(mut self, media: Arc<dyn MediaBackend>) -> Self {
        self.media = media;
        self
    }

    /// Forward every formatted log line of each run to `callback`.
    pub fn with_log_callback(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.log_callback = Some(Arc::new(callback));
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn engines(&self) -> &Engines {
        &self.engines
    }

    /// Preset a run with this override would composite with.
    pub fn resolve_preset(&self, override_key: Option<&str>) -> Option<&'static Preset> {
        resolve_effective_preset(
            override_key,
            Some(self.settings.composition.default_preset.as_str()),
        )
    }

    /// Run one job end to end.
    pub fn run(&self, inputs: RunInputs) -> PipelineResult<RunOutputs> {
        let run_id = RunId::generate();
        let id = run_id.as_str().to_string();

        validate_inputs(&id, &inputs)?;

        let output_dir = PathBuf::from(&self.settings.paths.output_folder);
        fs::create_dir_all(&output_dir).map_err(|e| {
            PipelineError::setup_failed(&id, format!("Failed to create output directory: {}", e))
        })?;

        let logger = RunLogger::new(
            &id,
            &self.settings.paths.logs_folder,
            LogConfig::from_settings(&self.settings.logging),
            self.run_log_callback(),
        )
        .map_err(|e| PipelineError::setup_failed(&id, format!("Failed to create logger: {}", e)))?;
        let logger = Arc::new(logger);

        let preset = self.resolve_preset(inputs.preset.as_deref());

        logger.info(&format!("Starting run: {}", id));
        logger.info(&format!(
            "Preset: {}",
            preset.map_or("none (raw output)", |p| p.label)
        ));
        logger.info(&format!(
            "Engines: {} / {} / {}",
            self.engines.preparer.name(),
            self.engines.synthesizer.name(),
            self.engines.renderer.name()
        ));
        tracing::info!("Run {} started (preset: {:?})", id, preset.map(|p| p.key));

        let ctx = Context::new(
            self.settings.clone(),
            inputs,
            ArtifactSet::new(output_dir, run_id),
            preset,
            Arc::clone(&self.engines),
            Arc::clone(&self.media),
            Arc::clone(&logger),
        )
        .with_progress_callback(self.progress_callback.clone());

        let mut state = RunState::new(&id);
        state.preset = preset.map(|p| p.key.to_string());

        let run_result = match create_standard_pipeline().run(&ctx, &mut state) {
            Ok(result) => result,
            Err(e) => {
                logger.error(&e.to_string());
                logger.flush();
                tracing::error!("Run {} failed: {}", id, e);
                return Err(e);
            }
        };

        state.stages_completed = run_result.steps_completed;
        state.stages_skipped = run_result.steps_skipped;
        state.finished_at = Some(chrono::Local::now().to_rfc3339());

        let outputs = build_outputs(&ctx, &state)?;
        write_manifest(&ctx.artifacts.manifest, &state)
            .map_err(|e| PipelineError::setup_failed(&id, e))?;

        logger.success(&format!("Final video: {}", outputs.final_video.display()));
        logger.flush();
        tracing::info!("Run {} finished: {}", id, outputs.final_video.display());

        Ok(outputs)
    }

    /// Render one short clip per preset for layout checks.
    ///
    /// Each final video is copied to `<out_dir>/preview_<key>.mp4`.
    pub fn render_previews(
        &self,
        image: &Path,
        voice_sample: &Path,
        script: &str,
        out_dir: &Path,
    ) -> PipelineResult<Vec<PathBuf>> {
        fs::create_dir_all(out_dir).map_err(|e| {
            PipelineError::setup_failed("previews", format!("Failed to create {}: {}", out_dir.display(), e))
        })?;

        let mut rendered = Vec::with_capacity(list_presets().len());
        for preset in list_presets() {
            let inputs =
                RunInputs::new(image, voice_sample, script).with_preset(preset.key);
            let outputs = self.run(inputs)?;

            let target = out_dir.join(format!("preview_{}.mp4", preset.key));
            fs::copy(&outputs.final_video, &target).map_err(|e| {
                PipelineError::setup_failed(
                    &outputs.run_id,
                    format!("Failed to copy preview to {}: {}", target.display(), e),
                )
            })?;
            rendered.push(target);
        }

        Ok(rendered)
    }

    fn run_log_callback(&self) -> Option<LogCallback> {
        self.log_callback.as_ref().map(|cb| {
            let cb = Arc::clone(cb);
            Box::new(move |line: &str| cb(line)) as LogCallback
        })
    }
}

/// Reject runs whose required inputs are absent before anything is written.
fn validate_inputs(run_id: &str, inputs: &RunInputs) -> PipelineResult<()> {
    if !inputs.image.is_file() {
        return Err(PipelineError::validation_failed(
            run_id,
            format!("Avatar image not found: {}", inputs.image.display()),
        ));
    }
    if !inputs.voice_sample.is_file() {
        return Err(PipelineError::validation_failed(
            run_id,
            format!("Voice sample not found: {}", inputs.voice_sample.display()),
        ));
    }
    if inputs.script.trim().is_empty() {
        return Err(PipelineError::validation_failed(run_id, "Script is empty"));
    }
    Ok(())
}

fn build_outputs(ctx: &Context, state: &RunState) -> PipelineResult<RunOutputs> {
    let missing = |what: &str| {
        PipelineError::setup_failed(ctx.run_id(), format!("Run finished without {}", what))
    };

    let image = state.image.as_ref().ok_or_else(|| missing("an avatar image"))?;
    let speech = state.speech.as_ref().ok_or_else(|| missing("audio"))?;
    let render = state.render.as_ref().ok_or_else(|| missing("a raw clip"))?;
    let final_video = state.final_video.clone().ok_or_else(|| missing("a final video"))?;

    Ok(RunOutputs {
        run_id: ctx.run_id().to_string(),
        preset: state.preset.clone(),
        image: image.path.clone(),
        audio: speech.audio.clone(),
        raw_video: render.raw_video.clone(),
        chunks: render.chunks.iter().map(|c| c.clip.clone()).collect(),
        subtitles: state.composite.as_ref().and_then(|c| c.subtitles.clone()),
        final_video,
        manifest: ctx.artifacts.manifest.clone(),
        log_file: ctx.logger.log_path().to_path_buf(),
    })
}

/// Write the run state as pretty JSON via a temp file and rename.
fn write_manifest(path: &Path, state: &RunState) -> Result<(), String> {
    let json = serde_json::to_string_pretty(state)
        .map_err(|e| format!("Failed to serialize manifest: {}", e))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| format!("Failed to write manifest: {}", e))?;
    fs::rename(&tmp, path).map_err(|e| format!("Failed to finalize manifest: {}", e))
}
