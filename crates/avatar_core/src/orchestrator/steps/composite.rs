//! Composite step - places the raw clip into the preset scene.

use std::path::PathBuf;

use crate::media::{CompositeCommandBuilder, EncoderOptions};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{CompositeOutput, Context, RunState, Stage, StepOutcome};
use crate::presets::render_background;
use crate::subtitles::write_karaoke_ass;

/// Resolves the background, writes karaoke subtitles and composites.
///
/// Without a preset the stage is skipped and the raw clip becomes the final
/// video untouched.
#[derive(Debug, Default)]
pub struct CompositeStep;

impl CompositeStep {
    pub fn new() -> Self {
        Self
    }
}

impl PipelineStep for CompositeStep {
    fn stage(&self) -> Stage {
        Stage::Composite
    }

    fn description(&self) -> &str {
        "Composite the clip onto the preset scene"
    }

    fn validate_input(&self, ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.raw_video().is_none() {
            return Err(StepError::invalid_input("Raw clip not recorded"));
        }
        if let Some(ref background) = ctx.inputs.background {
            if ctx.preset.is_some() && !background.exists() {
                return Err(StepError::file_not_found(background.display().to_string()));
            }
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let raw = state
            .raw_video()
            .map(|p| p.to_path_buf())
            .ok_or_else(|| StepError::invalid_input("Raw clip not recorded"))?;

        let Some(preset) = ctx.preset else {
            ctx.logger
                .info(&format!("No preset; final video is the raw clip {}", raw.display()));
            state.final_video = Some(raw);
            return Ok(StepOutcome::Skipped("no preset selected".to_string()));
        };

        ctx.logger.section(&format!("Background ({})", preset.label));
        let cache_dir = PathBuf::from(&ctx.settings.paths.background_cache_folder);
        let background = render_background(preset, &cache_dir, ctx.inputs.background.as_deref())?;
        ctx.logger.info(&format!("Background: {}", background.display()));

        let subtitles = if ctx.settings.composition.subtitles {
            let duration = state.audio_duration().unwrap_or(0.0);
            let written = write_karaoke_ass(
                &ctx.inputs.script,
                duration,
                preset,
                &ctx.artifacts.subtitles,
            )?;
            match written {
                Some(ref path) => ctx.logger.info(&format!("Subtitles: {}", path.display())),
                None => ctx.logger.info("No subtitles for this preset"),
            }
            written
        } else {
            None
        };

        ctx.logger.section("Compositing");
        let encoder = EncoderOptions::from_settings(&ctx.settings.encoding);
        let request = CompositeCommandBuilder::new(
            &background,
            &raw,
            &ctx.artifacts.final_video,
            preset,
            &encoder,
        )
        .subtitles(subtitles.as_deref());
        let video = ctx.media.compose(&request, ctx.tool_logger())?;

        state.composite = Some(CompositeOutput {
            preset: preset.key.to_string(),
            background,
            subtitles,
            video: video.clone(),
        });
        state.final_video = Some(video);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        match &state.final_video {
            Some(video) if video.exists() => Ok(()),
            Some(video) => Err(StepError::invalid_output(format!(
                "Final video missing: {}",
                video.display()
            ))),
            None => Err(StepError::invalid_output("Final video not recorded")),
        }
    }
}
