//! Render step - drives the talking-head renderer, chunked when needed.

use std::path::{Path, PathBuf};

use crate::engines::RenderRequest;
use crate::media::{plan_segments, Segment};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{
    ChunkOutput, Context, RenderMode, RenderOutput, RunState, Stage, StepOutcome,
};

/// Renders the raw talking-head clip.
///
/// With chunking active and audio longer than one chunk, the audio is
/// split, each chunk is rendered in order, and the clips are joined with a
/// stream copy. Otherwise the whole track is rendered in one pass.
#[derive(Debug, Default)]
pub struct RenderStep;

impl RenderStep {
    pub fn new() -> Self {
        Self
    }

    /// Segments to render separately; empty or single means a direct render.
    fn plan(&self, ctx: &Context, duration: f64) -> Vec<Segment> {
        let chunking = &ctx.settings.chunking;
        if chunking.is_active() {
            plan_segments(duration, chunking.chunk_seconds)
        } else {
            Vec::new()
        }
    }

    fn render_direct(
        &self,
        ctx: &Context,
        image: &Path,
        audio: &Path,
        duration: f64,
    ) -> StepResult<RenderOutput> {
        ctx.logger.info(&format!(
            "Rendering {:.2}s in one pass with {}",
            duration,
            ctx.engines.renderer.name()
        ));

        let request = RenderRequest {
            image,
            audio,
            reference: ctx.reference_video(),
            out_path: &ctx.artifacts.raw_video,
            duration: Some(duration),
        };
        let raw_video = ctx.engines.renderer.render(&request, ctx.tool_logger())?;

        Ok(RenderOutput {
            mode: RenderMode::Direct,
            raw_video,
            chunks: Vec::new(),
            concat_list: None,
        })
    }

    fn render_chunked(
        &self,
        ctx: &Context,
        image: &Path,
        audio: &Path,
        segments: &[Segment],
    ) -> StepResult<RenderOutput> {
        let total = segments.len();
        ctx.logger.section(&format!(
            "Chunked render: {} chunks of {}s",
            total, ctx.settings.chunking.chunk_seconds
        ));

        let chunk_audio = ctx.media.extract_segments(
            audio,
            segments,
            &ctx.artifacts.chunk_dir,
            ctx.tool_logger(),
        )?;
        if chunk_audio.len() != total {
            return Err(StepError::invalid_output(format!(
                "Expected {} audio chunks, got {}",
                total,
                chunk_audio.len()
            )));
        }

        let (base, span) = stage_progress_range(Stage::Render);
        let mut chunks = Vec::with_capacity(total);

        for (segment, chunk_path) in segments.iter().zip(chunk_audio) {
            let percent = base + span * (segment.index as u32 - 1) / total as u32;
            ctx.report_progress(
                Stage::Render.as_str(),
                percent,
                &format!("Rendering chunk {}/{}", segment.index, total),
            );
            ctx.logger.info(&format!(
                "Chunk {}/{}: {:.3}s - {:.3}s",
                segment.index,
                total,
                segment.start,
                segment.end()
            ));

            let clip_path = ctx.artifacts.chunk_clip(segment.index);
            let request = RenderRequest {
                image,
                audio: &chunk_path,
                reference: ctx.reference_video(),
                out_path: &clip_path,
                duration: Some(segment.duration),
            };
            let clip = ctx.engines.renderer.render(&request, ctx.tool_logger())?;

            chunks.push(ChunkOutput {
                index: segment.index,
                start: segment.start,
                duration: segment.duration,
                audio: chunk_path,
                clip,
            });
        }

        let clips: Vec<PathBuf> = chunks.iter().map(|c| c.clip.clone()).collect();
        ctx.logger.info(&format!("Joining {} clips", clips.len()));
        let raw_video = ctx.media.concat_clips(
            &clips,
            &ctx.artifacts.concat_list,
            &ctx.artifacts.raw_video,
            ctx.tool_logger(),
        )?;

        Ok(RenderOutput {
            mode: RenderMode::Chunked,
            raw_video,
            chunks,
            concat_list: Some(ctx.artifacts.concat_list.clone()),
        })
    }
}

/// Overall progress range `(start, width)` covered by a stage.
fn stage_progress_range(stage: Stage) -> (u32, u32) {
    let count = Stage::ALL.len() as u32;
    let position = Stage::ALL.iter().position(|s| *s == stage).unwrap_or(0) as u32;
    (position * 100 / count, 100 / count)
}

impl PipelineStep for RenderStep {
    fn stage(&self) -> Stage {
        Stage::Render
    }

    fn description(&self) -> &str {
        "Render the talking-head clip"
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.image.is_none() {
            return Err(StepError::invalid_input("Prepared image not recorded"));
        }
        if state.speech.is_none() {
            return Err(StepError::invalid_input("Audio not recorded"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let (image, speech) = match (&state.image, &state.speech) {
            (Some(image), Some(speech)) => (image.path.clone(), speech.clone()),
            _ => return Err(StepError::invalid_input("Earlier stages incomplete")),
        };

        let segments = self.plan(ctx, speech.duration);
        let output = if segments.len() > 1 {
            self.render_chunked(ctx, &image, &speech.audio, &segments)?
        } else {
            self.render_direct(ctx, &image, &speech.audio, speech.duration)?
        };

        ctx.logger
            .info(&format!("Raw clip: {}", output.raw_video.display()));
        state.render = Some(output);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        match state.raw_video() {
            Some(raw) if raw.exists() => Ok(()),
            Some(raw) => Err(StepError::invalid_output(format!(
                "Raw clip missing: {}",
                raw.display()
            ))),
            None => Err(StepError::invalid_output("Raw clip not recorded")),
        }
    }
}
