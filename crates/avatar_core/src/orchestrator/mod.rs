//! Pipeline orchestrator for talking-avatar runs.
//!
//! A run is a fixed sequence of steps. Each step validates what earlier
//! steps recorded in [`RunState`], does its work through the engines and
//! the media backend held by [`Context`], and records its own outputs.
//!
//! # Architecture
//!
//! ```text
//! AvatarPipeline (validate inputs, run id, preset, log, manifest)
//!     └── Pipeline
//!             ├── Step: ImagePrep   (square crop of the avatar image)
//!             ├── Step: Speech      (voice-cloned TTS + duration probe)
//!             ├── Step: Render      (talking head, chunked when long)
//!             └── Step: Composite   (background, karaoke subtitles, ffmpeg)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use avatar_core::orchestrator::{create_standard_pipeline, RunState};
//!
//! let pipeline = create_standard_pipeline();
//! let mut state = RunState::new(ctx.run_id());
//! let result = pipeline.run(&ctx, &mut state)?;
//! println!("Completed: {:?}", result.steps_completed);
//! ```

mod errors;
mod pipeline;
mod runner;
mod step;
pub mod steps;
mod types;

#[cfg(test)]
mod testing;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{Pipeline, PipelineRunResult};
pub use runner::AvatarPipeline;
pub use step::PipelineStep;
pub use steps::{CompositeStep, ImagePrepStep, RenderStep, SpeechStep};
pub use types::{
    ChunkOutput, CompositeOutput, Context, ImageOutput, ProgressCallback, RenderMode,
    RenderOutput, RunInputs, RunOutputs, RunState, SpeechOutput, Stage, StepOutcome,
};

/// Create the standard pipeline with all steps in order.
///
/// 1. ImagePrep - crop and resize the avatar image
/// 2. Speech - synthesize the script in the sampled voice
/// 3. Render - produce the raw talking-head clip
/// 4. Composite - place the clip into the preset scene (skipped without a preset)
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(ImagePrepStep::new())
        .with_step(SpeechStep::new())
        .with_step(RenderStep::new())
        .with_step(CompositeStep::new())
}
