//! ImagePrep step - square-crops the avatar image for the renderer.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, ImageOutput, RunState, Stage, StepOutcome};

/// Prepares the square avatar image.
///
/// The preset's vertical focus hint steers the crop when a preset is active.
#[derive(Debug, Default)]
pub struct ImagePrepStep;

impl ImagePrepStep {
    pub fn new() -> Self {
        Self
    }
}

impl PipelineStep for ImagePrepStep {
    fn stage(&self) -> Stage {
        Stage::ImagePrep
    }

    fn description(&self) -> &str {
        "Crop and resize the avatar image"
    }

    fn validate_input(&self, ctx: &Context, _state: &RunState) -> StepResult<()> {
        if !ctx.inputs.image.exists() {
            return Err(StepError::file_not_found(ctx.inputs.image.display().to_string()));
        }
        if ctx.settings.image.size == 0 {
            return Err(StepError::configuration("image.size must be positive"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let size = ctx.settings.image.size;
        let focus_y = ctx.preset.and_then(|p| p.crop_focus_y);
        let preparer = &ctx.engines.preparer;

        ctx.logger.info(&format!(
            "Preparing {}px avatar with {} (focus: {})",
            size,
            preparer.name(),
            focus_y.map_or_else(|| "center".to_string(), |f| format!("{:.2}", f))
        ));

        let path = preparer.prepare(&ctx.inputs.image, size, focus_y, &ctx.artifacts.avatar_image)?;
        ctx.logger.info(&format!("Avatar image: {}", path.display()));

        state.image = Some(ImageOutput { path, size });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        match &state.image {
            Some(image) if image.path.exists() => Ok(()),
            Some(image) => Err(StepError::invalid_output(format!(
                "Prepared image missing: {}",
                image.path.display()
            ))),
            None => Err(StepError::invalid_output("Prepared image not recorded")),
        }
    }
}
