//! Pipeline step trait definition.
//!
//! All pipeline stages implement this trait, providing a consistent
//! interface for validation and execution.

use super::errors::StepResult;
use super::types::{Context, RunState, Stage, StepOutcome};

/// Trait for pipeline steps.
///
/// The pipeline runner calls these methods in order:
///
/// 1. `validate_input` - Check preconditions before execution
/// 2. `execute` - Perform the stage's work
/// 3. `validate_output` - Verify the stage recorded valid output
///
/// # Example
///
/// ```ignore
/// struct SpeechStep;
///
/// impl PipelineStep for SpeechStep {
///     fn stage(&self) -> Stage { Stage::Speech }
///
///     fn validate_input(&self, ctx: &Context, _state: &RunState) -> StepResult<()> {
///         if ctx.inputs.script.trim().is_empty() {
///             return Err(StepError::invalid_input("Script is empty"));
///         }
///         Ok(())
///     }
///
///     fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
///         // Synthesize...
///         state.speech = Some(SpeechOutput { ... });
///         Ok(StepOutcome::Success)
///     }
///
///     fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
///         if state.speech.is_none() {
///             return Err(StepError::invalid_output("Speech not recorded"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait PipelineStep: Send + Sync {
    /// The stage this step implements.
    fn stage(&self) -> Stage;

    /// Step name (for logging and error context).
    fn name(&self) -> &str {
        self.stage().as_str()
    }

    /// Validate inputs before execution.
    ///
    /// Checks that required inputs exist and that earlier stages recorded
    /// their outputs.
    fn validate_input(&self, ctx: &Context, state: &RunState) -> StepResult<()>;

    /// Execute the stage's main work and record results in `state`.
    ///
    /// Returns `StepOutcome::Skipped` if the stage decided there is nothing
    /// to do (not an error).
    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome>;

    /// Validate outputs after `execute` returned `Success`.
    fn validate_output(&self, ctx: &Context, state: &RunState) -> StepResult<()>;

    /// Human-readable description of what this step does.
    fn description(&self) -> &str {
        self.name()
    }
}
