//! Speech step - synthesizes the script and measures the audio.

use crate::engines::SpeechRequest;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, SpeechOutput, Stage, StepOutcome};

/// Synthesizes speech in the sampled voice and probes its duration.
///
/// The duration drives chunk planning and subtitle timing downstream.
#[derive(Debug, Default)]
pub struct SpeechStep;

impl SpeechStep {
    pub fn new() -> Self {
        Self
    }
}

impl PipelineStep for SpeechStep {
    fn stage(&self) -> Stage {
        Stage::Speech
    }

    fn description(&self) -> &str {
        "Synthesize speech from the script"
    }

    fn validate_input(&self, ctx: &Context, _state: &RunState) -> StepResult<()> {
        if ctx.inputs.script.trim().is_empty() {
            return Err(StepError::invalid_input("Script is empty"));
        }
        if !ctx.inputs.voice_sample.exists() {
            return Err(StepError::file_not_found(
                ctx.inputs.voice_sample.display().to_string(),
            ));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let synthesizer = &ctx.engines.synthesizer;
        let words = ctx.inputs.script.split_whitespace().count();
        ctx.logger.info(&format!(
            "Synthesizing {} words with {} ({})",
            words,
            synthesizer.name(),
            ctx.settings.tts.language
        ));

        let request = SpeechRequest {
            text: &ctx.inputs.script,
            voice_sample: &ctx.inputs.voice_sample,
            language: &ctx.settings.tts.language,
            out_path: &ctx.artifacts.audio,
        };
        let audio = synthesizer.synthesize(&request, ctx.tool_logger())?;

        let duration = ctx.media.probe_duration(&audio, ctx.tool_logger())?;
        if duration <= 0.0 {
            return Err(StepError::invalid_output(format!(
                "Synthesized audio is empty: {}",
                audio.display()
            )));
        }
        ctx.logger
            .info(&format!("Audio: {} ({:.2}s)", audio.display(), duration));

        state.speech = Some(SpeechOutput { audio, duration });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        match &state.speech {
            Some(speech) if speech.audio.exists() => Ok(()),
            Some(speech) => Err(StepError::invalid_output(format!(
                "Audio missing: {}",
                speech.audio.display()
            ))),
            None => Err(StepError::invalid_output("Audio not recorded")),
        }
    }
}
