//! External collaborators of a run.
//!
//! The pipeline treats image preparation, speech synthesis and talking-head
//! rendering as black boxes behind three narrow traits:
//!
//! - [`ImagePreparer`]: source image -> square avatar image
//! - [`SpeechSynthesizer`]: script + voice sample -> audio
//! - [`TalkingHeadRenderer`]: avatar image + audio -> raw clip
//!
//! Default implementations wrap external commands (Coqui TTS, EchoMimic, a
//! generic command template) and ffmpeg-based stand-ins used for previews.
//! [`Engines`] bundles one of each, selected from [`Settings`].

mod error;
mod image_prep;
mod renderers;
mod speech;
mod template;

use std::path::{Path, PathBuf};

pub use error::{EngineError, EngineResult};
pub use image_prep::{crop_window, CropWindow, SquareCropPreparer};
pub use renderers::{CommandRenderer, EchoMimicRenderer, StillImageRenderer};
pub use speech::{CommandSynthesizer, ToneSynthesizer};
pub use template::Placeholders;

use crate::config::Settings;
use crate::logging::RunLogger;
use crate::media::MediaTools;
use crate::models::RenderEngine;

/// Produces the square avatar image handed to the renderer.
pub trait ImagePreparer: Send + Sync {
    fn name(&self) -> &str;

    /// Crop and resize `source` to a `size`x`size` image at `out_path`.
    ///
    /// `focus_y` is a normalized vertical focus hint from the preset.
    fn prepare(
        &self,
        source: &Path,
        size: u32,
        focus_y: Option<f32>,
        out_path: &Path,
    ) -> EngineResult<PathBuf>;
}

/// Input for one speech synthesis call.
#[derive(Debug, Clone, Copy)]
pub struct SpeechRequest<'a> {
    pub text: &'a str,
    pub voice_sample: &'a Path,
    pub language: &'a str,
    pub out_path: &'a Path,
}

/// Turns a script into speech in the sampled voice.
pub trait SpeechSynthesizer: Send + Sync {
    fn name(&self) -> &str;

    /// Write the audio to `request.out_path` and return that path.
    fn synthesize(
        &self,
        request: &SpeechRequest<'_>,
        logger: Option<&RunLogger>,
    ) -> EngineResult<PathBuf>;
}

/// Input for one render call.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub image: &'a Path,
    pub audio: &'a Path,
    /// Optional motion reference video.
    pub reference: Option<&'a Path>,
    pub out_path: &'a Path,
    /// Audio length in seconds, when known.
    pub duration: Option<f64>,
}

/// Animates the avatar image to the audio.
pub trait TalkingHeadRenderer: Send + Sync {
    fn name(&self) -> &str;

    /// Render a clip to `request.out_path` and return the path written.
    fn render(
        &self,
        request: &RenderRequest<'_>,
        logger: Option<&RunLogger>,
    ) -> EngineResult<PathBuf>;
}

/// One preparer, synthesizer and renderer for a run.
pub struct Engines {
    pub preparer: Box<dyn ImagePreparer>,
    pub synthesizer: Box<dyn SpeechSynthesizer>,
    pub renderer: Box<dyn TalkingHeadRenderer>,
}

impl Engines {
    pub fn new(
        preparer: Box<dyn ImagePreparer>,
        synthesizer: Box<dyn SpeechSynthesizer>,
        renderer: Box<dyn TalkingHeadRenderer>,
    ) -> Self {
        Self {
            preparer,
            synthesizer,
            renderer,
        }
    }

    /// Engines for a production run, with the renderer picked by
    /// `renderer.engine`.
    pub fn from_settings(settings: &Settings) -> Self {
        let tools = MediaTools::from_settings(&settings.tools);
        let renderer: Box<dyn TalkingHeadRenderer> = match settings.renderer.engine {
            RenderEngine::Echomimic => {
                Box::new(EchoMimicRenderer::from_settings(&settings.renderer))
            }
            RenderEngine::Command => Box::new(CommandRenderer::from_settings(&settings.renderer)),
            RenderEngine::Still => Box::new(StillImageRenderer::new(tools)),
        };

        Self::new(
            Box::new(SquareCropPreparer::new()),
            Box::new(CommandSynthesizer::from_settings(&settings.tts)),
            renderer,
        )
    }

    /// Cheap engines for layout previews: a tone instead of speech and the
    /// still image instead of a talking head.
    pub fn preview(settings: &Settings) -> Self {
        let tools = MediaTools::from_settings(&settings.tools);
        Self::new(
            Box::new(SquareCropPreparer::new()),
            Box::new(ToneSynthesizer::new(tools.clone())),
            Box::new(StillImageRenderer::new(tools)),
        )
    }
}

impl std::fmt::Debug for Engines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engines")
            .field("preparer", &self.preparer.name())
            .field("synthesizer", &self.synthesizer.name())
            .field("renderer", &self.renderer.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_follows_configured_engine() {
        let mut settings = Settings::default();
        assert_eq!(Engines::from_settings(&settings).renderer.name(), "echomimic");

        settings.renderer.engine = RenderEngine::Command;
        assert_eq!(Engines::from_settings(&settings).renderer.name(), "command");

        settings.renderer.engine = RenderEngine::Still;
        let engines = Engines::from_settings(&settings);
        assert_eq!(engines.renderer.name(), "still");
        assert_eq!(engines.synthesizer.name(), "command-tts");
    }

    #[test]
    fn preview_uses_stand_ins() {
        let engines = Engines::preview(&Settings::default());
        assert_eq!(engines.preparer.name(), "square-crop");
        assert_eq!(engines.synthesizer.name(), "tone");
        assert_eq!(engines.renderer.name(), "still");
        assert!(format!("{engines:?}").contains("tone"));
    }
}
