//! In-process fakes for exercising the pipeline without ffmpeg or models.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::TempDir;

use super::types::{
    Context, ImageOutput, ProgressCallback, RenderMode, RenderOutput, RunInputs, RunState,
    SpeechOutput,
};
use crate::artifacts::{ArtifactSet, RunId};
use crate::config::Settings;
use crate::engines::{
    EngineError, EngineResult, Engines, ImagePreparer, RenderRequest, SpeechRequest,
    SpeechSynthesizer, TalkingHeadRenderer,
};
use crate::logging::{LogConfig, RunLogger};
use crate::media::{
    chunk_audio_name, write_concat_list, CompositeCommandBuilder, MediaBackend, MediaError,
    MediaResult, Segment,
};
use crate::presets::Preset;

pub(crate) const SCRIPT: &str = "Good evening. Here are tonight's headlines, in brief.";

/// One recorded compose call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ComposeCall {
    pub background: PathBuf,
    pub avatar_clip: PathBuf,
    pub subtitles: Option<PathBuf>,
    pub out: PathBuf,
    pub preset: String,
}

#[derive(Default)]
struct Calls {
    focus: Vec<Option<f32>>,
    texts: Vec<String>,
    render_audio: Vec<PathBuf>,
    render_durations: Vec<Option<f64>>,
    composed: Vec<ComposeCall>,
}

type SharedCalls = Arc<Mutex<Calls>>;

fn write_file(path: &Path, content: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

struct FakePreparer(SharedCalls);

impl ImagePreparer for FakePreparer {
    fn name(&self) -> &str {
        "fake-crop"
    }

    fn prepare(
        &self,
        _source: &Path,
        _size: u32,
        focus_y: Option<f32>,
        out_path: &Path,
    ) -> EngineResult<PathBuf> {
        self.0.lock().focus.push(focus_y);
        write_file(out_path, b"png").map_err(|e| EngineError::io("writing fake image", e))?;
        Ok(out_path.to_path_buf())
    }
}

struct FakeSynthesizer(SharedCalls);

impl SpeechSynthesizer for FakeSynthesizer {
    fn name(&self) -> &str {
        "fake-tts"
    }

    fn synthesize(
        &self,
        request: &SpeechRequest<'_>,
        _logger: Option<&RunLogger>,
    ) -> EngineResult<PathBuf> {
        if request.text.trim().is_empty() {
            return Err(EngineError::missing_input("script text is empty"));
        }
        self.0.lock().texts.push(request.text.to_string());
        write_file(request.out_path, b"RIFF")
            .map_err(|e| EngineError::io("writing fake audio", e))?;
        Ok(request.out_path.to_path_buf())
    }
}

/// Writes `clip:<audio file name>` so joined output shows chunk order.
struct FakeRenderer(SharedCalls);

impl TalkingHeadRenderer for FakeRenderer {
    fn name(&self) -> &str {
        "fake-renderer"
    }

    fn render(
        &self,
        request: &RenderRequest<'_>,
        _logger: Option<&RunLogger>,
    ) -> EngineResult<PathBuf> {
        {
            let mut calls = self.0.lock();
            calls.render_audio.push(request.audio.to_path_buf());
            calls.render_durations.push(request.duration);
        }
        let name = request
            .audio
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        write_file(request.out_path, format!("clip:{}\n", name).as_bytes())
            .map_err(|e| EngineError::io("writing fake clip", e))?;
        Ok(request.out_path.to_path_buf())
    }
}

struct FakeMedia {
    calls: SharedCalls,
    duration: f64,
    fail_compose: bool,
}

impl MediaBackend for FakeMedia {
    fn probe_duration(&self, path: &Path, _logger: Option<&RunLogger>) -> MediaResult<f64> {
        if !path.exists() {
            return Err(MediaError::NotFound(path.to_path_buf()));
        }
        Ok(self.duration)
    }

    fn extract_segments(
        &self,
        _audio: &Path,
        segments: &[Segment],
        out_dir: &Path,
        _logger: Option<&RunLogger>,
    ) -> MediaResult<Vec<PathBuf>> {
        segments
            .iter()
            .map(|segment| {
                let out = out_dir.join(chunk_audio_name(segment.index));
                write_file(&out, b"pcm").map_err(|e| MediaError::io("writing fake chunk", e))?;
                Ok(out)
            })
            .collect()
    }

    fn concat_clips(
        &self,
        clips: &[PathBuf],
        list_path: &Path,
        out: &Path,
        _logger: Option<&RunLogger>,
    ) -> MediaResult<PathBuf> {
        write_concat_list(clips, list_path)?;
        let mut joined = Vec::new();
        for clip in clips {
            joined.extend(fs::read(clip).map_err(|e| MediaError::io("reading fake clip", e))?);
        }
        write_file(out, &joined).map_err(|e| MediaError::io("writing fake concat", e))?;
        Ok(out.to_path_buf())
    }

    fn compose(
        &self,
        request: &CompositeCommandBuilder<'_>,
        _logger: Option<&RunLogger>,
    ) -> MediaResult<PathBuf> {
        if self.fail_compose {
            return Err(MediaError::command_failed("ffmpeg", 1, "Invalid filter graph"));
        }
        self.calls.lock().composed.push(ComposeCall {
            background: request.background().to_path_buf(),
            avatar_clip: request.avatar_clip().to_path_buf(),
            subtitles: request.subtitle_path().map(Path::to_path_buf),
            out: request.out_path().to_path_buf(),
            preset: request.preset().key.to_string(),
        });
        let clip = fs::read(request.avatar_clip())
            .map_err(|e| MediaError::io("reading fake raw clip", e))?;
        write_file(request.out_path(), &clip)
            .map_err(|e| MediaError::io("writing fake composite", e))?;
        Ok(request.out_path().to_path_buf())
    }
}

/// Collects progress events.
#[derive(Clone, Default)]
pub(crate) struct ProgressSink {
    events: Arc<Mutex<Vec<(String, u32, String)>>>,
}

impl ProgressSink {
    pub fn callback(&self) -> ProgressCallback {
        let events = Arc::clone(&self.events);
        Arc::new(move |stage: &str, percent: u32, message: &str| {
            events
                .lock()
                .push((stage.to_string(), percent, message.to_string()));
        })
    }

    pub fn events(&self) -> Vec<(String, u32, String)> {
        self.events.lock().clone()
    }
}

/// Temp workspace with real inputs on disk and fake collaborators.
pub(crate) struct TestRig {
    dir: TempDir,
    settings: Settings,
    audio_duration: f64,
    fail_compose: bool,
    calls: SharedCalls,
}

impl TestRig {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("face.png"), b"png").unwrap();
        fs::write(root.join("voice.wav"), b"RIFF").unwrap();

        let mut settings = Settings::default();
        let out = root.join("outputs");
        settings.paths.output_folder = out.to_string_lossy().to_string();
        settings.paths.logs_folder = out.join("logs").to_string_lossy().to_string();
        settings.paths.background_cache_folder =
            out.join("backgrounds").to_string_lossy().to_string();
        settings.chunking.enabled = false;

        Self {
            dir,
            settings,
            audio_duration: 5.0,
            fail_compose: false,
            calls: SharedCalls::default(),
        }
    }

    pub fn with_audio_duration(mut self, seconds: f64) -> Self {
        self.audio_duration = seconds;
        self
    }

    pub fn with_chunking(mut self, chunk_seconds: u32) -> Self {
        self.settings.chunking.enabled = true;
        self.settings.chunking.chunk_seconds = chunk_seconds;
        self
    }

    pub fn failing_compose(mut self) -> Self {
        self.fail_compose = true;
        self
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn settings(&self) -> Settings {
        self.settings.clone()
    }

    pub fn inputs(&self) -> RunInputs {
        RunInputs::new(self.dir().join("face.png"), self.dir().join("voice.wav"), SCRIPT)
    }

    pub fn engines(&self) -> Engines {
        Engines::new(
            Box::new(FakePreparer(Arc::clone(&self.calls))),
            Box::new(FakeSynthesizer(Arc::clone(&self.calls))),
            Box::new(FakeRenderer(Arc::clone(&self.calls))),
        )
    }

    pub fn media(&self) -> Arc<dyn MediaBackend> {
        Arc::new(FakeMedia {
            calls: Arc::clone(&self.calls),
            duration: self.audio_duration,
            fail_compose: self.fail_compose,
        })
    }

    /// A ready context for a fresh run.
    pub fn context(&self, preset: Option<&'static Preset>) -> Context {
        let run_id = RunId::generate();
        let logger = RunLogger::new(
            run_id.as_str(),
            &self.settings.paths.logs_folder,
            LogConfig::default(),
            None,
        )
        .unwrap();
        Context::new(
            self.settings(),
            self.inputs(),
            ArtifactSet::new(&self.settings.paths.output_folder, run_id),
            preset,
            Arc::new(self.engines()),
            self.media(),
            Arc::new(logger),
        )
    }

    pub fn progress_sink(&self) -> ProgressSink {
        ProgressSink::default()
    }

    /// Record image and speech stage outputs as if those stages had run.
    pub fn seed_image_and_speech(&self, ctx: &Context, state: &mut RunState) {
        write_file(&ctx.artifacts.avatar_image, b"png").unwrap();
        write_file(&ctx.artifacts.audio, b"RIFF").unwrap();
        state.image = Some(ImageOutput {
            path: ctx.artifacts.avatar_image.clone(),
            size: ctx.settings.image.size,
        });
        state.speech = Some(SpeechOutput {
            audio: ctx.artifacts.audio.clone(),
            duration: self.audio_duration,
        });
    }

    /// Record a direct render as if the render stage had run.
    pub fn seed_raw_video(&self, ctx: &Context, state: &mut RunState) {
        write_file(&ctx.artifacts.raw_video, b"clip:audio\n").unwrap();
        state.render = Some(RenderOutput {
            mode: RenderMode::Direct,
            raw_video: ctx.artifacts.raw_video.clone(),
            chunks: Vec::new(),
            concat_list: None,
        });
    }

    pub fn preparer_focus(&self) -> Vec<Option<f32>> {
        self.calls.lock().focus.clone()
    }

    pub fn synthesized_texts(&self) -> Vec<String> {
        self.calls.lock().texts.clone()
    }

    pub fn rendered_audio(&self) -> Vec<PathBuf> {
        self.calls.lock().render_audio.clone()
    }

    pub fn rendered_durations(&self) -> Vec<Option<f64>> {
        self.calls.lock().render_durations.clone()
    }

    pub fn composed(&self) -> Vec<ComposeCall> {
        self.calls.lock().composed.clone()
    }
}
