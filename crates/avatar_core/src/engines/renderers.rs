//! Talking-head renderers.
//!
//! Each renderer turns a prepared image plus an audio track into a clip and
//! returns the path it wrote. The clip length follows the audio.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::{EngineError, EngineResult};
use super::template::Placeholders;
use super::{RenderRequest, TalkingHeadRenderer};
use crate::config::RendererSettings;
use crate::logging::RunLogger;
use crate::media::{absolute_path, ensure_output, path_arg, MediaTools, ToolCommand};

/// EchoMimic inference entry point inside its checkout.
const ECHOMIMIC_SCRIPT: &str = "infer_audio2vid.py";

fn check_inputs(request: &RenderRequest<'_>) -> EngineResult<()> {
    for (label, path) in [("image", request.image), ("audio", request.audio)] {
        if !path.exists() {
            return Err(EngineError::missing_input(format!(
                "{} not found: {}",
                label,
                path.display()
            )));
        }
    }
    Ok(())
}

fn prepare_output(out_path: &Path) -> EngineResult<()> {
    match out_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| EngineError::io("creating clip directory", e))
        }
        _ => Ok(()),
    }
}

/// Run a prepared command and confirm the clip was written.
fn run_to_clip(
    command: &ToolCommand,
    out_path: &Path,
    logger: Option<&RunLogger>,
) -> EngineResult<PathBuf> {
    prepare_output(out_path)?;
    command.run(logger)?;
    ensure_output(out_path)?;
    Ok(out_path.to_path_buf())
}

/// Renderer driving an EchoMimic checkout through its inference script.
#[derive(Debug, Clone)]
pub struct EchoMimicRenderer {
    python: String,
    dir: PathBuf,
    weights: PathBuf,
    config: String,
}

impl EchoMimicRenderer {
    pub fn new(
        python: impl Into<String>,
        dir: impl Into<PathBuf>,
        weights: impl Into<PathBuf>,
        config: impl Into<String>,
    ) -> Self {
        Self {
            python: python.into(),
            dir: dir.into(),
            weights: weights.into(),
            config: config.into(),
        }
    }

    pub fn from_settings(settings: &RendererSettings) -> Self {
        Self::new(
            &settings.python_path,
            &settings.echomimic_dir,
            &settings.echomimic_weights,
            &settings.echomimic_config,
        )
    }

    /// Check that the checkout, weights and script are all present.
    pub fn check_installation(&self) -> EngineResult<()> {
        if !self.dir.is_dir() {
            return Err(EngineError::not_configured(format!(
                "EchoMimic directory not found: {}",
                self.dir.display()
            )));
        }
        if !self.weights.exists() {
            return Err(EngineError::not_configured(format!(
                "EchoMimic weights not found: {}",
                self.weights.display()
            )));
        }
        let script = self.dir.join(ECHOMIMIC_SCRIPT);
        if !script.is_file() {
            return Err(EngineError::not_configured(format!(
                "EchoMimic script not found: {}",
                script.display()
            )));
        }
        Ok(())
    }

    /// Build the inference command. The command runs inside the checkout,
    /// so every path is made absolute first.
    pub fn command(&self, request: &RenderRequest<'_>) -> EngineResult<ToolCommand> {
        let dir = absolute_path(&self.dir)?;
        let mut args = vec![
            path_arg(&dir.join(ECHOMIMIC_SCRIPT)),
            "--config".to_string(),
            path_arg(&dir.join(&self.config)),
            "--ckpt_path".to_string(),
            path_arg(&absolute_path(&self.weights)?),
            "--input_image".to_string(),
            path_arg(&absolute_path(request.image)?),
            "--input_audio".to_string(),
            path_arg(&absolute_path(request.audio)?),
            "--output_video".to_string(),
            path_arg(&absolute_path(request.out_path)?),
        ];
        if let Some(reference) = request.reference {
            args.push("--input_video".to_string());
            args.push(path_arg(&absolute_path(reference)?));
        }

        Ok(ToolCommand::new(&self.python, args).with_cwd(dir))
    }
}

impl TalkingHeadRenderer for EchoMimicRenderer {
    fn name(&self) -> &str {
        "echomimic"
    }

    fn render(
        &self,
        request: &RenderRequest<'_>,
        logger: Option<&RunLogger>,
    ) -> EngineResult<PathBuf> {
        self.check_installation()?;
        check_inputs(request)?;
        let command = self.command(request)?;
        run_to_clip(&command, request.out_path, logger)
    }
}

/// Renderer running an arbitrary command template.
///
/// Placeholders: `{image_path}`, `{audio_path}`, `{out_path}`, `{prompt}`,
/// `{duration}` (whole seconds, rounded up) and `{reference}`. Tokens that
/// end up empty are dropped, so `{reference}` vanishes without a reference.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    command: Vec<String>,
    workdir: Option<PathBuf>,
    prompt: String,
}

impl CommandRenderer {
    pub fn new(command: Vec<String>, prompt: impl Into<String>) -> Self {
        Self {
            command,
            workdir: None,
            prompt: prompt.into(),
        }
    }

    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    pub fn from_settings(settings: &RendererSettings) -> Self {
        let renderer = Self::new(settings.command.clone(), &settings.prompt);
        if settings.command_workdir.trim().is_empty() {
            renderer
        } else {
            renderer.with_workdir(&settings.command_workdir)
        }
    }

    pub fn command(&self, request: &RenderRequest<'_>) -> EngineResult<ToolCommand> {
        let absolute = |p: &Path| absolute_path(p).map(|p| path_arg(&p));

        let duration = request
            .duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(|d| format!("{}", d.ceil() as u64));

        let values = Placeholders::new()
            .set("image_path", absolute(request.image)?)
            .set("audio_path", absolute(request.audio)?)
            .set("out_path", absolute(request.out_path)?)
            .set("prompt", self.prompt.as_str())
            .set_opt("duration", duration)
            .set_opt("reference", request.reference.map(absolute).transpose()?);

        let mut tokens = values.render(&self.command).into_iter();
        let program = tokens
            .next()
            .ok_or_else(|| EngineError::not_configured("renderer.command is empty"))?;

        let command = ToolCommand::new(program, tokens.collect());
        Ok(match &self.workdir {
            Some(dir) => command.with_cwd(dir),
            None => command,
        })
    }
}

impl TalkingHeadRenderer for CommandRenderer {
    fn name(&self) -> &str {
        "command"
    }

    fn render(
        &self,
        request: &RenderRequest<'_>,
        logger: Option<&RunLogger>,
    ) -> EngineResult<PathBuf> {
        check_inputs(request)?;
        let command = self.command(request)?;
        run_to_clip(&command, request.out_path, logger)
    }
}

/// Dummy renderer: loops the prepared image over the audio.
#[derive(Debug, Clone, Default)]
pub struct StillImageRenderer {
    tools: MediaTools,
}

impl StillImageRenderer {
    pub fn new(tools: MediaTools) -> Self {
        Self { tools }
    }

    pub fn still_args(image: &Path, audio: &Path, out: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-loop".to_string(),
            "1".to_string(),
            "-i".to_string(),
            path_arg(image),
            "-i".to_string(),
            path_arg(audio),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-tune".to_string(),
            "stillimage".to_string(),
            "-shortest".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            path_arg(out),
        ]
    }
}

impl TalkingHeadRenderer for StillImageRenderer {
    fn name(&self) -> &str {
        "still"
    }

    fn render(
        &self,
        request: &RenderRequest<'_>,
        logger: Option<&RunLogger>,
    ) -> EngineResult<PathBuf> {
        check_inputs(request)?;
        let command = self.tools.ffmpeg_command(Self::still_args(
            request.image,
            request.audio,
            request.out_path,
        ));
        run_to_clip(&command, request.out_path, logger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorKind;
    use tempfile::tempdir;

    fn request<'a>(image: &'a Path, audio: &'a Path, out: &'a Path) -> RenderRequest<'a> {
        RenderRequest {
            image,
            audio,
            reference: None,
            out_path: out,
            duration: None,
        }
    }

    fn fake_checkout(root: &Path) -> EchoMimicRenderer {
        let dir = root.join("EchoMimic");
        let weights = dir.join("pretrained_weights");
        fs::create_dir_all(&weights).unwrap();
        fs::write(dir.join(ECHOMIMIC_SCRIPT), b"# inference").unwrap();
        EchoMimicRenderer::new("python3", &dir, &weights, "configs/infer_audio2vid.yaml")
    }

    #[test]
    fn echomimic_command_layout() {
        let root = tempdir().unwrap();
        let renderer = fake_checkout(root.path());
        let dir = root.path().join("EchoMimic");

        let mut req = request(
            Path::new("/in/avatar.png"),
            Path::new("/in/audio.wav"),
            Path::new("/out/raw.mp4"),
        );
        let reference = PathBuf::from("/in/ref.mp4");
        req.reference = Some(&reference);

        let cmd = renderer.command(&req).unwrap();
        assert_eq!(cmd.program, "python3");
        assert_eq!(cmd.cwd.as_deref(), Some(dir.as_path()));
        assert_eq!(cmd.args[0], path_arg(&dir.join(ECHOMIMIC_SCRIPT)));
        assert_eq!(
            &cmd.args[1..],
            &[
                "--config".to_string(),
                path_arg(&dir.join("configs/infer_audio2vid.yaml")),
                "--ckpt_path".to_string(),
                path_arg(&dir.join("pretrained_weights")),
                "--input_image".to_string(),
                "/in/avatar.png".to_string(),
                "--input_audio".to_string(),
                "/in/audio.wav".to_string(),
                "--output_video".to_string(),
                "/out/raw.mp4".to_string(),
                "--input_video".to_string(),
                "/in/ref.mp4".to_string(),
            ]
        );
    }

    #[test]
    fn echomimic_relative_paths_become_absolute() {
        let root = tempdir().unwrap();
        let renderer = fake_checkout(root.path());
        let req = request(
            Path::new("avatar.png"),
            Path::new("audio.wav"),
            Path::new("out/raw.mp4"),
        );

        let cmd = renderer.command(&req).unwrap();
        let image_idx = cmd.args.iter().position(|a| a == "--input_image").unwrap();
        assert!(Path::new(&cmd.args[image_idx + 1]).is_absolute());
        assert!(!cmd.args.contains(&"--input_video".to_string()));
    }

    #[test]
    fn echomimic_missing_checkout_is_configuration_error() {
        let root = tempdir().unwrap();
        let renderer = EchoMimicRenderer::new(
            "python",
            root.path().join("missing"),
            root.path().join("weights"),
            "cfg.yaml",
        );
        let err = renderer.check_installation().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        // Directory present but script absent
        let dir = root.path().join("EchoMimic");
        fs::create_dir_all(dir.join("w")).unwrap();
        let renderer = EchoMimicRenderer::new("python", &dir, dir.join("w"), "cfg.yaml");
        let err = renderer.check_installation().unwrap_err();
        assert!(err.to_string().contains(ECHOMIMIC_SCRIPT));
    }

    #[test]
    fn command_template_substitutes_and_drops_empty() {
        let renderer = CommandRenderer::new(
            vec![
                "render-avatar".into(),
                "--image".into(),
                "{image_path}".into(),
                "--audio".into(),
                "{audio_path}".into(),
                "--seconds={duration}".into(),
                "{reference}".into(),
                "--prompt".into(),
                "{prompt}".into(),
                "{out_path}".into(),
            ],
            "a friendly host",
        );
        let mut req = request(
            Path::new("/a/img.png"),
            Path::new("/a/audio.wav"),
            Path::new("/a/raw.mp4"),
        );
        req.duration = Some(12.2);

        let cmd = renderer.command(&req).unwrap();
        assert_eq!(cmd.program, "render-avatar");
        assert_eq!(
            cmd.args,
            vec![
                "--image",
                "/a/img.png",
                "--audio",
                "/a/audio.wav",
                "--seconds=13",
                "--prompt",
                "a friendly host",
                "/a/raw.mp4"
            ]
        );
        assert_eq!(cmd.cwd, None);
    }

    #[test]
    fn command_renderer_from_settings() {
        let settings = RendererSettings {
            command: vec!["tool".into(), "{out_path}".into()],
            command_workdir: "/srv/model".into(),
            ..RendererSettings::default()
        };
        let renderer = CommandRenderer::from_settings(&settings);
        let cmd = renderer
            .command(&request(Path::new("/i.png"), Path::new("/a.wav"), Path::new("/o.mp4")))
            .unwrap();
        assert_eq!(cmd.cwd, Some(PathBuf::from("/srv/model")));
        assert_eq!(cmd.args, vec!["/o.mp4"]);
    }

    #[test]
    fn empty_command_template_is_configuration_error() {
        let renderer = CommandRenderer::from_settings(&RendererSettings::default());
        let err = renderer
            .command(&request(Path::new("/i.png"), Path::new("/a.wav"), Path::new("/o.mp4")))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn missing_inputs_are_reported_before_running() {
        let dir = tempdir().unwrap();
        let renderer = StillImageRenderer::default();
        let err = renderer
            .render(
                &request(
                    &dir.path().join("none.png"),
                    &dir.path().join("none.wav"),
                    &dir.path().join("raw.mp4"),
                ),
                None,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingInput);
    }

    #[test]
    fn still_args_loop_image_until_audio_ends() {
        let args = StillImageRenderer::still_args(
            Path::new("img.png"),
            Path::new("a.wav"),
            Path::new("raw.mp4"),
        );
        assert_eq!(&args[..5], &["-y", "-loop", "1", "-i", "img.png"]);
        assert!(args.windows(2).any(|w| w[0] == "-tune" && w[1] == "stillimage"));
        assert!(args.contains(&"-shortest".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("raw.mp4"));
    }

    #[cfg(unix)]
    #[test]
    fn command_renderer_returns_written_clip() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("img.png");
        let audio = dir.path().join("a.wav");
        fs::write(&image, b"png").unwrap();
        fs::write(&audio, b"wav").unwrap();
        let out = dir.path().join("clips").join("raw.mp4");

        let renderer = CommandRenderer::new(
            vec![
                "sh".into(),
                "-c".into(),
                "cat \"$1\" > \"$2\"".into(),
                "sh".into(),
                "{audio_path}".into(),
                "{out_path}".into(),
            ],
            "",
        );
        let clip = renderer.render(&request(&image, &audio, &out), None).unwrap();
        assert_eq!(clip, out);
        assert_eq!(fs::read(&out).unwrap(), b"wav");
    }
}
