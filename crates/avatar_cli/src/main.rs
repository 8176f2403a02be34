//! avatar-video - command-line front end for talking-avatar video assembly.
//!
//! Usage:
//!   avatar-video render --image face.png --voice voice.wav --script "Hello" --preset teacher
//!   avatar-video presets
//!   avatar-video previews --image face.png --voice voice.wav --out-dir previews
//!   avatar-video init-config --config avatar.toml

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context as _, Result};
use clap::{Args, Parser, Subcommand};

use avatar_core::config::{ConfigManager, Settings};
use avatar_core::engines::Engines;
use avatar_core::logging::init_tracing;
use avatar_core::orchestrator::{AvatarPipeline, PipelineError, RunInputs};
use avatar_core::presets::list_presets;

const DEFAULT_CONFIG: &str = "avatar.toml";

const PREVIEW_SCRIPT: &str =
    "This is a layout preview. The subtitles should stay inside their box.";

#[derive(Debug, Parser)]
#[command(name = "avatar-video", version, about = "Assemble talking-avatar videos")]
struct Cli {
    /// Config file (created with defaults when missing)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the full pipeline and print the final video path
    Render(RenderArgs),
    /// List the scene presets
    Presets,
    /// Render every preset with placeholder speech and a still avatar
    Previews(PreviewArgs),
    /// Write the default config file
    InitConfig,
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Avatar image
    #[arg(long)]
    image: PathBuf,

    /// Voice sample to clone
    #[arg(long)]
    voice: PathBuf,

    /// Script text
    #[arg(long, conflicts_with = "script_file", required_unless_present = "script_file")]
    script: Option<String>,

    /// Read the script from a file
    #[arg(long)]
    script_file: Option<PathBuf>,

    /// Preset key or label; `none` for the raw clip
    #[arg(long)]
    preset: Option<String>,

    /// Custom background image or video
    #[arg(long)]
    background: Option<PathBuf>,

    /// Reference video for the renderer
    #[arg(long)]
    reference: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct PreviewArgs {
    #[arg(long)]
    image: PathBuf,

    #[arg(long)]
    voice: PathBuf,

    #[arg(long, default_value = "previews")]
    out_dir: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::InitConfig => init_config(&cli.config),
        Command::Presets => {
            print_presets();
            Ok(())
        }
        Command::Render(args) => {
            let settings = load_settings(&cli.config)?;
            render(settings, args)
        }
        Command::Previews(args) => {
            let settings = load_settings(&cli.config)?;
            previews(settings, args)
        }
    }
}

fn load_settings(path: &Path) -> Result<Settings> {
    let mut config = ConfigManager::new(path);
    config
        .load_or_create()
        .with_context(|| format!("loading {}", path.display()))?;
    let settings = config.effective_settings();
    init_tracing(settings.logging.level);
    tracing::debug!("Loaded config from {}", path.display());
    Ok(settings)
}

fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    let mut config = ConfigManager::new(path);
    config
        .load_or_create()
        .with_context(|| format!("writing {}", path.display()))?;
    config.ensure_dirs_exist()?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn print_presets() {
    println!("{:<22} {:<22} {:<10} SUBTITLES", "KEY", "LABEL", "SIZE");
    for preset in list_presets() {
        println!(
            "{:<22} {:<22} {:<10} {}",
            preset.key,
            preset.label,
            preset.resolution.to_string(),
            if preset.has_subtitles() { "yes" } else { "no" }
        );
    }
}

fn render(settings: Settings, args: RenderArgs) -> Result<()> {
    let script = read_script(args.script, args.script_file.as_deref())?;

    let mut inputs = RunInputs::new(args.image, args.voice, script);
    if let Some(preset) = args.preset {
        inputs = inputs.with_preset(preset);
    }
    if let Some(background) = args.background {
        inputs = inputs.with_background(background);
    }
    if let Some(reference) = args.reference {
        inputs = inputs.with_reference_video(reference);
    }

    let outputs = AvatarPipeline::new(settings)
        .with_progress_callback(std::sync::Arc::new(|stage: &str, percent: u32, message: &str| {
            tracing::info!("[{:>3}%] {}: {}", percent, stage, message);
        }))
        .run(inputs)
        .map_err(describe)?;

    if !outputs.chunks.is_empty() {
        println!("Rendered {} chunks", outputs.chunks.len());
    }
    println!("Manifest: {}", outputs.manifest.display());
    println!("{}", outputs.final_video.display());
    Ok(())
}

fn previews(settings: Settings, args: PreviewArgs) -> Result<()> {
    let engines = Engines::preview(&settings);
    let rendered = AvatarPipeline::new(settings)
        .with_engines(engines)
        .render_previews(&args.image, &args.voice, PREVIEW_SCRIPT, &args.out_dir)
        .map_err(describe)?;

    for path in rendered {
        println!("{}", path.display());
    }
    Ok(())
}

/// Prefix a run failure with its error kind.
fn describe(err: PipelineError) -> anyhow::Error {
    anyhow!("{}: {}", err.kind(), err)
}

/// Script from `--script`, or the trimmed contents of `--script-file`.
fn read_script(inline: Option<String>, file: Option<&Path>) -> Result<String> {
    match (inline, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading script {}", path.display()))?;
            Ok(text.trim().to_string())
        }
        (None, None) => bail!("either --script or --script-file is required"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_accepts_inline_script() {
        let cli = Cli::try_parse_from([
            "avatar-video",
            "render",
            "--image",
            "face.png",
            "--voice",
            "voice.wav",
            "--script",
            "Hello there",
            "--preset",
            "none",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG));
        match cli.command {
            Command::Render(args) => {
                assert_eq!(args.script.as_deref(), Some("Hello there"));
                assert_eq!(args.preset.as_deref(), Some("none"));
                assert!(args.background.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn render_requires_a_script_source() {
        let result = Cli::try_parse_from([
            "avatar-video",
            "render",
            "--image",
            "face.png",
            "--voice",
            "voice.wav",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn script_and_script_file_conflict() {
        let result = Cli::try_parse_from([
            "avatar-video",
            "render",
            "--image",
            "a.png",
            "--voice",
            "v.wav",
            "--script",
            "hi",
            "--script-file",
            "s.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["avatar-video", "presets", "--config", "custom.toml"])
            .unwrap();
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert!(matches!(cli.command, Command::Presets));
    }

    #[test]
    fn script_file_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.txt");
        fs::write(&path, "\n  Welcome back.\n\n").unwrap();
        assert_eq!(read_script(None, Some(&path)).unwrap(), "Welcome back.");
        assert!(read_script(None, Some(&dir.path().join("missing.txt"))).is_err());
    }

    #[test]
    fn init_config_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avatar.toml");
        fs::write(&path, "[chunking]\nchunk_seconds = 45\n").unwrap();

        let err = init_config(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "[chunking]\nchunk_seconds = 45\n"
        );
    }
}
