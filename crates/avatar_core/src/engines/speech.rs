//! Speech synthesizers.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::{EngineError, EngineResult};
use super::template::Placeholders;
use super::{SpeechRequest, SpeechSynthesizer};
use crate::config::TtsSettings;
use crate::logging::RunLogger;
use crate::media::{ensure_output, path_arg, MediaTools, ToolCommand};

fn ensure_parent(path: &Path) -> EngineResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| EngineError::io("creating audio directory", e))
        }
        _ => Ok(()),
    }
}

/// Synthesizer that runs a TTS command template (Coqui `tts` by default).
///
/// Placeholders: `{text}`, `{voice}`, `{language}`, `{model}`, `{out_path}`.
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    enabled: bool,
    model: String,
    command: Vec<String>,
}

impl CommandSynthesizer {
    pub fn new(model: impl Into<String>, command: Vec<String>) -> Self {
        Self {
            enabled: true,
            model: model.into(),
            command,
        }
    }

    pub fn from_settings(settings: &TtsSettings) -> Self {
        Self {
            enabled: settings.enable,
            model: settings.model_name.clone(),
            command: settings.command.clone(),
        }
    }

    /// Build the command for one request.
    pub fn command(&self, request: &SpeechRequest<'_>) -> EngineResult<ToolCommand> {
        let values = Placeholders::new()
            .set("text", request.text.trim())
            .set("voice", path_arg(request.voice_sample))
            .set("language", request.language)
            .set("model", self.model.as_str())
            .set("out_path", path_arg(request.out_path));

        let mut tokens = values.render(&self.command).into_iter();
        let program = tokens
            .next()
            .ok_or_else(|| EngineError::not_configured("tts.command is empty"))?;
        Ok(ToolCommand::new(program, tokens.collect()))
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn name(&self) -> &str {
        "command-tts"
    }

    fn synthesize(
        &self,
        request: &SpeechRequest<'_>,
        logger: Option<&RunLogger>,
    ) -> EngineResult<PathBuf> {
        if !self.enabled {
            return Err(EngineError::Disabled("Speech synthesis".to_string()));
        }
        if request.text.trim().is_empty() {
            return Err(EngineError::missing_input("script text is empty"));
        }
        if !request.voice_sample.exists() {
            return Err(EngineError::missing_input(format!(
                "voice sample not found: {}",
                request.voice_sample.display()
            )));
        }

        let command = self.command(request)?;
        ensure_parent(request.out_path)?;
        command.run(logger)?;
        ensure_output(request.out_path)?;

        Ok(request.out_path.to_path_buf())
    }
}

/// Preview synthesizer producing a sine tone instead of speech.
///
/// The tone length scales with the word count so subtitle timing still
/// looks plausible. The voice sample is ignored.
#[derive(Debug, Clone)]
pub struct ToneSynthesizer {
    tools: MediaTools,
    frequency_hz: f64,
    seconds_per_word: f64,
    min_seconds: f64,
}

impl ToneSynthesizer {
    pub fn new(tools: MediaTools) -> Self {
        Self {
            tools,
            frequency_hz: 440.0,
            seconds_per_word: 0.4,
            min_seconds: 2.0,
        }
    }

    /// Tone length for a script.
    pub fn duration_for(&self, text: &str) -> f64 {
        let words = text.split_whitespace().count() as f64;
        (words * self.seconds_per_word).max(self.min_seconds)
    }

    /// ffmpeg arguments generating the tone as mono WAV.
    pub fn tone_args(&self, seconds: f64, out: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-f".to_string(),
            "lavfi".to_string(),
            "-i".to_string(),
            format!(
                "sine=frequency={}:sample_rate=44100:duration={:.3}",
                self.frequency_hz, seconds
            ),
            "-af".to_string(),
            "volume=0.2".to_string(),
            "-ac".to_string(),
            "1".to_string(),
            path_arg(out),
        ]
    }
}

impl SpeechSynthesizer for ToneSynthesizer {
    fn name(&self) -> &str {
        "tone"
    }

    fn synthesize(
        &self,
        request: &SpeechRequest<'_>,
        logger: Option<&RunLogger>,
    ) -> EngineResult<PathBuf> {
        if request.text.trim().is_empty() {
            return Err(EngineError::missing_input("script text is empty"));
        }

        let seconds = self.duration_for(request.text);
        ensure_parent(request.out_path)?;
        self.tools
            .ffmpeg_command(self.tone_args(seconds, request.out_path))
            .run(logger)?;
        ensure_output(request.out_path)?;

        Ok(request.out_path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorKind;
    use tempfile::tempdir;

    fn request<'a>(text: &'a str, voice: &'a Path, out: &'a Path) -> SpeechRequest<'a> {
        SpeechRequest {
            text,
            voice_sample: voice,
            language: "en",
            out_path: out,
        }
    }

    #[test]
    fn default_template_builds_coqui_command() {
        let settings = TtsSettings::default();
        let synth = CommandSynthesizer::from_settings(&settings);
        let req = request(
            "  Hello there.  ",
            Path::new("/v/voice.wav"),
            Path::new("/o/audio.wav"),
        );

        let cmd = synth.command(&req).unwrap();
        assert_eq!(cmd.program, "tts");
        assert_eq!(
            cmd.args,
            vec![
                "--model_name",
                settings.model_name.as_str(),
                "--text",
                "Hello there.",
                "--speaker_wav",
                "/v/voice.wav",
                "--language_idx",
                "en",
                "--out_path",
                "/o/audio.wav"
            ]
        );
    }

    #[test]
    fn empty_text_is_missing_input() {
        let dir = tempdir().unwrap();
        let voice = dir.path().join("voice.wav");
        fs::write(&voice, b"RIFF").unwrap();
        let out = dir.path().join("audio.wav");

        let synth = CommandSynthesizer::from_settings(&TtsSettings::default());
        let err = synth.synthesize(&request("  \n", &voice, &out), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingInput);
    }

    #[test]
    fn missing_voice_is_missing_input() {
        let dir = tempdir().unwrap();
        let synth = CommandSynthesizer::from_settings(&TtsSettings::default());
        let err = synth
            .synthesize(
                &request("Hi", &dir.path().join("nope.wav"), &dir.path().join("a.wav")),
                None,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingInput);
    }

    #[test]
    fn disabled_tts_is_configuration_error() {
        let settings = TtsSettings {
            enable: false,
            ..TtsSettings::default()
        };
        let synth = CommandSynthesizer::from_settings(&settings);
        let err = synth
            .synthesize(
                &request("Hi", Path::new("v.wav"), Path::new("a.wav")),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::Disabled(_)));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn empty_command_is_configuration_error() {
        let synth = CommandSynthesizer::new("model", Vec::new());
        let err = synth
            .command(&request("Hi", Path::new("v.wav"), Path::new("a.wav")))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[cfg(unix)]
    #[test]
    fn runs_template_and_returns_output() {
        let dir = tempdir().unwrap();
        let voice = dir.path().join("voice.wav");
        fs::write(&voice, b"RIFF").unwrap();
        let out = dir.path().join("nested").join("audio.wav");

        let synth = CommandSynthesizer::new(
            "unused",
            vec![
                "sh".into(),
                "-c".into(),
                "printf '%s' \"$1\" > \"$2\"".into(),
                "sh".into(),
                "{text}".into(),
                "{out_path}".into(),
            ],
        );
        let written = synth
            .synthesize(&request("spoken words", &voice, &out), None)
            .unwrap();

        assert_eq!(written, out);
        assert_eq!(fs::read_to_string(&out).unwrap(), "spoken words");
    }

    #[test]
    fn tone_length_scales_with_words() {
        let tone = ToneSynthesizer::new(MediaTools::default());
        assert_eq!(tone.duration_for("one two"), 2.0);
        let twenty = vec!["w"; 20].join(" ");
        assert!((tone.duration_for(&twenty) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn tone_args_use_lavfi_sine() {
        let tone = ToneSynthesizer::new(MediaTools::default());
        let args = tone.tone_args(2.5, Path::new("a.wav"));
        assert_eq!(&args[..4], &["-y", "-f", "lavfi", "-i"]);
        assert_eq!(args[4], "sine=frequency=440:sample_rate=44100:duration=2.500");
        assert_eq!(args.last().map(String::as_str), Some("a.wav"));
    }
}
