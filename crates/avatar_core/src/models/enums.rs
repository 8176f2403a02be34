//! Core enums used throughout the application.

use serde::{Deserialize, Serialize};

/// Classification of a failure, surfaced to the caller alongside the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A required image, voice sample or script is absent.
    MissingInput,
    /// A feature is disabled or a required external-tool setting is missing.
    Configuration,
    /// An external process (synthesis, rendering, media tool) failed.
    ExternalToolFailure,
    /// Local filesystem error while staging artifacts.
    Io,
    /// A stage finished but did not produce what it promised.
    InvalidOutput,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::MissingInput => write!(f, "MissingInput"),
            ErrorKind::Configuration => write!(f, "ConfigurationError"),
            ErrorKind::ExternalToolFailure => write!(f, "ExternalToolFailure"),
            ErrorKind::Io => write!(f, "IoError"),
            ErrorKind::InvalidOutput => write!(f, "InvalidOutput"),
        }
    }
}

/// Which talking-head renderer drives the render stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderEngine {
    /// EchoMimic audio-to-video inference script.
    #[default]
    Echomimic,
    /// Arbitrary command template (e.g. an LTX runner).
    Command,
    /// Still image looped over the audio; used for previews and dry runs.
    Still,
}

impl RenderEngine {
    /// Parse an engine name (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "echomimic" => Some(Self::Echomimic),
            "command" | "ltx" => Some(Self::Command),
            "still" | "dummy" => Some(Self::Still),
            _ => None,
        }
    }
}

impl std::fmt::Display for RenderEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderEngine::Echomimic => write!(f, "echomimic"),
            RenderEngine::Command => write!(f, "command"),
            RenderEngine::Still => write!(f, "still"),
        }
    }
}
