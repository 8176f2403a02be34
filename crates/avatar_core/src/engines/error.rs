//! Engine error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::media::MediaError;
use crate::models::ErrorKind;

/// Errors from the image preparer, speech synthesizer and renderers.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A required input is absent or empty.
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// The feature is switched off in the configuration.
    #[error("{0} is disabled in the configuration")]
    Disabled(String),

    /// A required setting is missing or points nowhere.
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// The underlying tool failed.
    #[error(transparent)]
    Media(#[from] MediaError),

    /// Image decode/encode error.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// The engine finished without producing its output.
    #[error("Engine produced no output at {}", .0.display())]
    OutputMissing(PathBuf),
}

impl EngineError {
    pub fn missing_input(message: impl Into<String>) -> Self {
        Self::MissingInput(message.into())
    }

    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::NotConfigured(message.into())
    }

    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingInput(_) => ErrorKind::MissingInput,
            Self::Disabled(_) | Self::NotConfigured(_) => ErrorKind::Configuration,
            Self::Media(e) => e.kind(),
            Self::Image(_) | Self::Io { .. } => ErrorKind::Io,
            Self::OutputMissing(_) => ErrorKind::InvalidOutput,
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
