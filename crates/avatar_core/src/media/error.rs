//! Media error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::ErrorKind;

/// Errors from media-tool invocation, probing, chunking, compositing and
/// background drawing.
#[derive(Error, Debug)]
pub enum MediaError {
    /// An input file does not exist.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The tool could not be started at all.
    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The tool ran and exited non-zero.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// Image encode/decode error.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Tool output could not be parsed.
    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    /// A caller-supplied value is unusable.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A tool reported success but its output is missing or empty.
    #[error("Expected output missing or empty: {}", .0.display())]
    OutputMissing(PathBuf),
}

impl MediaError {
    /// Create an I/O error with operation context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a command failed error.
    pub fn command_failed(
        tool: impl Into<String>,
        exit_code: i32,
        message: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            what: what.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::MissingInput,
            Self::Spawn { .. } | Self::CommandFailed { .. } | Self::Parse { .. } => {
                ErrorKind::ExternalToolFailure
            }
            Self::Io { .. } | Self::Image(_) => ErrorKind::Io,
            Self::InvalidArgument(_) => ErrorKind::Configuration,
            Self::OutputMissing(_) => ErrorKind::InvalidOutput,
        }
    }
}

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;
