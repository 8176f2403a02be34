//! Error types for the orchestrator pipeline.
//!
//! Errors carry context that chains through layers:
//! Run → Stage → Operation → Detail

use std::io;

use thiserror::Error;

use crate::engines::EngineError;
use crate::media::MediaError;
use crate::models::ErrorKind;
use crate::subtitles::SubtitleError;

/// Top-level pipeline error with run context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A stage failed during execution.
    #[error("Run '{run_id}' failed at stage '{stage}': {source}")]
    StepFailed {
        run_id: String,
        stage: String,
        #[source]
        source: StepError,
    },

    /// Input validation failed before the pipeline started.
    #[error("Run '{run_id}' failed validation: {message}")]
    ValidationFailed { run_id: String, message: String },

    /// Failed to set up or finish the run (directories, log file, manifest).
    #[error("Run '{run_id}' setup failed: {message}")]
    SetupFailed { run_id: String, message: String },
}

impl PipelineError {
    pub fn step_failed(
        run_id: impl Into<String>,
        stage: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            run_id: run_id.into(),
            stage: stage.into(),
            source,
        }
    }

    pub fn validation_failed(run_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            run_id: run_id.into(),
            message: message.into(),
        }
    }

    pub fn setup_failed(run_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SetupFailed {
            run_id: run_id.into(),
            message: message.into(),
        }
    }

    /// Name of the stage that failed, if a stage failed.
    pub fn stage(&self) -> Option<&str> {
        match self {
            Self::StepFailed { stage, .. } => Some(stage),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StepFailed { source, .. } => source.kind(),
            Self::ValidationFailed { .. } => ErrorKind::MissingInput,
            Self::SetupFailed { .. } => ErrorKind::Io,
        }
    }
}

/// Error from a pipeline stage with operation context.
#[derive(Error, Debug)]
pub enum StepError {
    /// A required input is absent.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// The stage did not produce what it promised.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// A feature is disabled or a required setting is missing.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An external command failed.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    IoError {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// A required file was not found.
    #[error("Required file not found: {path}")]
    FileNotFound { path: String },

    #[error(transparent)]
    Media(MediaError),

    #[error(transparent)]
    Engine(EngineError),

    #[error(transparent)]
    Subtitles(#[from] SubtitleError),
}

impl StepError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::IoError {
            operation: operation.into(),
            source,
        }
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::FileNotFound { .. } => ErrorKind::MissingInput,
            Self::InvalidOutput(_) => ErrorKind::InvalidOutput,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::CommandFailed { .. } => ErrorKind::ExternalToolFailure,
            Self::IoError { .. } => ErrorKind::Io,
            Self::Media(e) => e.kind(),
            Self::Engine(e) => e.kind(),
            Self::Subtitles(e) => e.kind(),
        }
    }
}

impl From<MediaError> for StepError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::CommandFailed {
                tool,
                exit_code,
                message,
            } => Self::CommandFailed {
                tool,
                exit_code,
                message,
            },
            MediaError::NotFound(path) => Self::file_not_found(path.display().to_string()),
            MediaError::Io { operation, source } => Self::IoError { operation, source },
            MediaError::OutputMissing(path) => {
                Self::invalid_output(format!("no output written to {}", path.display()))
            }
            other => Self::Media(other),
        }
    }
}

impl From<EngineError> for StepError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Media(media) => media.into(),
            EngineError::MissingInput(message) => Self::InvalidInput(message),
            EngineError::Disabled(_) | EngineError::NotConfigured(_) => {
                Self::Configuration(err.to_string())
            }
            EngineError::Io { operation, source } => Self::IoError { operation, source },
            EngineError::OutputMissing(path) => {
                Self::invalid_output(format!("no output written to {}", path.display()))
            }
            other => Self::Engine(other),
        }
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
