//! Subtitle error types.

use std::path::PathBuf;

use crate::models::ErrorKind;

/// Errors that can occur while writing subtitle files.
#[derive(Debug, thiserror::Error)]
pub enum SubtitleError {
    /// Failed to create the output directory.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write subtitle file.
    #[error("Failed to write file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl SubtitleError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Io
    }
}

/// Result type for subtitle operations.
pub type SubtitleResult<T> = Result<T, SubtitleError>;
