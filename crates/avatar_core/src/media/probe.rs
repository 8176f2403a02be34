//! Duration probing with ffprobe.

use std::path::Path;

use super::error::{MediaError, MediaResult};
use super::tool::{path_arg, MediaTools};
use crate::logging::RunLogger;

/// Arguments for `ffprobe` to print only the container duration.
pub fn duration_args(input: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-show_entries".to_string(),
        "format=duration".to_string(),
        "-of".to_string(),
        "default=noprint_wrappers=1:nokey=1".to_string(),
        path_arg(input),
    ]
}

/// Parse the duration printed by ffprobe.
pub fn parse_duration(stdout: &str) -> MediaResult<f64> {
    let value = stdout
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| MediaError::parse("duration", "ffprobe printed nothing"))?;

    let seconds: f64 = value
        .parse()
        .map_err(|e| MediaError::parse("duration", format!("'{}': {}", value, e)))?;

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(MediaError::parse(
            "duration",
            format!("'{}' is not a valid duration", value),
        ));
    }
    Ok(seconds)
}

/// Get the duration of a media file in seconds.
pub fn probe_duration(
    tools: &MediaTools,
    input: &Path,
    logger: Option<&RunLogger>,
) -> MediaResult<f64> {
    if !input.exists() {
        return Err(MediaError::NotFound(input.to_path_buf()));
    }

    let stdout = tools.ffprobe_command(duration_args(input)).run(logger)?;
    let seconds = parse_duration(&stdout)?;

    tracing::debug!("Duration of {}: {:.3}s", input.display(), seconds);
    Ok(seconds)
}
