//! Media operations used by the pipeline, behind one trait.
//!
//! The pipeline only talks to [`MediaBackend`], so runs can be exercised
//! without ffmpeg installed.

use std::path::{Path, PathBuf};

use super::chunking::{concat_clips, extract_segments, Segment};
use super::compositor::{compose, CompositeCommandBuilder};
use super::error::MediaResult;
use super::probe::probe_duration;
use super::tool::MediaTools;
use crate::logging::RunLogger;

/// Blocking media operations needed by a run.
pub trait MediaBackend: Send + Sync {
    /// Duration of a media file in seconds.
    fn probe_duration(&self, path: &Path, logger: Option<&RunLogger>) -> MediaResult<f64>;

    /// Extract planned audio segments into `out_dir`, returning them in order.
    fn extract_segments(
        &self,
        audio: &Path,
        segments: &[Segment],
        out_dir: &Path,
        logger: Option<&RunLogger>,
    ) -> MediaResult<Vec<PathBuf>>;

    /// Join clips in order without re-encoding.
    fn concat_clips(
        &self,
        clips: &[PathBuf],
        list_path: &Path,
        out: &Path,
        logger: Option<&RunLogger>,
    ) -> MediaResult<PathBuf>;

    /// Composite an avatar clip onto a background.
    fn compose(
        &self,
        request: &CompositeCommandBuilder<'_>,
        logger: Option<&RunLogger>,
    ) -> MediaResult<PathBuf>;
}

/// [`MediaBackend`] backed by the ffmpeg and ffprobe executables.
#[derive(Debug, Clone, Default)]
pub struct FfmpegBackend {
    tools: MediaTools,
}

impl FfmpegBackend {
    pub fn new(tools: MediaTools) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &MediaTools {
        &self.tools
    }
}

impl MediaBackend for FfmpegBackend {
    fn probe_duration(&self, path: &Path, logger: Option<&RunLogger>) -> MediaResult<f64> {
        probe_duration(&self.tools, path, logger)
    }

    fn extract_segments(
        &self,
        audio: &Path,
        segments: &[Segment],
        out_dir: &Path,
        logger: Option<&RunLogger>,
    ) -> MediaResult<Vec<PathBuf>> {
        extract_segments(&self.tools, audio, segments, out_dir, logger)
    }

    fn concat_clips(
        &self,
        clips: &[PathBuf],
        list_path: &Path,
        out: &Path,
        logger: Option<&RunLogger>,
    ) -> MediaResult<PathBuf> {
        concat_clips(&self.tools, clips, list_path, out, logger)
    }

    fn compose(
        &self,
        request: &CompositeCommandBuilder<'_>,
        logger: Option<&RunLogger>,
    ) -> MediaResult<PathBuf> {
        compose(&self.tools, request, logger)
    }
}
