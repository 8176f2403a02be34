//! Run identifiers and per-run artifact paths.
//!
//! Every intermediate and final file of a run is named from the run id, so
//! concurrent or back-to-back runs never collide in a shared output folder.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Local;
use serde::Serialize;

use crate::media::{chunk_audio_name, chunk_clip_name};

static RUN_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Unique run identifier: `YYYYMMDD_HHMMSS_p<pid>_<counter>`.
///
/// The process id and a per-process counter keep ids distinct for runs
/// started within the same second.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Allocate a fresh id from the local clock.
    pub fn generate() -> Self {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let counter = RUN_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("{}_p{}_{:03}", stamp, std::process::id(), counter))
    }

    /// Wrap an existing id (for example when resuming from a manifest).
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Paths of every file a run may produce.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactSet {
    pub run_id: RunId,
    pub output_dir: PathBuf,
    /// Square avatar image.
    pub avatar_image: PathBuf,
    /// Synthesized speech.
    pub audio: PathBuf,
    /// Directory holding chunk audio and chunk clips.
    pub chunk_dir: PathBuf,
    /// Concat list for chunk clips.
    pub concat_list: PathBuf,
    /// Renderer output before composition.
    pub raw_video: PathBuf,
    pub subtitles: PathBuf,
    /// Composited deliverable.
    pub final_video: PathBuf,
    /// JSON run manifest.
    pub manifest: PathBuf,
}

impl ArtifactSet {
    pub fn new(output_dir: impl Into<PathBuf>, run_id: RunId) -> Self {
        let output_dir = output_dir.into();
        let id = run_id.as_str();
        Self {
            avatar_image: output_dir.join(format!("avatar_{}.png", id)),
            audio: output_dir.join(format!("audio_{}.wav", id)),
            chunk_dir: output_dir.join(format!("chunks_{}", id)),
            concat_list: output_dir.join(format!("concat_{}.txt", id)),
            raw_video: output_dir.join(format!("raw_{}.mp4", id)),
            subtitles: output_dir.join(format!("speech_{}.ass", id)),
            final_video: output_dir.join(format!("final_{}.mp4", id)),
            manifest: output_dir.join(format!("run_{}.json", id)),
            output_dir,
            run_id,
        }
    }

    /// Audio file of the 1-based chunk `index`.
    pub fn chunk_audio(&self, index: usize) -> PathBuf {
        self.chunk_dir.join(chunk_audio_name(index))
    }

    /// Rendered clip of the 1-based chunk `index`.
    pub fn chunk_clip(&self, index: usize) -> PathBuf {
        self.chunk_dir.join(chunk_clip_name(index))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn run_ids_are_unique_within_a_second() {
        let ids: HashSet<RunId> = (0..50).map(|_| RunId::generate()).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn run_id_layout() {
        let id = RunId::generate();
        let text = id.as_str();
        // YYYYMMDD_HHMMSS_p<pid>_NNN
        let parts: Vec<&str> = text.split('_').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0].len(), 8);
        assert_eq!(parts[1].len(), 6);
        assert_eq!(parts[2], format!("p{}", std::process::id()));
        assert!(parts[3].len() >= 3);
        assert_eq!(id.to_string(), text);
    }

    #[test]
    fn artifact_names_embed_run_id() {
        let set = ArtifactSet::new("/out", RunId::from_string("20260101_120000_p7_000"));
        let id = "20260101_120000_p7_000";

        assert_eq!(set.avatar_image, PathBuf::from(format!("/out/avatar_{id}.png")));
        assert_eq!(set.audio, PathBuf::from(format!("/out/audio_{id}.wav")));
        assert_eq!(set.raw_video, PathBuf::from(format!("/out/raw_{id}.mp4")));
        assert_eq!(set.subtitles, PathBuf::from(format!("/out/speech_{id}.ass")));
        assert_eq!(set.final_video, PathBuf::from(format!("/out/final_{id}.mp4")));
        assert_eq!(set.manifest, PathBuf::from(format!("/out/run_{id}.json")));
        assert_eq!(set.concat_list, PathBuf::from(format!("/out/concat_{id}.txt")));
        assert_eq!(
            set.chunk_audio(1),
            PathBuf::from(format!("/out/chunks_{id}/chunk_001.wav"))
        );
        assert_eq!(
            set.chunk_clip(12),
            PathBuf::from(format!("/out/chunks_{id}/clip_012.mp4"))
        );
    }

    #[test]
    fn distinct_runs_do_not_share_paths() {
        let a = ArtifactSet::new("/out", RunId::generate());
        let b = ArtifactSet::new("/out", RunId::generate());
        assert_ne!(a.final_video, b.final_video);
        assert_ne!(a.chunk_dir, b.chunk_dir);
    }
}
