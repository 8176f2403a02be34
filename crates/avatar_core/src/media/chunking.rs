//! Long-audio chunking and lossless clip concatenation.
//!
//! Renderers have a practical length ceiling, so long speech is split into
//! fixed-length segments, rendered one clip per segment, and the clips are
//! joined with ffmpeg's concat demuxer using stream copy.
//!
//! Planning is a pure function; extraction and concatenation shell out.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{MediaError, MediaResult};
use super::probe::probe_duration;
use super::tool::{absolute_path, path_arg, MediaTools};
use crate::logging::RunLogger;

/// One planned audio segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// 1-based position in the sequence.
    pub index: usize,
    /// Offset into the source in seconds.
    pub start: f64,
    /// Length in seconds.
    pub duration: f64,
}

impl Segment {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// File name of a chunk's audio (`chunk_001.wav`).
pub fn chunk_audio_name(index: usize) -> String {
    format!("chunk_{:03}.wav", index)
}

/// File name of a chunk's rendered clip (`clip_001.mp4`).
pub fn chunk_clip_name(index: usize) -> String {
    format!("clip_{:03}.mp4", index)
}

/// Split `total` seconds into consecutive segments of `chunk_seconds`.
///
/// Pure function - no I/O, deterministic output. Boundaries are computed on
/// whole milliseconds so segment lengths are exact. The last segment may be
/// shorter. Returns an empty plan for a non-positive total or zero length.
pub fn plan_segments(total: f64, chunk_seconds: u32) -> Vec<Segment> {
    if chunk_seconds == 0 || !total.is_finite() || total <= 0.0 {
        return Vec::new();
    }

    let total_ms = (total * 1000.0).round() as u64;
    let chunk_ms = chunk_seconds as u64 * 1000;

    (0..total_ms)
        .step_by(chunk_ms as usize)
        .enumerate()
        .map(|(i, start_ms)| {
            let len_ms = chunk_ms.min(total_ms - start_ms);
            Segment {
                index: i + 1,
                start: start_ms as f64 / 1000.0,
                duration: len_ms as f64 / 1000.0,
            }
        })
        .collect()
}

/// ffmpeg arguments extracting one segment as 16-bit PCM WAV.
pub fn segment_args(audio: &Path, segment: &Segment, out: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        path_arg(audio),
        "-ss".to_string(),
        format!("{:.3}", segment.start),
        "-t".to_string(),
        format!("{:.3}", segment.duration),
        "-vn".to_string(),
        "-acodec".to_string(),
        "pcm_s16le".to_string(),
        path_arg(out),
    ]
}

/// Extract planned segments of `audio` into `out_dir`, in order.
pub fn extract_segments(
    tools: &MediaTools,
    audio: &Path,
    segments: &[Segment],
    out_dir: &Path,
    logger: Option<&RunLogger>,
) -> MediaResult<Vec<PathBuf>> {
    if !audio.exists() {
        return Err(MediaError::NotFound(audio.to_path_buf()));
    }
    fs::create_dir_all(out_dir).map_err(|e| MediaError::io("creating chunk directory", e))?;

    let mut chunks = Vec::with_capacity(segments.len());
    for segment in segments {
        let out = out_dir.join(chunk_audio_name(segment.index));
        tools
            .ffmpeg_command(segment_args(audio, segment, &out))
            .run(logger)?;
        ensure_output(&out)?;
        chunks.push(out);
    }

    Ok(chunks)
}

/// Split an audio track into `chunk_seconds` segments.
///
/// Chunks are written as `chunk_NNN.wav` (1-based) under `out_dir` and
/// returned in order.
pub fn split_audio(
    tools: &MediaTools,
    audio: &Path,
    out_dir: &Path,
    chunk_seconds: u32,
    logger: Option<&RunLogger>,
) -> MediaResult<Vec<PathBuf>> {
    if chunk_seconds == 0 {
        return Err(MediaError::InvalidArgument(
            "chunk length must be positive".to_string(),
        ));
    }

    let total = probe_duration(tools, audio, logger)?;
    let segments = plan_segments(total, chunk_seconds);
    if segments.is_empty() {
        return Err(MediaError::InvalidArgument(format!(
            "{} has no audio to split",
            audio.display()
        )));
    }

    extract_segments(tools, audio, &segments, out_dir, logger)
}

/// Quote a path for a concat list entry.
fn concat_entry(path: &Path) -> String {
    format!("file '{}'", path.to_string_lossy().replace('\'', "'\\''"))
}

/// Write a concat demuxer list referencing each clip's absolute path.
pub fn write_concat_list(clips: &[PathBuf], list_path: &Path) -> MediaResult<()> {
    let mut content = String::new();
    for clip in clips {
        content.push_str(&concat_entry(&absolute_path(clip)?));
        content.push('\n');
    }

    if let Some(parent) = list_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| MediaError::io("creating concat list directory", e))?;
        }
    }
    fs::write(list_path, content).map_err(|e| MediaError::io("writing concat list", e))
}

/// ffmpeg arguments joining the clips in a list without re-encoding.
pub fn concat_args(list_path: &Path, out: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-i".to_string(),
        path_arg(list_path),
        "-c".to_string(),
        "copy".to_string(),
        path_arg(out),
    ]
}

/// Concatenate clips in order into `out` (stream copy).
pub fn concat_clips(
    tools: &MediaTools,
    clips: &[PathBuf],
    list_path: &Path,
    out: &Path,
    logger: Option<&RunLogger>,
) -> MediaResult<PathBuf> {
    if clips.is_empty() {
        return Err(MediaError::InvalidArgument(
            "no clips to concatenate".to_string(),
        ));
    }
    if let Some(missing) = clips.iter().find(|c| !c.exists()) {
        return Err(MediaError::NotFound(missing.clone()));
    }

    write_concat_list(clips, list_path)?;
    tools.ffmpeg_command(concat_args(list_path, out)).run(logger)?;
    ensure_output(out)?;

    Ok(out.to_path_buf())
}

/// Fail if a tool left no (or an empty) output file.
pub(crate) fn ensure_output(path: &Path) -> MediaResult<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => Ok(()),
        _ => Err(MediaError::OutputMissing(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::process::Command;
    use tempfile::tempdir;

    fn lengths(plan: &[Segment]) -> Vec<f64> {
        plan.iter().map(|s| s.duration).collect()
    }

    #[test]
    fn plans_130_seconds_into_60_60_10() {
        let plan = plan_segments(130.0, 60);
        assert_eq!(lengths(&plan), vec![60.0, 60.0, 10.0]);
        assert_eq!(
            plan.iter().map(|s| s.index).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(plan[1].start, 60.0);
        assert_eq!(plan[2].start, 120.0);
        assert_eq!(plan[2].end(), 130.0);
    }

    #[test]
    fn segments_are_contiguous_and_cover_total() {
        let plan = plan_segments(247.321, 45);
        for pair in plan.windows(2) {
            assert_eq!(pair[0].end(), pair[1].start);
        }
        let covered: f64 = lengths(&plan).iter().sum();
        assert!((covered - 247.321).abs() < 1e-9);
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() {
        assert_eq!(lengths(&plan_segments(120.0, 60)), vec![60.0, 60.0]);
        assert_eq!(lengths(&plan_segments(59.5, 60)), vec![59.5]);
    }

    #[test]
    fn degenerate_inputs_plan_nothing() {
        assert!(plan_segments(0.0, 60).is_empty());
        assert!(plan_segments(-5.0, 60).is_empty());
        assert!(plan_segments(100.0, 0).is_empty());
        assert!(plan_segments(f64::INFINITY, 60).is_empty());
    }

    #[test]
    fn chunk_names_are_zero_padded() {
        assert_eq!(chunk_audio_name(1), "chunk_001.wav");
        assert_eq!(chunk_audio_name(12), "chunk_012.wav");
        assert_eq!(chunk_clip_name(3), "clip_003.mp4");
        assert_eq!(chunk_audio_name(1000), "chunk_1000.wav");
    }

    #[test]
    fn segment_args_seek_and_trim() {
        let segment = Segment {
            index: 2,
            start: 60.0,
            duration: 10.5,
        };
        let args = segment_args(Path::new("a.wav"), &segment, Path::new("c/chunk_002.wav"));
        assert_eq!(
            args,
            vec![
                "-y", "-i", "a.wav", "-ss", "60.000", "-t", "10.500", "-vn", "-acodec",
                "pcm_s16le", "c/chunk_002.wav"
            ]
        );
    }

    #[test]
    fn concat_list_uses_absolute_paths_in_order() {
        let dir = tempdir().unwrap();
        let clips = vec![
            dir.path().join("clip_001.mp4"),
            dir.path().join("clip_002.mp4"),
            dir.path().join("it's clip_003.mp4"),
        ];
        let list = dir.path().join("concat.txt");

        write_concat_list(&clips, &list).unwrap();

        let content = fs::read_to_string(&list).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            format!("file '{}'", dir.path().join("clip_001.mp4").display())
        );
        assert!(lines[1].ends_with("clip_002.mp4'"));
        assert!(lines[2].ends_with("it'\\''s clip_003.mp4'"));
    }

    #[test]
    fn relative_clip_paths_become_absolute() {
        let dir = tempdir().unwrap();
        let list = dir.path().join("concat.txt");
        write_concat_list(&[PathBuf::from("clip_001.mp4")], &list).unwrap();

        let content = fs::read_to_string(&list).unwrap();
        let expected = env::current_dir().unwrap().join("clip_001.mp4");
        assert_eq!(content, format!("file '{}'\n", expected.display()));
    }

    #[test]
    fn concat_is_stream_copy() {
        let args = concat_args(Path::new("list.txt"), Path::new("raw.mp4"));
        assert_eq!(
            args,
            vec!["-y", "-f", "concat", "-safe", "0", "-i", "list.txt", "-c", "copy", "raw.mp4"]
        );
        assert!(!args.iter().any(|a| a == "-c:v" || a == "libx264"));
    }

    #[test]
    fn concat_rejects_empty_and_missing_clips() {
        let dir = tempdir().unwrap();
        let tools = MediaTools::default();
        let list = dir.path().join("list.txt");
        let out = dir.path().join("out.mp4");

        let err = concat_clips(&tools, &[], &list, &out, None).unwrap_err();
        assert!(matches!(err, MediaError::InvalidArgument(_)));

        let missing = vec![dir.path().join("nope.mp4")];
        let err = concat_clips(&tools, &missing, &list, &out, None).unwrap_err();
        assert!(matches!(err, MediaError::NotFound(_)));
        assert!(!list.exists());
    }

    #[test]
    fn split_rejects_zero_length() {
        let dir = tempdir().unwrap();
        let err = split_audio(
            &MediaTools::default(),
            Path::new("a.wav"),
            dir.path(),
            0,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, MediaError::InvalidArgument(_)));
    }

    #[test]
    fn ensure_output_requires_non_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        assert!(ensure_output(&path).is_err());
        fs::write(&path, b"").unwrap();
        assert!(ensure_output(&path).is_err());
        fs::write(&path, b"data").unwrap();
        assert!(ensure_output(&path).is_ok());
    }

    fn ffmpeg_available() -> bool {
        Command::new("ffmpeg").arg("-version").output().is_ok()
            && Command::new("ffprobe").arg("-version").output().is_ok()
    }

    /// Split a 130 s tone, render a clip per chunk and join them back.
    /// Skipped when ffmpeg is not installed.
    #[test]
    fn chunk_round_trip_with_ffmpeg() {
        if !ffmpeg_available() {
            return;
        }
        let dir = tempdir().unwrap();
        let tools = MediaTools::default();
        let audio = dir.path().join("tone.wav");

        let tone = tools.ffmpeg_command(vec![
            "-y".into(),
            "-f".into(),
            "lavfi".into(),
            "-i".into(),
            "sine=frequency=440:sample_rate=16000:duration=130".into(),
            path_arg(&audio),
        ]);
        tone.run(None).unwrap();

        let chunks = split_audio(&tools, &audio, &dir.path().join("chunks"), 60, None).unwrap();
        assert_eq!(chunks.len(), 3);
        let chunk_lengths: Vec<f64> = chunks
            .iter()
            .map(|c| probe_duration(&tools, c, None).unwrap())
            .collect();
        for (got, want) in chunk_lengths.iter().zip([60.0, 60.0, 10.0]) {
            assert!((got - want).abs() < 0.05, "{got} vs {want}");
        }

        let mut clips = Vec::new();
        for chunk in &chunks {
            let clip = chunk.with_extension("mp4");
            tools
                .ffmpeg_command(vec![
                    "-y".into(),
                    "-f".into(),
                    "lavfi".into(),
                    "-i".into(),
                    "color=c=black:s=64x64:r=10".into(),
                    "-i".into(),
                    path_arg(chunk),
                    "-shortest".into(),
                    "-c:v".into(),
                    "libx264".into(),
                    "-pix_fmt".into(),
                    "yuv420p".into(),
                    "-c:a".into(),
                    "aac".into(),
                    path_arg(&clip),
                ])
                .run(None)
                .unwrap();
            clips.push(clip);
        }

        let clip_total: f64 = clips
            .iter()
            .map(|c| probe_duration(&tools, c, None).unwrap())
            .sum();
        let joined = concat_clips(
            &tools,
            &clips,
            &dir.path().join("concat.txt"),
            &dir.path().join("joined.mp4"),
            None,
        )
        .unwrap();
        let joined_len = probe_duration(&tools, &joined, None).unwrap();
        assert!((joined_len - clip_total).abs() < 0.25);
    }
}
