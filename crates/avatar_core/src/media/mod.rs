//! Media-tool plumbing.
//!
//! This module provides:
//! - External command construction and execution ([`ToolCommand`])
//! - Duration probing with ffprobe
//! - Audio chunk planning, extraction and lossless clip concatenation
//! - The compositing filter graph and encoder options
//! - [`MediaBackend`], the seam the pipeline uses for all of the above
//!
//! Every operation is a blocking call; at most one tool runs at a time.

mod backend;
mod chunking;
mod compositor;
mod error;
mod probe;
mod tool;

pub use backend::{FfmpegBackend, MediaBackend};
pub use chunking::{
    chunk_audio_name, chunk_clip_name, concat_args, concat_clips, extract_segments,
    plan_segments, segment_args, split_audio, write_concat_list, Segment,
};
pub use compositor::{compose, is_still_image, CompositeCommandBuilder, EncoderOptions};
pub use error::{MediaError, MediaResult};
pub use probe::{duration_args, parse_duration, probe_duration};
pub use tool::{MediaTools, ToolCommand};

pub(crate) use chunking::ensure_output;
pub(crate) use tool::{absolute_path, path_arg};
