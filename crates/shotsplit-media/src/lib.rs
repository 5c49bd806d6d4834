#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for shot boundary detection.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Progress parsing from `-progress pipe:2`
//! - FFprobe metadata (frame rate, frame count)
//! - Raw RGB24 frame decoding for model input
//! - Per-scene clip extraction

pub mod clip;
pub mod command;
pub mod error;
pub mod frames;
pub mod probe;
pub mod progress;

pub use clip::{build_clip_command, extract_clip};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use frames::{decode_frames, RawFrames};
pub use probe::{parse_frame_rate, probe_video, VideoInfo};
pub use progress::FfmpegProgress;
