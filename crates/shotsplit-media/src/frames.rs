//! Raw frame decoding through FFmpeg.
//!
//! Frames are decoded at a small fixed resolution as packed RGB24, which is
//! what shot boundary models consume.

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::command::check_ffmpeg;
use crate::error::{MediaError, MediaResult};

/// Packed RGB24 frames of identical size, in decode order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrames {
    pub width: u32,
    pub height: u32,
    data: Vec<u8>,
}

impl RawFrames {
    /// Wrap a packed buffer. Trailing bytes that do not form a whole frame
    /// are dropped.
    pub fn new(width: u32, height: u32, mut data: Vec<u8>) -> Self {
        let frame_bytes = (width * height * 3) as usize;
        if frame_bytes > 0 {
            data.truncate(data.len() - data.len() % frame_bytes);
        } else {
            data.clear();
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Bytes per frame.
    pub fn frame_bytes(&self) -> usize {
        (self.width * self.height * 3) as usize
    }

    /// Number of decoded frames.
    pub fn frame_count(&self) -> usize {
        match self.frame_bytes() {
            0 => 0,
            n => self.data.len() / n,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Pixel data of one frame (HWC, RGB).
    pub fn frame(&self, index: usize) -> Option<&[u8]> {
        let n = self.frame_bytes();
        let start = index.checked_mul(n)?;
        self.data.get(start..start + n)
    }
}

/// Decode every frame of a video, scaled to `width` x `height` RGB24.
pub async fn decode_frames(path: impl AsRef<Path>, width: u32, height: u32) -> MediaResult<RawFrames> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    check_ffmpeg()?;

    debug!(
        path = %path.display(),
        width,
        height,
        "Decoding frames with FFmpeg"
    );

    let scale = format!("scale={}:{}", width, height);
    let output = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-i"])
        .arg(path)
        .args([
            "-an",
            "-vf",
            scale.as_str(),
            "-pix_fmt",
            "rgb24",
            "-f",
            "rawvideo",
            "-",
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::ffmpeg_failed(
            "Frame decoding failed",
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
            output.status.code(),
        ));
    }

    let frames = RawFrames::new(width, height, output.stdout);
    info!(
        path = %path.display(),
        frames = frames.frame_count(),
        "Decoded video frames"
    );

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count_and_access() {
        let data: Vec<u8> = (0..2 * 2 * 3 * 3).map(|v| v as u8).collect();
        let frames = RawFrames::new(2, 2, data);
        assert_eq!(frames.frame_bytes(), 12);
        assert_eq!(frames.frame_count(), 3);
        assert_eq!(frames.frame(1).unwrap()[0], 12);
        assert!(frames.frame(3).is_none());
    }

    #[test]
    fn test_partial_trailing_frame_is_dropped() {
        let frames = RawFrames::new(2, 2, vec![0u8; 12 + 5]);
        assert_eq!(frames.frame_count(), 1);
    }

    #[tokio::test]
    async fn test_decode_missing_file() {
        let result = decode_frames("/nonexistent/video.mp4", 48, 27).await;
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }
}
