//! FFmpeg progress parsing.

use serde::{Deserialize, Serialize};

/// Progress information from FFmpeg.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FfmpegProgress {
    /// Current frame number
    pub frame: u64,
    /// Current FPS
    pub fps: f64,
    /// Output time in milliseconds
    pub out_time_ms: i64,
    /// Encoding speed (e.g., 1.5 = 1.5x realtime)
    pub speed: f64,
    /// Whether encoding is complete
    pub is_complete: bool,
}

impl FfmpegProgress {
    /// Calculate progress percentage given total duration in milliseconds.
    pub fn percentage(&self, total_duration_ms: i64) -> f64 {
        if total_duration_ms <= 0 {
            return 0.0;
        }
        ((self.out_time_ms as f64 / total_duration_ms as f64) * 100.0).min(100.0)
    }
}

/// Keys emitted by FFmpeg's `-progress` output. Per-stream quality keys
/// (`stream_<file>_<stream>_q`) are matched separately.
const PROGRESS_KEYS: &[&str] = &[
    "frame", "fps", "bitrate", "total_size", "out_time_us", "out_time_ms",
    "out_time", "dup_frames", "drop_frames", "speed", "progress",
];

/// Whether a stderr line belongs to the `-progress` stream rather than diagnostics.
pub fn is_progress_line(line: &str) -> bool {
    line.trim()
        .split_once('=')
        .is_some_and(|(key, _)| PROGRESS_KEYS.contains(&key) || is_stream_quality_key(key))
}

fn is_stream_quality_key(key: &str) -> bool {
    key.strip_prefix("stream_")
        .and_then(|rest| rest.strip_suffix("_q"))
        .is_some_and(|ids| !ids.is_empty() && ids.split('_').all(|id| id.parse::<u32>().is_ok()))
}

/// Parse a progress line from FFmpeg's -progress output.
///
/// Updates `current` in place and returns a snapshot at each `progress=` key,
/// which terminates one progress block.
pub fn parse_progress_line(line: &str, current: &mut FfmpegProgress) -> Option<FfmpegProgress> {
    let (key, value) = line.trim().split_once('=')?;

    match key {
        "out_time_us" => {
            if let Ok(us) = value.parse::<i64>() {
                current.out_time_ms = us / 1000;
            }
        }
        // Despite the name, FFmpeg reports microseconds here
        "out_time_ms" => {
            if let Ok(us) = value.parse::<i64>() {
                current.out_time_ms = us / 1000;
            }
        }
        "frame" => {
            if let Ok(frame) = value.parse() {
                current.frame = frame;
            }
        }
        "fps" => {
            if let Ok(fps) = value.parse() {
                current.fps = fps;
            }
        }
        "speed" => {
            if let Some(speed) = value.strip_suffix('x').and_then(|s| s.trim().parse().ok()) {
                current.speed = speed;
            }
        }
        "progress" => {
            if value == "end" {
                current.is_complete = true;
            }
            return Some(current.clone());
        }
        _ => {}
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percentage() {
        let progress = FfmpegProgress {
            out_time_ms: 5000,
            ..Default::default()
        };

        assert!((progress.percentage(10000) - 50.0).abs() < 0.01);
        assert!((progress.percentage(5000) - 100.0).abs() < 0.01);
        assert_eq!(progress.percentage(0), 0.0);
    }

    #[test]
    fn test_progress_parsing() {
        let mut progress = FfmpegProgress::default();

        assert!(parse_progress_line("out_time_us=5000000", &mut progress).is_none());
        assert_eq!(progress.out_time_ms, 5000);

        parse_progress_line("speed=1.5x", &mut progress);
        assert!((progress.speed - 1.5).abs() < 0.01);

        parse_progress_line("speed=N/A", &mut progress);
        assert!((progress.speed - 1.5).abs() < 0.01);

        let result = parse_progress_line("progress=end", &mut progress);
        assert!(result.is_some());
        assert!(progress.is_complete);
    }

    #[test]
    fn test_is_progress_line() {
        assert!(is_progress_line("out_time_us=1000"));
        assert!(is_progress_line("speed=   1x"));
        assert!(!is_progress_line("[libx264 @ 0x1] error=broken"));
        assert!(!is_progress_line("No space left on device"));
    }

    #[test]
    fn test_every_stream_quality_key_is_progress() {
        assert!(is_progress_line("stream_0_0_q=23.0"));
        assert!(is_progress_line("stream_1_0_q=28.0"));
        assert!(is_progress_line("stream_0_1_q=-1.0"));
        assert!(!is_progress_line("stream_q=1.0"));
        assert!(!is_progress_line("stream_a_b_q=1.0"));
    }
}
