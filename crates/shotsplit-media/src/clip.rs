//! Scene clip extraction.
//!
//! Each clip is re-encoded from an input-side seek so cuts land on the
//! requested frame rather than the nearest keyframe.

use std::path::Path;
use tracing::info;

use shotsplit_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::progress::FfmpegProgress;

/// Build the FFmpeg command for one clip.
pub fn build_clip_command(
    input: &Path,
    output: &Path,
    start_secs: f64,
    duration: f64,
    encoding: &EncodingConfig,
) -> FfmpegCommand {
    FfmpegCommand::new(input, output)
        .seek(start_secs)
        .duration(duration)
        .video_codec(&encoding.codec)
        .preset(&encoding.preset)
        .crf(encoding.crf)
        .audio_codec(&encoding.audio_codec)
        .audio_bitrate(&encoding.audio_bitrate)
        .output_args(["-pix_fmt", "yuv420p", "-movflags", "+faststart"])
}

/// Extract `[start_secs, start_secs + duration)` of `input` into `output`.
pub async fn extract_clip<P, F>(
    input: P,
    output: P,
    start_secs: f64,
    duration: f64,
    encoding: &EncodingConfig,
    progress_callback: F,
) -> MediaResult<()>
where
    P: AsRef<Path>,
    F: Fn(FfmpegProgress) + Send + 'static,
{
    let input = input.as_ref();
    let output = output.as_ref();

    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }
    if duration.is_nan() || duration <= 0.0 {
        return Err(MediaError::invalid_video(format!(
            "Clip duration must be positive, got {:.3}s",
            duration
        )));
    }

    info!(
        "Extracting clip: {} -> {} (start: {:.2}s, duration: {:.2}s)",
        input.display(),
        output.display(),
        start_secs,
        duration
    );

    let cmd = build_clip_command(input, output, start_secs, duration, encoding);
    FfmpegRunner::new()
        .run_with_progress(&cmd, progress_callback)
        .await?;

    info!("Clip written: {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_command_uses_encoding() {
        let encoding = EncodingConfig::default().with_crf(23);
        let cmd = build_clip_command(
            Path::new("in.mp4"),
            Path::new("out/scene_001.mp4"),
            1.5,
            2.0,
            &encoding,
        );
        let args = cmd.build_args();
        let codec = args.iter().position(|a| a == "-c:v").unwrap();
        assert_eq!(args[codec + 1], "libx264");
        let crf = args.iter().position(|a| a == "-crf").unwrap();
        assert_eq!(args[crf + 1], "23");
        assert!(args.contains(&"1.500".to_string()));
        assert_eq!(cmd.output_path(), Path::new("out/scene_001.mp4"));
    }

    #[tokio::test]
    async fn test_extract_rejects_zero_duration() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"not a video").unwrap();
        let output = dir.path().join("out.mp4");

        let result = extract_clip(&input, &output, 0.0, 0.0, &EncodingConfig::default(), |_| {}).await;
        assert!(matches!(result, Err(MediaError::InvalidVideo(_))));
    }
}
