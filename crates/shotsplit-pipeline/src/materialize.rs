//! Scene output: a timecode report or one encoded clip per scene.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use shotsplit_media::{extract_clip, MediaResult};
use shotsplit_models::{EncodingConfig, FrameRate, OutputType, SceneList};
use tracing::{debug, info};

use crate::metrics;

/// Render the scene list as a human-readable report.
///
/// ```text
/// Detected Scenes:
/// Scene 1: 0.00s to 2.40s
/// Scene 2: 2.44s to 5.00s
/// ```
pub fn format_timecodes(scenes: &SceneList, fps: FrameRate) -> String {
    let mut report = String::from("Detected Scenes:\n");
    for (i, scene) in scenes.iter().enumerate() {
        let _ = writeln!(
            report,
            "Scene {}: {:.2}s to {:.2}s",
            i + 1,
            scene.start_secs(fps),
            scene.end_secs(fps)
        );
    }
    report
}

/// File name for the 1-based scene `number`.
pub fn clip_file_name(number: usize) -> String {
    format!("scene_{:03}.mp4", number)
}

/// Message returned after a successful split.
pub fn split_message(folder: &Path) -> String {
    format!("Video successfully split into scenes at {}", folder.display())
}

/// Writes one time range of a source video to a new file.
#[async_trait]
pub trait ClipWriter: Send + Sync {
    async fn write_clip(&self, source: &Path, output: &Path, start_secs: f64, duration_secs: f64) -> MediaResult<()>;
}

/// Clip writer that re-encodes through FFmpeg.
#[derive(Debug, Clone, Default)]
pub struct FfmpegClipWriter {
    encoding: EncodingConfig,
}

impl FfmpegClipWriter {
    pub fn new(encoding: EncodingConfig) -> Self {
        Self { encoding }
    }
}

#[async_trait]
impl ClipWriter for FfmpegClipWriter {
    async fn write_clip(&self, source: &Path, output: &Path, start_secs: f64, duration_secs: f64) -> MediaResult<()> {
        let name = output.display().to_string();
        let total_ms = (duration_secs * 1000.0).round() as i64;
        extract_clip(source, output, start_secs, duration_secs, &self.encoding, move |p| {
            debug!(clip = %name, percent = p.percentage(total_ms), speed = p.speed, "Encoding");
        })
        .await
    }
}

/// Encode every scene to `scene_NNN.mp4` in `folder`, in order.
///
/// Stops at the first failure; clips already written stay on disk.
pub async fn split_scenes(
    writer: &dyn ClipWriter,
    source: &Path,
    scenes: &SceneList,
    fps: FrameRate,
    folder: &Path,
) -> MediaResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(scenes.len());

    for (i, scene) in scenes.iter().enumerate() {
        let output = folder.join(clip_file_name(i + 1));
        let (start, duration) = scene.clip_window(fps);

        info!(
            scene = i + 1,
            total = scenes.len(),
            start_frame = scene.start_frame,
            end_frame = scene.end_frame,
            output = %output.display(),
            "Writing scene clip"
        );

        writer.write_clip(source, &output, start, duration).await?;
        metrics::record_clip_written();
        written.push(output);
    }

    Ok(written)
}

/// Produce the final output for `output_type`.
pub async fn materialize(
    output_type: OutputType,
    writer: &dyn ClipWriter,
    source: &Path,
    scenes: &SceneList,
    fps: FrameRate,
    folder: &Path,
) -> MediaResult<String> {
    match output_type {
        OutputType::Timecodes => Ok(format_timecodes(scenes, fps)),
        OutputType::SplitVideos => {
            split_scenes(writer, source, scenes, fps, folder).await?;
            Ok(split_message(folder))
        }
    }
}
