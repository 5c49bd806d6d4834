//! Scene detection request as supplied by a caller.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default folder for split output.
pub const DEFAULT_OUTPUT_FOLDER: &str = "output/transnet_scenes";

/// Default threshold value offered to callers.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Raw caller input for one scene detection run.
///
/// Fields are kept unvalidated so the pipeline can check them in its own
/// order and report every problem as a message instead of a parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProcessRequest {
    /// Path to the source video
    pub video_path: PathBuf,

    /// Boundary threshold, expected in (0, 1]
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// `timecodes` or `split_videos`
    #[serde(default = "default_output_type")]
    pub output_type: String,

    /// Folder for split clips
    #[serde(default = "default_output_folder")]
    pub output_folder: PathBuf,
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}
fn default_output_type() -> String {
    crate::OutputType::default().as_str().to_string()
}
fn default_output_folder() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FOLDER)
}

impl ProcessRequest {
    /// Create a request with default threshold, mode and folder.
    pub fn new(video_path: impl Into<PathBuf>) -> Self {
        Self {
            video_path: video_path.into(),
            threshold: default_threshold(),
            output_type: default_output_type(),
            output_folder: default_output_folder(),
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_output_type(mut self, output_type: impl Into<String>) -> Self {
        self.output_type = output_type.into();
        self
    }

    pub fn with_output_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.output_folder = folder.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_json() {
        let req: ProcessRequest = serde_json::from_str(r#"{"video_path": "a.mp4"}"#).unwrap();
        assert_eq!(req.threshold, 0.5);
        assert_eq!(req.output_type, "timecodes");
        assert_eq!(req.output_folder, PathBuf::from("output/transnet_scenes"));
    }

    #[test]
    fn test_builder() {
        let req = ProcessRequest::new("clip.mov")
            .with_threshold(0.3)
            .with_output_type("split_videos")
            .with_output_folder("/tmp/out");
        assert_eq!(req.threshold, 0.3);
        assert_eq!(req.output_type, "split_videos");
        assert_eq!(req.output_folder, PathBuf::from("/tmp/out"));
    }
}
