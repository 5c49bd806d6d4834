//! Scene intervals produced by segmentation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::scores::FrameRate;

/// A scene as an inclusive frame range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct SceneInterval {
    pub start_frame: usize,
    pub end_frame: usize,
}

impl SceneInterval {
    /// Create an interval. `start_frame` must not exceed `end_frame`.
    pub fn new(start_frame: usize, end_frame: usize) -> Self {
        debug_assert!(start_frame <= end_frame, "scene start after end");
        Self {
            start_frame,
            end_frame,
        }
    }

    /// Number of frames in the scene.
    pub fn len(&self) -> usize {
        self.end_frame - self.start_frame + 1
    }

    /// Always false; an interval holds at least one frame.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Timestamp of the first frame.
    pub fn start_secs(&self, fps: FrameRate) -> f64 {
        fps.frame_to_secs(self.start_frame)
    }

    /// Timestamp of the last frame.
    pub fn end_secs(&self, fps: FrameRate) -> f64 {
        fps.frame_to_secs(self.end_frame)
    }

    /// Seek position and duration covering every frame of the scene.
    ///
    /// The window ends where the frame after `end_frame` begins, so adjacent
    /// scenes tile the timeline without gaps or overlap.
    pub fn clip_window(&self, fps: FrameRate) -> (f64, f64) {
        let start = self.start_secs(fps);
        let end = fps.frame_to_secs(self.end_frame + 1);
        (start, end - start)
    }
}

impl From<(usize, usize)> for SceneInterval {
    fn from((start, end): (usize, usize)) -> Self {
        Self::new(start, end)
    }
}

/// Ordered, non-overlapping scenes covering every frame of a video.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SceneList {
    pub scenes: Vec<SceneInterval>,
    pub total_frames: usize,
}

impl SceneList {
    pub fn new(scenes: Vec<SceneInterval>, total_frames: usize) -> Self {
        Self {
            scenes,
            total_frames,
        }
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SceneInterval> {
        self.scenes.iter()
    }

    /// Check that the scenes are sorted, contiguous and span
    /// `[0, total_frames - 1]`.
    pub fn covers_all_frames(&self) -> bool {
        let mut next = 0usize;
        for scene in &self.scenes {
            if scene.start_frame != next || scene.end_frame < scene.start_frame {
                return false;
            }
            next = scene.end_frame + 1;
        }
        next == self.total_frames
    }

    /// Serialize as pretty-printed JSON for export.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl<'a> IntoIterator for &'a SceneList {
    type Item = &'a SceneInterval;
    type IntoIter = std::slice::Iter<'a, SceneInterval>;

    fn into_iter(self) -> Self::IntoIter {
        self.scenes.iter()
    }
}
