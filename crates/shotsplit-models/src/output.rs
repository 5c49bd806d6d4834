//! Output mode selection.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How detected scenes are materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    /// Plain-text report with one timecode line per scene.
    #[default]
    Timecodes,

    /// One re-encoded video file per scene.
    SplitVideos,
}

impl OutputType {
    pub const ALL: &'static [OutputType] = &[OutputType::Timecodes, OutputType::SplitVideos];

    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputType::Timecodes => "timecodes",
            OutputType::SplitVideos => "split_videos",
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OutputType {
    type Err = OutputTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "timecodes" => Ok(OutputType::Timecodes),
            "split_videos" => Ok(OutputType::SplitVideos),
            _ => Err(OutputTypeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown output type: {0}")]
pub struct OutputTypeParseError(pub String);
