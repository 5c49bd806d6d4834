//! Shared data models for shotsplit.
//!
//! This crate provides Serde-serializable types for:
//! - Per-frame boundary scores and frame rates
//! - Segmentation thresholds
//! - Scene intervals and scene lists
//! - Output modes and caller requests
//! - Encoding configuration for split clips

pub mod encoding;
pub mod output;
pub mod request;
pub mod scene;
pub mod scores;
pub mod threshold;

// Re-export common types
pub use encoding::EncodingConfig;
pub use output::{OutputType, OutputTypeParseError};
pub use request::{ProcessRequest, DEFAULT_OUTPUT_FOLDER, DEFAULT_THRESHOLD};
pub use scene::{SceneInterval, SceneList};
pub use scores::{sigmoid, FrameRate, FrameRateError, FrameScores};
pub use threshold::{Threshold, ThresholdError};
