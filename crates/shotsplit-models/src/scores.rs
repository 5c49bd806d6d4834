//! Per-frame model output and frame rate.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;
use thiserror::Error;

/// Per-frame shot boundary scores, indexed by 0-based frame number.
///
/// Values are kept in `[0, 1]`: NaN becomes 0 and anything outside the
/// range is clamped when the sequence is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct FrameScores(Vec<f32>);

impl FrameScores {
    /// Build a score sequence from probabilities.
    pub fn new(scores: Vec<f32>) -> Self {
        Self(
            scores
                .into_iter()
                .map(|s| if s.is_nan() { 0.0 } else { s.clamp(0.0, 1.0) })
                .collect(),
        )
    }

    /// Build a score sequence from raw logits by applying a sigmoid.
    pub fn from_logits(logits: Vec<f32>) -> Self {
        Self::new(logits.into_iter().map(sigmoid).collect())
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f32> {
        self.0.iter()
    }
}

impl Index<usize> for FrameScores {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a FrameScores {
    type Item = &'a f32;
    type IntoIter = std::slice::Iter<'a, f32>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Logistic sigmoid.
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Video frame rate in frames per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct FrameRate(f64);

impl FrameRate {
    /// Create a frame rate, rejecting non-positive or non-finite values.
    pub fn new(fps: f64) -> Result<Self, FrameRateError> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(FrameRateError(fps));
        }
        Ok(Self(fps))
    }

    pub fn fps(&self) -> f64 {
        self.0
    }

    /// Convert a frame index to seconds.
    #[inline]
    pub fn frame_to_secs(&self, frame: usize) -> f64 {
        frame as f64 / self.0
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} fps", self.0)
    }
}

impl<'de> Deserialize<'de> for FrameRate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        FrameRate::new(value).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("Frame rate must be positive and finite, got {0}")]
pub struct FrameRateError(pub f64);
