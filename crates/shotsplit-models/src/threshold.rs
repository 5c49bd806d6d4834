//! Segmentation threshold.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Sensitivity threshold for shot boundary segmentation.
///
/// A frame whose score is greater than or equal to the threshold is a
/// boundary frame. Valid values lie in the half-open range `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct Threshold(f32);

impl Threshold {
    /// Create a threshold, rejecting values outside `(0, 1]`.
    pub fn new(value: f32) -> Result<Self, ThresholdError> {
        if value.is_nan() || value <= 0.0 || value > 1.0 {
            return Err(ThresholdError(value));
        }
        Ok(Self(value))
    }

    /// Raw threshold value.
    pub fn value(&self) -> f32 {
        self.0
    }

    /// Whether a frame score marks a shot boundary.
    #[inline]
    pub fn is_boundary(&self, score: f32) -> bool {
        score >= self.0
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Threshold {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f32::deserialize(deserializer)?;
        Threshold::new(value).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("Threshold must be in (0, 1], got {0}")]
pub struct ThresholdError(pub f32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_valid_range() {
        assert!(Threshold::new(0.5).is_ok());
        assert!(Threshold::new(1.0).is_ok());
        assert!(Threshold::new(f32::MIN_POSITIVE).is_ok());
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Threshold::new(0.0).is_err());
        assert!(Threshold::new(-0.1).is_err());
        assert!(Threshold::new(1.01).is_err());
        assert!(Threshold::new(f32::NAN).is_err());
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let t = Threshold::new(0.5).unwrap();
        assert!(t.is_boundary(0.5));
        assert!(t.is_boundary(0.9));
        assert!(!t.is_boundary(0.49));
    }

    #[test]
    fn test_deserialize_validates() {
        let t: Threshold = serde_json::from_str("0.25").unwrap();
        assert_eq!(t.value(), 0.25);
        assert!(serde_json::from_str::<Threshold>("1.5").is_err());
    }
}
