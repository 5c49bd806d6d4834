//! Frame predictors.
//!
//! A [`FramePredictor`] turns a video into one boundary score per frame plus
//! the video's frame rate. Two backends exist: in-process ONNX Runtime and an
//! external inference command. The orchestrator only sees the trait; the
//! backend is picked by a [`PredictorFactory`].

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shotsplit_media::MediaError;
use shotsplit_models::{FrameRate, FrameScores};
use thiserror::Error;

pub mod command;
pub mod onnx;
pub mod window;

pub use command::CommandPredictor;
pub use onnx::OnnxPredictor;

pub type PredictResult<T> = Result<T, PredictError>;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Failed to decode video: {0}")]
    Decode(String),

    #[error("Invalid model output: {0}")]
    InvalidOutput(String),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),
}

impl PredictError {
    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad(msg.into())
    }

    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    pub fn invalid_output(msg: impl Into<String>) -> Self {
        Self::InvalidOutput(msg.into())
    }
}

/// Per-frame model output for one video.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Single-frame boundary scores, one per frame
    pub scores: FrameScores,
    pub fps: FrameRate,
    /// Secondary "all frames" head, when the backend exposes it
    pub all_frame_scores: Option<FrameScores>,
}

/// Raw numeric convention of a model's outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreConvention {
    /// Outputs are already in [0, 1]
    Probability,
    /// Outputs are unbounded logits and need a sigmoid
    #[default]
    Logits,
}

impl ScoreConvention {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreConvention::Probability => "probability",
            ScoreConvention::Logits => "logits",
        }
    }

    /// Convert raw outputs to scores in [0, 1].
    pub fn normalize(&self, raw: Vec<f32>) -> FrameScores {
        match self {
            ScoreConvention::Probability => FrameScores::new(raw),
            ScoreConvention::Logits => FrameScores::from_logits(raw),
        }
    }
}

impl fmt::Display for ScoreConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScoreConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "probability" | "probabilities" | "prob" => Ok(ScoreConvention::Probability),
            "logits" | "logit" => Ok(ScoreConvention::Logits),
            other => Err(format!("Unknown score convention: {}", other)),
        }
    }
}

/// Which inference backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictorBackend {
    /// In-process ONNX Runtime
    #[default]
    Onnx,
    /// External inference command
    Command,
}

impl PredictorBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictorBackend::Onnx => "onnx",
            PredictorBackend::Command => "command",
        }
    }
}

impl fmt::Display for PredictorBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PredictorBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "onnx" | "ort" => Ok(PredictorBackend::Onnx),
            "command" | "cmd" | "external" => Ok(PredictorBackend::Command),
            other => Err(format!("Unknown predictor backend: {}", other)),
        }
    }
}

/// Produces per-frame boundary scores for a video.
#[async_trait]
pub trait FramePredictor: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    async fn predict(&self, video: &Path) -> PredictResult<Prediction>;
}

/// Builds a predictor bound to a weight artifact.
#[async_trait]
pub trait PredictorFactory: Send + Sync {
    async fn create_predictor(&self, weights: &Path) -> PredictResult<Box<dyn FramePredictor>>;
}

/// Factory that picks the backend from configuration.
#[derive(Debug, Clone)]
pub struct BackendFactory {
    backend: PredictorBackend,
    convention: ScoreConvention,
    command: Vec<String>,
}

impl BackendFactory {
    pub fn new(backend: PredictorBackend, convention: ScoreConvention, command: Vec<String>) -> Self {
        Self {
            backend,
            convention,
            command,
        }
    }
}

#[async_trait]
impl PredictorFactory for BackendFactory {
    async fn create_predictor(&self, weights: &Path) -> PredictResult<Box<dyn FramePredictor>> {
        match self.backend {
            PredictorBackend::Onnx => {
                let weights = weights.to_path_buf();
                let convention = self.convention;
                // Session construction parses the whole graph; keep it off the runtime threads.
                let predictor = tokio::task::spawn_blocking(move || OnnxPredictor::load(&weights, convention))
                    .await
                    .map_err(|e| PredictError::model_load(format!("Model loader task failed: {}", e)))??;
                Ok(Box::new(predictor))
            }
            PredictorBackend::Command => Ok(Box::new(CommandPredictor::new(
                self.command.clone(),
                weights,
                self.convention,
            )?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parsing() {
        assert_eq!("onnx".parse::<PredictorBackend>().unwrap(), PredictorBackend::Onnx);
        assert_eq!(" Command ".parse::<PredictorBackend>().unwrap(), PredictorBackend::Command);
        assert!("tensorflow".parse::<PredictorBackend>().is_err());
        assert_eq!(PredictorBackend::default(), PredictorBackend::Onnx);
    }

    #[test]
    fn test_convention_normalizes_logits() {
        let scores = ScoreConvention::Logits.normalize(vec![0.0, 10.0, -10.0]);
        assert!((scores[0] - 0.5).abs() < 1e-6);
        assert!(scores[1] > 0.99);
        assert!(scores[2] < 0.01);
    }

    #[test]
    fn test_convention_keeps_probabilities() {
        let scores = ScoreConvention::Probability.normalize(vec![0.2, 0.9]);
        assert_eq!(scores.as_slice(), &[0.2, 0.9]);
    }

    #[tokio::test]
    async fn test_command_backend_requires_program() {
        let factory = BackendFactory::new(PredictorBackend::Command, ScoreConvention::Probability, vec![]);
        let err = factory.create_predictor(Path::new("weights/transnetv2.onnx")).await.err().unwrap();
        assert!(matches!(err, PredictError::ModelLoad(_)));
    }

    #[tokio::test]
    async fn test_onnx_backend_missing_weights() {
        let factory = BackendFactory::new(PredictorBackend::Onnx, ScoreConvention::Logits, vec![]);
        let err = factory
            .create_predictor(Path::new("/nonexistent/transnetv2.onnx"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, PredictError::ModelLoad(_)));
    }
}
