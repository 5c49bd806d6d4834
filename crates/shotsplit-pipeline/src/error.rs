//! Pipeline error types.

use std::path::PathBuf;

use shotsplit_media::MediaError;
use shotsplit_models::{OutputTypeParseError, ThresholdError};
use thiserror::Error;

use crate::predictor::PredictError;
use crate::provision::ProvisionError;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Video not found at {}", .0.display())]
    VideoNotFound(PathBuf),

    #[error(transparent)]
    InvalidThreshold(#[from] ThresholdError),

    #[error(transparent)]
    UnknownOutputType(#[from] OutputTypeParseError),

    #[error("Weight provisioning failed: {0}")]
    Provision(#[from] ProvisionError),

    #[error("Prediction failed: {0}")]
    Predict(#[from] PredictError),

    #[error("Clip extraction failed: {0}")]
    Media(#[from] MediaError),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// The string handed back to callers of `process_video`.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::UnknownOutputType(e) => format!("Unexpected Error: {}", e),
            other => format!("Error: {}", other),
        }
    }
}
