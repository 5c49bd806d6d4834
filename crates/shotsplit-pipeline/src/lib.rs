//! Shot boundary detection pipeline.
//!
//! This crate provides:
//! - Scene segmentation of per-frame boundary scores
//! - Lazy one-time provisioning of TransNetV2 weights
//! - Frame predictors (in-process ONNX Runtime or an external command)
//! - Timecode reports and per-scene clip splitting
//! - The orchestrating [`Pipeline`]

pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod materialize;
pub mod metrics;
pub mod pipeline;
pub mod predictor;
pub mod provision;
pub mod segmenter;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use logging::{init_tracing, RunLogger};
pub use materialize::{format_timecodes, ClipWriter, FfmpegClipWriter};
pub use pipeline::{ExportOptions, Pipeline};
pub use predictor::{
    BackendFactory, FramePredictor, PredictError, Prediction, PredictorBackend, PredictorFactory,
    ScoreConvention,
};
pub use provision::{ensure_weights, ProvisionConfig, ProvisionError, ProvisionState};
pub use segmenter::segment;
