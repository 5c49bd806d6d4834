//! Pipeline configuration.

use std::path::PathBuf;

use shotsplit_models::EncodingConfig;

use crate::predictor::{PredictorBackend, ScoreConvention};
use crate::provision::{
    ProvisionConfig, DEFAULT_ARTIFACT_NAME, DEFAULT_CHECKPOINT_DIR, DEFAULT_CONVERSION_SCRIPT,
    DEFAULT_INTERPRETER, DEFAULT_SEARCH_PATH_VAR,
};

/// Default directory holding weights and the conversion tooling.
pub const DEFAULT_WEIGHTS_DIR: &str = "weights";

/// Default external inference command.
pub const DEFAULT_INFERENCE_COMMAND: &str = "transnetv2-predict";

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Where the weight artifact lives and how to derive it
    pub provision: ProvisionConfig,
    /// Inference backend
    pub backend: PredictorBackend,
    /// Raw output convention of the model
    pub score_convention: ScoreConvention,
    /// External inference command (program + leading args) for the command backend
    pub inference_command: Vec<String>,
    /// Encoder settings for split mode
    pub encoding: EncodingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            provision: ProvisionConfig::new(DEFAULT_WEIGHTS_DIR),
            backend: PredictorBackend::default(),
            score_convention: ScoreConvention::default(),
            inference_command: split_command(DEFAULT_INFERENCE_COMMAND),
            encoding: EncodingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let weights_dir = PathBuf::from(
            std::env::var("SHOTSPLIT_WEIGHTS_DIR").unwrap_or_else(|_| DEFAULT_WEIGHTS_DIR.to_string()),
        );

        let provision = provision_from_env(weights_dir);

        let mut encoding = EncodingConfig::new();
        if let Ok(preset) = std::env::var("SHOTSPLIT_PRESET") {
            encoding = encoding.with_preset(preset);
        }
        if let Some(crf) = std::env::var("SHOTSPLIT_CRF").ok().and_then(|s| s.parse().ok()) {
            encoding = encoding.with_crf(crf);
        }

        Self {
            provision,
            backend: std::env::var("SHOTSPLIT_BACKEND")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            score_convention: std::env::var("SHOTSPLIT_SCORE_CONVENTION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            inference_command: split_command(
                &std::env::var("SHOTSPLIT_INFERENCE_COMMAND")
                    .unwrap_or_else(|_| DEFAULT_INFERENCE_COMMAND.to_string()),
            ),
            encoding,
        }
    }
}

/// Provisioning layout rooted at `weights_dir`, with the environment's
/// explicit overrides applied on top.
pub fn provision_from_env(weights_dir: impl Into<PathBuf>) -> ProvisionConfig {
    provision_from_lookup(weights_dir.into(), |key| std::env::var(key).ok())
}

fn provision_from_lookup(weights_dir: PathBuf, var: impl Fn(&str) -> Option<String>) -> ProvisionConfig {
    ProvisionConfig {
        artifact_name: var("SHOTSPLIT_WEIGHTS_FILE").unwrap_or_else(|| DEFAULT_ARTIFACT_NAME.to_string()),
        checkpoint_dir: var("SHOTSPLIT_CHECKPOINT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| weights_dir.join(DEFAULT_CHECKPOINT_DIR)),
        conversion_script: var("SHOTSPLIT_CONVERT_SCRIPT")
            .map(PathBuf::from)
            .unwrap_or_else(|| weights_dir.join(DEFAULT_CONVERSION_SCRIPT)),
        interpreter: var("SHOTSPLIT_PYTHON").unwrap_or_else(|| DEFAULT_INTERPRETER.to_string()),
        search_path: var("SHOTSPLIT_CONVERT_SEARCH_PATH").map(PathBuf::from),
        search_path_var: var("SHOTSPLIT_CONVERT_SEARCH_PATH_VAR")
            .unwrap_or_else(|| DEFAULT_SEARCH_PATH_VAR.to_string()),
        weights_dir,
    }
}

/// Whitespace-split a command line. No quoting support.
pub fn split_command(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}
