//! Out-of-process inference through an external command.
//!
//! The command is invoked as `<program> [args..] --weights <artifact> <video>`
//! and must print a single JSON object on stdout:
//!
//! ```json
//! {"fps": 25.0, "predictions": [0.01, 0.97, ...], "all_frame_predictions": [...]}
//! ```

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;
use shotsplit_models::FrameRate;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{FramePredictor, PredictError, PredictResult, Prediction, ScoreConvention};
use crate::metrics;

/// JSON printed by the inference command.
#[derive(Debug, Deserialize)]
struct CommandOutput {
    fps: f64,
    predictions: Vec<f32>,
    #[serde(default)]
    all_frame_predictions: Option<Vec<f32>>,
}

/// Predictor backed by an external inference program.
#[derive(Debug, Clone)]
pub struct CommandPredictor {
    program: String,
    args: Vec<String>,
    weights: PathBuf,
    convention: ScoreConvention,
}

impl CommandPredictor {
    /// `command` is the program followed by its leading arguments.
    pub fn new(command: Vec<String>, weights: &Path, convention: ScoreConvention) -> PredictResult<Self> {
        let mut parts = command.into_iter();
        let program = parts
            .next()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| PredictError::model_load("No inference command configured"))?;

        Ok(Self {
            program,
            args: parts.collect(),
            weights: weights.to_path_buf(),
            convention,
        })
    }

    fn parse_output(&self, stdout: &str) -> PredictResult<Prediction> {
        let parsed: CommandOutput = serde_json::from_str(stdout.trim())
            .map_err(|e| PredictError::invalid_output(format!("Failed to parse inference output: {}", e)))?;

        let fps = FrameRate::new(parsed.fps)
            .map_err(|e| PredictError::invalid_output(format!("Invalid fps: {}", e)))?;

        if let Some(all) = &parsed.all_frame_predictions {
            if all.len() != parsed.predictions.len() {
                warn!(
                    single = parsed.predictions.len(),
                    all = all.len(),
                    "Prediction heads disagree on frame count"
                );
            }
        }

        Ok(Prediction {
            scores: self.convention.normalize(parsed.predictions),
            fps,
            all_frame_scores: parsed
                .all_frame_predictions
                .map(|raw| self.convention.normalize(raw)),
        })
    }
}

#[async_trait]
impl FramePredictor for CommandPredictor {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn predict(&self, video: &Path) -> PredictResult<Prediction> {
        debug!(program = %self.program, video = %video.display(), "Running inference command");
        let started = Instant::now();

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--weights")
            .arg(&self.weights)
            .arg(video)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| PredictError::inference(format!("Failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PredictError::inference(format!(
                "{} exited with {:?}: {}",
                self.program,
                output.status.code(),
                stderr.trim()
            )));
        }

        metrics::record_inference(self.name(), started.elapsed().as_secs_f64());
        self.parse_output(&String::from_utf8_lossy(&output.stdout))
    }
}
