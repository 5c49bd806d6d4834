//! In-process TransNetV2 inference with ONNX Runtime.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{DynValue, Tensor, Value};
use shotsplit_media::{decode_frames, probe_video, RawFrames};
use shotsplit_models::FrameRate;
use tracing::{debug, info};

use super::window::{
    build_window, stitch_centers, WindowPlan, CENTER_END, FRAME_CHANNELS, FRAME_HEIGHT, FRAME_WIDTH,
    WINDOW_SIZE,
};
use super::{FramePredictor, PredictError, PredictResult, Prediction, ScoreConvention};
use crate::metrics;

/// TransNetV2 running on an ONNX Runtime session.
pub struct OnnxPredictor {
    model: Arc<OnnxModel>,
}

struct OnnxModel {
    session: Mutex<Session>,
    single_frame_output: String,
    all_frame_output: Option<String>,
    convention: ScoreConvention,
}

impl OnnxPredictor {
    /// Load the model from disk. Blocking.
    pub fn load(model_path: &Path, convention: ScoreConvention) -> PredictResult<Self> {
        let model_bytes = std::fs::read(model_path).map_err(|e| {
            PredictError::model_load(format!("Failed to read {}: {}", model_path.display(), e))
        })?;

        let session = Session::builder()
            .map_err(|e| PredictError::model_load(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| PredictError::model_load(format!("Failed to set optimization level: {}", e)))?
            .commit_from_memory(&model_bytes)
            .map_err(|e| PredictError::model_load(format!("Failed to load ONNX model: {}", e)))?;

        let single_frame_output = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| PredictError::model_load("Model declares no outputs"))?;
        let all_frame_output = session.outputs.get(1).map(|o| o.name.clone());

        info!(
            path = %model_path.display(),
            output = %single_frame_output,
            all_frames = all_frame_output.is_some(),
            "Loaded TransNetV2 ONNX model"
        );

        Ok(Self {
            model: Arc::new(OnnxModel {
                session: Mutex::new(session),
                single_frame_output,
                all_frame_output,
                convention,
            }),
        })
    }
}

#[async_trait]
impl FramePredictor for OnnxPredictor {
    fn name(&self) -> &'static str {
        "onnx"
    }

    async fn predict(&self, video: &Path) -> PredictResult<Prediction> {
        let info = probe_video(video).await?;
        let fps = FrameRate::new(info.fps)
            .map_err(|e| PredictError::Decode(format!("Unusable frame rate: {}", e)))?;

        let frames = decode_frames(video, FRAME_WIDTH, FRAME_HEIGHT).await?;
        if frames.is_empty() {
            return Err(PredictError::Decode(format!("No frames decoded from {}", video.display())));
        }
        debug!(frames = frames.frame_count(), fps = fps.fps(), "Decoded frames for inference");

        let model = Arc::clone(&self.model);
        let started = Instant::now();
        let (single, all) = tokio::task::spawn_blocking(move || model.infer(&frames))
            .await
            .map_err(|e| PredictError::inference(format!("Inference task failed: {}", e)))??;
        metrics::record_inference(self.name(), started.elapsed().as_secs_f64());

        let convention = self.model.convention;
        Ok(Prediction {
            scores: convention.normalize(single),
            fps,
            all_frame_scores: all.map(|raw| convention.normalize(raw)),
        })
    }
}

impl OnnxModel {
    /// Run every window and stitch the trusted centers back together.
    fn infer(&self, frames: &RawFrames) -> PredictResult<(Vec<f32>, Option<Vec<f32>>)> {
        let total = frames.frame_count();
        let plan = WindowPlan::new(total);

        let mut session = self
            .session
            .lock()
            .map_err(|_| PredictError::inference("Session lock poisoned"))?;

        let mut single_windows = Vec::with_capacity(plan.window_count());
        let mut all_windows = Vec::with_capacity(plan.window_count());

        for start in plan.window_starts() {
            let data = build_window(&plan, start, |i| frames.frame(i).unwrap_or_default());
            let shape = vec![
                1usize,
                WINDOW_SIZE,
                FRAME_HEIGHT as usize,
                FRAME_WIDTH as usize,
                FRAME_CHANNELS,
            ];
            let input: DynValue = Tensor::from_array((shape, data.into_boxed_slice()))
                .map(Value::from)
                .map_err(|e| PredictError::inference(format!("Failed to create tensor: {}", e)))?;

            let outputs = session
                .run(ort::inputs![input])
                .map_err(|e| PredictError::inference(format!("ONNX inference failed: {}", e)))?;

            single_windows.push(extract(outputs.get(self.single_frame_output.as_str()), &self.single_frame_output)?);
            if let Some(name) = &self.all_frame_output {
                all_windows.push(extract(outputs.get(name.as_str()), name)?);
            }
        }
        drop(session);

        let single = stitch_centers(single_windows, total);
        let all = self
            .all_frame_output
            .as_ref()
            .map(|_| stitch_centers(all_windows, total));

        if single.len() != total {
            return Err(PredictError::invalid_output(format!(
                "Expected {} predictions, got {}",
                total,
                single.len()
            )));
        }

        Ok((single, all))
    }
}

fn extract(value: Option<&DynValue>, name: &str) -> PredictResult<Vec<f32>> {
    let value = value.ok_or_else(|| PredictError::invalid_output(format!("Missing {} tensor", name)))?;
    let (_, data) = value
        .try_extract_tensor::<f32>()
        .map_err(|e| PredictError::invalid_output(format!("Failed to extract {}: {}", name, e)))?;

    if data.len() < CENTER_END {
        return Err(PredictError::invalid_output(format!(
            "{} has {} values per window, expected {}",
            name,
            data.len(),
            WINDOW_SIZE
        )));
    }
    Ok(data.to_vec())
}
