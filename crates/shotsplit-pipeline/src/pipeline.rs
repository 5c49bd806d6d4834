//! End-to-end orchestration of one detection request.
//!
//! Check the video, prepare the output folder, provision weights, validate
//! parameters, then predict, segment and materialize. Every failure comes
//! back as a descriptive string; nothing panics past this boundary.

use std::path::PathBuf;
use std::sync::Arc;

use shotsplit_models::{OutputType, ProcessRequest, Threshold};
use tracing::Instrument;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::export;
use crate::logging::RunLogger;
use crate::materialize::{materialize, ClipWriter, FfmpegClipWriter};
use crate::metrics;
use crate::predictor::{BackendFactory, PredictorFactory};
use crate::provision::ensure_weights;
use crate::segmenter::segment;

/// Side outputs written after segmentation.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub scenes_json: Option<PathBuf>,
    pub predictions_csv: Option<PathBuf>,
}

/// Shot detection pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    factory: Arc<dyn PredictorFactory>,
    writer: Arc<dyn ClipWriter>,
    exports: ExportOptions,
}

impl Pipeline {
    /// Pipeline with the configured backend and FFmpeg clip writer.
    pub fn new(config: PipelineConfig) -> Self {
        let factory = BackendFactory::new(
            config.backend,
            config.score_convention,
            config.inference_command.clone(),
        );
        let writer = FfmpegClipWriter::new(config.encoding.clone());
        Self {
            config,
            factory: Arc::new(factory),
            writer: Arc::new(writer),
            exports: ExportOptions::default(),
        }
    }

    pub fn with_predictor_factory(mut self, factory: Arc<dyn PredictorFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_clip_writer(mut self, writer: Arc<dyn ClipWriter>) -> Self {
        self.writer = writer;
        self
    }

    pub fn with_exports(mut self, exports: ExportOptions) -> Self {
        self.exports = exports;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Detect scenes in `request.video_path` and produce the requested output.
    pub async fn process_video(&self, request: &ProcessRequest) -> Result<String, String> {
        let logger = RunLogger::new("process_video");
        let span = logger.create_span();

        let result = self.run(request, &logger).instrument(span).await;

        let label = request
            .output_type
            .parse::<OutputType>()
            .map(|t| t.as_str())
            .unwrap_or("unknown");
        metrics::record_run(label, result.is_ok());

        match result {
            Ok(output) => {
                logger.log_completion(&format!("{} output ready", label));
                Ok(output)
            }
            Err(e) => {
                logger.log_error(&e.to_string());
                Err(e.user_message())
            }
        }
    }

    async fn run(&self, request: &ProcessRequest, logger: &RunLogger) -> PipelineResult<String> {
        let video = &request.video_path;
        if !video.is_file() {
            return Err(PipelineError::VideoNotFound(video.clone()));
        }
        logger.log_start(&format!("video={}", video.display()));

        tokio::fs::create_dir_all(&request.output_folder).await?;

        let weights = ensure_weights(&self.config.provision).await?;

        let threshold = Threshold::new(request.threshold)?;
        let output_type: OutputType = request.output_type.parse()?;

        let predictor = self.factory.create_predictor(&weights).await?;
        logger.log_progress(&format!("Running {} inference", predictor.name()));
        let prediction = predictor.predict(video).await?;

        let scenes = segment(&prediction.scores, threshold);
        if scenes.is_empty() {
            logger.log_warning("Predictor returned no frames; nothing to segment");
        }
        metrics::record_scenes(scenes.len());
        logger.log_progress(&format!(
            "{} scenes over {} frames at {}",
            scenes.len(),
            scenes.total_frames,
            prediction.fps
        ));

        if let Some(path) = &self.exports.scenes_json {
            export::write_scenes_json(&scenes, path).await?;
        }
        if let Some(path) = &self.exports.predictions_csv {
            export::write_predictions_csv(&prediction, path).await?;
        }

        let output = materialize(
            output_type,
            self.writer.as_ref(),
            video,
            &scenes,
            prediction.fps,
            &request.output_folder,
        )
        .await?;

        Ok(output)
    }
}
