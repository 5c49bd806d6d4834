//! End-to-end pipeline tests with a scripted predictor and clip writer.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shotsplit_media::{MediaError, MediaResult};
use shotsplit_models::{FrameRate, FrameScores, ProcessRequest};
use shotsplit_pipeline::predictor::PredictResult;
use shotsplit_pipeline::{
    ClipWriter, ExportOptions, FramePredictor, Pipeline, PipelineConfig, Prediction, PredictorFactory,
    ProvisionConfig,
};
use tempfile::TempDir;

struct ScriptedPredictor {
    scores: Vec<f32>,
    fps: f64,
}

#[async_trait]
impl FramePredictor for ScriptedPredictor {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn predict(&self, _video: &Path) -> PredictResult<Prediction> {
        Ok(Prediction {
            scores: FrameScores::new(self.scores.clone()),
            fps: FrameRate::new(self.fps).unwrap(),
            all_frame_scores: None,
        })
    }
}

#[derive(Default)]
struct ScriptedFactory {
    scores: Vec<f32>,
    created: AtomicUsize,
}

impl ScriptedFactory {
    fn new(scores: Vec<f32>) -> Arc<Self> {
        Arc::new(Self {
            scores,
            created: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl PredictorFactory for ScriptedFactory {
    async fn create_predictor(&self, _weights: &Path) -> PredictResult<Box<dyn FramePredictor>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedPredictor {
            scores: self.scores.clone(),
            fps: 25.0,
        }))
    }
}

#[derive(Default)]
struct TouchWriter {
    outputs: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl ClipWriter for TouchWriter {
    async fn write_clip(&self, _source: &Path, output: &Path, _start: f64, _duration: f64) -> MediaResult<()> {
        std::fs::write(output, b"clip")?;
        self.outputs.lock().unwrap().push(output.to_path_buf());
        Ok(())
    }
}

/// Writes clips until call `fail_on` (1-based), which fails like a missing encoder.
struct FailingWriter {
    fail_on: usize,
    calls: AtomicUsize,
}

#[async_trait]
impl ClipWriter for FailingWriter {
    async fn write_clip(&self, _source: &Path, output: &Path, _start: f64, _duration: f64) -> MediaResult<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                Some("Unknown encoder 'libx264'".to_string()),
                Some(1),
            ));
        }
        std::fs::write(output, b"clip")?;
        Ok(())
    }
}

const SCORES: [f32; 7] = [0.1, 0.1, 0.9, 0.1, 0.1, 0.9, 0.1];

struct Fixture {
    dir: TempDir,
    video: PathBuf,
    factory: Arc<ScriptedFactory>,
    writer: Arc<TouchWriter>,
    pipeline: Pipeline,
}

fn fixture(scores: &[f32]) -> Fixture {
    let dir = TempDir::new().unwrap();
    let weights_dir = dir.path().join("weights");
    std::fs::create_dir_all(&weights_dir).unwrap();
    let provision = ProvisionConfig::new(&weights_dir);
    std::fs::write(provision.artifact_path(), b"weights").unwrap();

    let video = dir.path().join("video.mp4");
    std::fs::write(&video, b"not really a video").unwrap();

    let config = PipelineConfig {
        provision,
        ..PipelineConfig::default()
    };
    let factory = ScriptedFactory::new(scores.to_vec());
    let writer = Arc::new(TouchWriter::default());
    let pipeline = Pipeline::new(config)
        .with_predictor_factory(factory.clone())
        .with_clip_writer(writer.clone());

    Fixture {
        dir,
        video,
        factory,
        writer,
        pipeline,
    }
}

#[tokio::test]
async fn missing_video_fails_before_any_work() {
    let fx = fixture(&SCORES);
    let missing = fx.dir.path().join("nope.mp4");
    let folder = fx.dir.path().join("out");

    let err = fx
        .pipeline
        .process_video(&ProcessRequest::new(&missing).with_output_folder(&folder))
        .await
        .unwrap_err();

    assert!(err.starts_with("Error: Video not found at"));
    assert!(err.contains("nope.mp4"));
    assert!(!folder.exists());
    assert_eq!(fx.factory.created.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn timecodes_report_lists_each_scene() {
    let fx = fixture(&SCORES);
    let request = ProcessRequest::new(&fx.video).with_output_folder(fx.dir.path().join("out"));

    let report = fx.pipeline.process_video(&request).await.unwrap();

    assert_eq!(
        report,
        "Detected Scenes:\nScene 1: 0.00s to 0.08s\nScene 2: 0.12s to 0.20s\nScene 3: 0.24s to 0.24s\n"
    );
    assert_eq!(report.lines().filter(|l| l.starts_with("Scene ")).count(), 3);
    assert!(fx.writer.outputs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn threshold_of_one_yields_single_scene() {
    let fx = fixture(&[0.2, 0.99, 0.3, 0.4]);
    let request = ProcessRequest::new(&fx.video)
        .with_threshold(1.0)
        .with_output_folder(fx.dir.path().join("out"));

    let report = fx.pipeline.process_video(&request).await.unwrap();
    assert_eq!(report, "Detected Scenes:\nScene 1: 0.00s to 0.12s\n");
}

#[tokio::test]
async fn split_videos_writes_numbered_clips() {
    let fx = fixture(&SCORES);
    let folder = fx.dir.path().join("scenes");
    let request = ProcessRequest::new(&fx.video)
        .with_output_type("split_videos")
        .with_output_folder(&folder);

    let message = fx.pipeline.process_video(&request).await.unwrap();

    assert_eq!(message, format!("Video successfully split into scenes at {}", folder.display()));
    for name in ["scene_001.mp4", "scene_002.mp4", "scene_003.mp4"] {
        assert!(folder.join(name).is_file(), "{name} missing");
    }
    assert!(!folder.join("scene_004.mp4").exists());
}

#[tokio::test]
async fn failed_clip_encode_reports_ffmpeg_output() {
    let fx = fixture(&SCORES);
    let writer = Arc::new(FailingWriter {
        fail_on: 2,
        calls: AtomicUsize::new(0),
    });
    let pipeline = Pipeline::new(fx.pipeline.config().clone())
        .with_predictor_factory(fx.factory.clone())
        .with_clip_writer(writer.clone());
    let folder = fx.dir.path().join("scenes");
    let request = ProcessRequest::new(&fx.video)
        .with_output_type("split_videos")
        .with_output_folder(&folder);

    let err = pipeline.process_video(&request).await.unwrap_err();

    assert!(err.starts_with("Error: Clip extraction failed"), "{err}");
    assert!(err.contains("Unknown encoder 'libx264'"), "{err}");
    assert!(folder.join("scene_001.mp4").is_file());
    assert!(!folder.join("scene_002.mp4").exists());
    assert!(!folder.join("scene_003.mp4").exists());
    assert_eq!(writer.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unknown_output_type_is_unexpected_error() {
    let fx = fixture(&SCORES);
    let request = ProcessRequest::new(&fx.video)
        .with_output_type("gif")
        .with_output_folder(fx.dir.path().join("out"));

    let err = fx.pipeline.process_video(&request).await.unwrap_err();
    assert!(err.starts_with("Unexpected Error"));
    assert_eq!(fx.factory.created.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn invalid_threshold_is_rejected_before_inference() {
    let fx = fixture(&SCORES);
    for threshold in [0.0, -0.5, 1.5, f32::NAN] {
        let request = ProcessRequest::new(&fx.video)
            .with_threshold(threshold)
            .with_output_folder(fx.dir.path().join("out"));
        let err = fx.pipeline.process_video(&request).await.unwrap_err();
        assert!(err.starts_with("Error: Threshold"), "{err}");
    }
    assert_eq!(fx.factory.created.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_weights_fail_the_call() {
    let fx = fixture(&SCORES);
    let mut config = fx.pipeline.config().clone();
    config.provision = ProvisionConfig::new(fx.dir.path().join("empty-weights"));
    let pipeline = Pipeline::new(config).with_predictor_factory(fx.factory.clone());

    let err = pipeline
        .process_video(&ProcessRequest::new(&fx.video).with_output_folder(fx.dir.path().join("out")))
        .await
        .unwrap_err();

    assert!(err.contains("Weight provisioning failed"), "{err}");
    assert_eq!(fx.factory.created.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn predictor_is_built_per_call() {
    let fx = fixture(&SCORES);
    let request = ProcessRequest::new(&fx.video).with_output_folder(fx.dir.path().join("out"));

    fx.pipeline.process_video(&request).await.unwrap();
    fx.pipeline.process_video(&request).await.unwrap();
    assert_eq!(fx.factory.created.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn exports_are_written() {
    let fx = fixture(&SCORES);
    let scenes_json = fx.dir.path().join("exports/scenes.json");
    let csv = fx.dir.path().join("exports/predictions.csv");
    let Fixture { dir, video, factory, writer, .. } = fx;

    let pipeline = Pipeline::new(PipelineConfig {
        provision: ProvisionConfig::new(dir.path().join("weights")),
        ..PipelineConfig::default()
    })
    .with_predictor_factory(factory)
    .with_clip_writer(writer)
    .with_exports(ExportOptions {
        scenes_json: Some(scenes_json.clone()),
        predictions_csv: Some(csv.clone()),
    });

    pipeline
        .process_video(&ProcessRequest::new(&video).with_output_folder(dir.path().join("out")))
        .await
        .unwrap();

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&scenes_json).unwrap()).unwrap();
    assert_eq!(json["total_frames"], 7);
    assert_eq!(json["scenes"].as_array().unwrap().len(), 3);
    assert_eq!(std::fs::read_to_string(&csv).unwrap().lines().count(), 8);
}
