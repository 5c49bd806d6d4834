//! Shot boundary detection CLI.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use shotsplit_models::{ProcessRequest, DEFAULT_OUTPUT_FOLDER, DEFAULT_THRESHOLD};
use shotsplit_pipeline::config::provision_from_env;
use shotsplit_pipeline::{
    init_tracing, ExportOptions, Pipeline, PipelineConfig, PredictorBackend, ScoreConvention,
};

/// Detect shot boundaries with TransNetV2 and report or split the scenes
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the video file
    #[arg(value_parser = clap::value_parser!(PathBuf))]
    video: PathBuf,

    /// Boundary score threshold in (0, 1]
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f32,

    /// Output type: timecodes or split_videos
    #[arg(long = "output-type", default_value = "timecodes")]
    output_type: String,

    /// Folder for split clips
    #[arg(long = "output-folder", default_value = DEFAULT_OUTPUT_FOLDER)]
    output_folder: PathBuf,

    /// Inference backend: onnx or command (overrides SHOTSPLIT_BACKEND)
    #[arg(long)]
    backend: Option<PredictorBackend>,

    /// Model output convention: logits or probability (overrides SHOTSPLIT_SCORE_CONVENTION)
    #[arg(long = "score-convention")]
    score_convention: Option<ScoreConvention>,

    /// Weights directory (overrides SHOTSPLIT_WEIGHTS_DIR)
    #[arg(long = "weights-dir")]
    weights_dir: Option<PathBuf>,

    /// Also write the scene list as JSON to this path
    #[arg(long = "scenes-json")]
    scenes_json: Option<PathBuf>,

    /// Also write per-frame predictions as CSV to this path
    #[arg(long = "predictions-csv")]
    predictions_csv: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();

    let mut config = PipelineConfig::from_env();
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if let Some(convention) = args.score_convention {
        config.score_convention = convention;
    }
    if let Some(dir) = args.weights_dir {
        config.provision = provision_from_env(dir);
    }
    info!(backend = %config.backend, weights = %config.provision.artifact_path().display(), "Starting shotsplit");

    let request = ProcessRequest::new(args.video)
        .with_threshold(args.threshold)
        .with_output_type(args.output_type)
        .with_output_folder(args.output_folder);

    let pipeline = Pipeline::new(config).with_exports(ExportOptions {
        scenes_json: args.scenes_json,
        predictions_csv: args.predictions_csv,
    });

    match pipeline.process_video(&request).await {
        Ok(output) => {
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
            Ok(())
        }
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(1);
        }
    }
}
