//! Optional side outputs: scene list JSON and per-frame prediction CSV.

use std::fmt::Write as _;
use std::path::Path;

use shotsplit_models::SceneList;

use crate::error::{PipelineError, PipelineResult};
use crate::predictor::Prediction;

/// Write the scene list as pretty JSON.
pub async fn write_scenes_json(scenes: &SceneList, path: &Path) -> PipelineResult<()> {
    let json = scenes
        .to_json_pretty()
        .map_err(|e| PipelineError::export(format!("Failed to serialize scenes: {}", e)))?;
    write_creating_parent(path, json).await
}

/// Render per-frame scores as CSV.
///
/// The `all_frame` column is empty when the backend has no second head.
pub fn predictions_csv(prediction: &Prediction) -> String {
    let mut csv = String::from("frame,single_frame,all_frame\n");
    let all = prediction.all_frame_scores.as_ref();
    for (i, score) in prediction.scores.iter().enumerate() {
        let _ = match all.and_then(|a| a.as_slice().get(i)) {
            Some(a) => writeln!(csv, "{},{:.6},{:.6}", i, score, a),
            None => writeln!(csv, "{},{:.6},", i, score),
        };
    }
    csv
}

/// Write per-frame scores as CSV.
pub async fn write_predictions_csv(prediction: &Prediction, path: &Path) -> PipelineResult<()> {
    write_creating_parent(path, predictions_csv(prediction)).await
}

async fn write_creating_parent(path: &Path, contents: String) -> PipelineResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}
