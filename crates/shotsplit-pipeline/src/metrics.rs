//! Pipeline metrics.
//!
//! Recorded through the `metrics` facade; without an installed recorder
//! every call is a no-op.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const RUNS_TOTAL: &str = "shotsplit_runs_total";
    pub const RUNS_FAILED_TOTAL: &str = "shotsplit_runs_failed_total";
    pub const WEIGHT_CONVERSIONS_TOTAL: &str = "shotsplit_weight_conversions_total";
    pub const SCENES_DETECTED_TOTAL: &str = "shotsplit_scenes_detected_total";
    pub const CLIPS_WRITTEN_TOTAL: &str = "shotsplit_clips_written_total";
    pub const INFERENCE_DURATION_SECONDS: &str = "shotsplit_inference_duration_seconds";
}

/// Record a finished run.
pub fn record_run(output_type: &str, success: bool) {
    let labels = [("output_type", output_type.to_string())];
    counter!(names::RUNS_TOTAL, &labels).increment(1);
    if !success {
        counter!(names::RUNS_FAILED_TOTAL, &labels).increment(1);
    }
}

/// Record a weight conversion attempt.
pub fn record_conversion(success: bool) {
    let labels = [("status", if success { "ok" } else { "failed" }.to_string())];
    counter!(names::WEIGHT_CONVERSIONS_TOTAL, &labels).increment(1);
}

/// Record inference wall time for one video.
pub fn record_inference(backend: &str, duration_secs: f64) {
    let labels = [("backend", backend.to_string())];
    histogram!(names::INFERENCE_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record scenes found by segmentation.
pub fn record_scenes(count: usize) {
    counter!(names::SCENES_DETECTED_TOTAL).increment(count as u64);
}

/// Record one clip written in split mode.
pub fn record_clip_written() {
    counter!(names::CLIPS_WRITTEN_TOTAL).increment(1);
}
