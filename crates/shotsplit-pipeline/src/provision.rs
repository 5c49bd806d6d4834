//! Weight artifact provisioning.
//!
//! The in-process runtime needs TransNetV2 weights in its native format. When
//! the artifact is missing it is derived once from the upstream TensorFlow
//! checkpoint by an external conversion script:
//!
//! ```text
//! <interpreter> <script> <checkpoint_dir> <staging_path>
//! ```
//!
//! The script runs with its search-path variable (`PYTHONPATH` by default)
//! extended on the child process only. On exit code 0 the staging file is
//! renamed onto the artifact path, so a partially written conversion never
//! appears as a valid artifact. Once present, the artifact is trusted
//! forever; provisioning keys purely on file existence.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::metrics;

/// Default artifact file name.
pub const DEFAULT_ARTIFACT_NAME: &str = "transnetv2.onnx";
/// Default checkpoint directory name inside the weights dir.
pub const DEFAULT_CHECKPOINT_DIR: &str = "transnetv2-weights";
/// Default conversion script name inside the weights dir.
pub const DEFAULT_CONVERSION_SCRIPT: &str = "convert_weights.py";
/// Default interpreter for the conversion script.
pub const DEFAULT_INTERPRETER: &str = "python3";
/// Default search-path environment variable for the conversion script.
pub const DEFAULT_SEARCH_PATH_VAR: &str = "PYTHONPATH";

pub type ProvisionResult<T> = Result<T, ProvisionError>;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(
        "Weights not found at {artifact} and source checkpoint missing at {checkpoint}; \
         download the TransNetV2 TensorFlow weights into that directory"
    )]
    SourceMissing { artifact: PathBuf, checkpoint: PathBuf },

    #[error("Weight conversion tool not found: {0}")]
    ToolMissing(String),

    #[error("Weight conversion failed ({}): {stderr}", describe_exit(.exit_code))]
    ConversionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Weight conversion exited successfully but wrote no file at {0}")]
    ArtifactMissing(PathBuf),

    #[error("IO error during provisioning: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Where the weight artifact lives and how to derive it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionConfig {
    /// Directory holding the artifact
    pub weights_dir: PathBuf,
    /// Artifact file name inside `weights_dir`
    pub artifact_name: String,
    /// Upstream TensorFlow checkpoint directory
    pub checkpoint_dir: PathBuf,
    /// Conversion script
    pub conversion_script: PathBuf,
    /// Program that runs the script
    pub interpreter: String,
    /// Extra module search path for the script; defaults to the script's directory
    pub search_path: Option<PathBuf>,
    /// Environment variable that carries the search path
    pub search_path_var: String,
}

/// Provisioning decision for the current filesystem state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionState {
    /// Artifact exists; nothing to do.
    Present,
    /// Artifact and source checkpoint are both absent.
    SourceMissing,
    /// Checkpoint present but the script or interpreter cannot be found.
    ToolMissing,
    /// All inputs are available; conversion can run.
    ReadyToConvert,
}

impl ProvisionConfig {
    /// Conventional layout rooted at `weights_dir`.
    pub fn new(weights_dir: impl Into<PathBuf>) -> Self {
        let weights_dir = weights_dir.into();
        Self {
            checkpoint_dir: weights_dir.join(DEFAULT_CHECKPOINT_DIR),
            conversion_script: weights_dir.join(DEFAULT_CONVERSION_SCRIPT),
            weights_dir,
            artifact_name: DEFAULT_ARTIFACT_NAME.to_string(),
            interpreter: DEFAULT_INTERPRETER.to_string(),
            search_path: None,
            search_path_var: DEFAULT_SEARCH_PATH_VAR.to_string(),
        }
    }

    /// Final artifact location.
    pub fn artifact_path(&self) -> PathBuf {
        self.weights_dir.join(&self.artifact_name)
    }

    /// Temporary file the conversion script writes to.
    pub fn staging_path(&self) -> PathBuf {
        self.weights_dir.join(format!("{}.partial", self.artifact_name))
    }

    /// Search path handed to the conversion script.
    pub fn effective_search_path(&self) -> Option<PathBuf> {
        self.search_path.clone().or_else(|| {
            self.conversion_script
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
        })
    }

    /// Inspect the filesystem and decide what provisioning must do.
    pub fn state(&self) -> ProvisionState {
        if self.artifact_path().is_file() {
            ProvisionState::Present
        } else if !self.checkpoint_dir.exists() {
            ProvisionState::SourceMissing
        } else if !self.conversion_script.is_file() || which::which(&self.interpreter).is_err() {
            ProvisionState::ToolMissing
        } else {
            ProvisionState::ReadyToConvert
        }
    }
}

/// Make sure the weight artifact exists, converting it on first use.
///
/// Returns the artifact path. An existing artifact returns immediately
/// without touching anything else.
pub async fn ensure_weights(config: &ProvisionConfig) -> ProvisionResult<PathBuf> {
    let artifact = config.artifact_path();

    match config.state() {
        ProvisionState::Present => {
            debug!(path = %artifact.display(), "Weight artifact present");
            Ok(artifact)
        }
        ProvisionState::SourceMissing => {
            let err = ProvisionError::SourceMissing {
                artifact,
                checkpoint: config.checkpoint_dir.clone(),
            };
            error!("{}", err);
            Err(err)
        }
        ProvisionState::ToolMissing => {
            let missing = if config.conversion_script.is_file() {
                format!("interpreter '{}' not found in PATH", config.interpreter)
            } else {
                config.conversion_script.display().to_string()
            };
            let err = ProvisionError::ToolMissing(missing);
            error!("{}", err);
            Err(err)
        }
        ProvisionState::ReadyToConvert => {
            let result = run_conversion(config).await;
            metrics::record_conversion(result.is_ok());
            if let Err(ref e) = result {
                error!("{}", e);
            }
            result
        }
    }
}

async fn run_conversion(config: &ProvisionConfig) -> ProvisionResult<PathBuf> {
    let artifact = config.artifact_path();
    let staging = config.staging_path();

    tokio::fs::create_dir_all(&config.weights_dir).await?;
    remove_if_exists(&staging).await?;

    info!(
        checkpoint = %config.checkpoint_dir.display(),
        script = %config.conversion_script.display(),
        target = %artifact.display(),
        "Converting TransNetV2 weights"
    );

    let mut cmd = Command::new(&config.interpreter);
    cmd.arg(&config.conversion_script)
        .arg(&config.checkpoint_dir)
        .arg(&staging)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(search_path) = config.effective_search_path() {
        let inherited = std::env::var_os(&config.search_path_var);
        cmd.env(&config.search_path_var, join_search_path(&search_path, inherited)?);
    }

    let output = cmd.output().await?;

    if !output.status.success() {
        let _ = remove_if_exists(&staging).await;
        return Err(ProvisionError::ConversionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    if !staging.is_file() {
        return Err(ProvisionError::ArtifactMissing(staging));
    }

    tokio::fs::rename(&staging, &artifact).await?;
    info!(path = %artifact.display(), "Weight conversion complete");

    Ok(artifact)
}

/// Prepend `first` to an inherited search-path value.
fn join_search_path(first: &Path, inherited: Option<OsString>) -> ProvisionResult<OsString> {
    let mut paths = vec![first.to_path_buf()];
    if let Some(existing) = inherited {
        paths.extend(std::env::split_paths(&existing));
    }
    std::env::join_paths(paths).map_err(|e| {
        ProvisionError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
    })
}

async fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
