use std::path::Path;

use shotsplit_media::{check_ffmpeg, check_ffprobe};
use shotsplit_pipeline::{PipelineConfig, ProvisionState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = PipelineConfig::from_env();
    let provision = &config.provision;

    println!(
        "shotsplit-selfcheck: starting with weights_dir={} backend={}",
        provision.weights_dir.display(),
        config.backend
    );

    let ffmpeg = check_ffmpeg().map_err(|e| anyhow::anyhow!("{}", e))?;
    println!("shotsplit-selfcheck: ffmpeg at {}", ffmpeg.display());
    let ffprobe = check_ffprobe().map_err(|e| anyhow::anyhow!("{}", e))?;
    println!("shotsplit-selfcheck: ffprobe at {}", ffprobe.display());

    ensure_writable(&provision.weights_dir).await?;

    match provision.state() {
        ProvisionState::Present => println!(
            "shotsplit-selfcheck: weights present at {}",
            provision.artifact_path().display()
        ),
        ProvisionState::ReadyToConvert => println!(
            "shotsplit-selfcheck: weights will be converted on first run from {}",
            provision.checkpoint_dir.display()
        ),
        ProvisionState::SourceMissing => {
            return Err(anyhow::anyhow!(
                "no weights at {} and no checkpoint at {}",
                provision.artifact_path().display(),
                provision.checkpoint_dir.display()
            ))
        }
        ProvisionState::ToolMissing => {
            return Err(anyhow::anyhow!(
                "conversion tool unavailable: {} {}",
                provision.interpreter,
                provision.conversion_script.display()
            ))
        }
    }

    println!("shotsplit-selfcheck: ok");
    Ok(())
}

async fn ensure_writable(dir: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    let probe = dir.join(".selfcheck");
    tokio::fs::write(&probe, b"ok")
        .await
        .map_err(|e| anyhow::anyhow!("{} is not writable: {}", dir.display(), e))?;
    tokio::fs::remove_file(&probe).await?;
    Ok(())
}
