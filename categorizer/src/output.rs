use insight_core::{CategoryResult, CoreError};
use std::path::Path;
use tokio::fs;
use tracing::info;

pub const CONTENT_FILE_PREFIX: &str = "content_";
pub const RESULTS_FILE: &str = "parsed_results.json";

/// Persist a batch: one `content_{i}.txt` per result that has a caption, plus the
/// whole list as pretty-printed JSON. Existing files are overwritten.
pub async fn write_results(
    dir: &Path,
    results: &[CategoryResult],
    captions: &[String],
) -> Result<(), CoreError> {
    fs::create_dir_all(dir).await?;

    let written = results.len().min(captions.len());
    for (i, result) in results.iter().take(written).enumerate() {
        let path = dir.join(format!("{CONTENT_FILE_PREFIX}{i}.txt"));
        fs::write(&path, result.to_string()).await?;
    }

    let json = serde_json::to_string_pretty(results)?;
    fs::write(dir.join(RESULTS_FILE), json).await?;

    info!(
        "Wrote {} result files and {} to {}",
        written,
        RESULTS_FILE,
        dir.display()
    );
    Ok(())
}
