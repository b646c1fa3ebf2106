pub mod enrich;
pub mod loader;
pub mod sampler;

#[cfg(test)]
mod tests;

use insight_core::{CaptionMap, CoreError, Mode, Post};
use std::path::{Path, PathBuf};
use tracing::info;

pub use enrich::enrich;
pub use loader::{export_path, load_export};
pub use sampler::{extract_posts, sample, validate_sample_size, MAX_SAMPLE, MIN_SAMPLE};

/// Read access to an unpacked activity export on disk.
#[derive(Debug, Clone)]
pub struct ExportStore {
    base_dir: PathBuf,
}

impl ExportStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Load the export for `mode`, draw a seeded sample and enrich it.
    pub async fn sample_posts(
        &self,
        mode: &str,
        sample_num: usize,
        seed: u64,
        caption_map: Option<&CaptionMap>,
    ) -> Result<Vec<Post>, CoreError> {
        let mode: Mode = mode.parse()?;
        validate_sample_size(sample_num)?;

        let export = load_export(&self.base_dir, mode).await?;
        let records = extract_posts(&export, mode)?;
        let sampled = sample(&records, sample_num, seed)?;

        info!(
            "Sampled {} of {} {} posts (seed {})",
            sampled.len(),
            records.len(),
            mode,
            seed
        );

        Ok(enrich(sampled, caption_map))
    }
}
