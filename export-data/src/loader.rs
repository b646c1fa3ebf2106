use insight_core::{CoreError, ExportError, Mode};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Location of the export file for `mode` inside the unpacked activity export.
pub fn export_path(base_dir: &Path, mode: Mode) -> PathBuf {
    match mode {
        Mode::Saved => base_dir.join("saved").join("saved_posts.json"),
        Mode::Liked => base_dir.join("likes").join("liked_posts.json"),
    }
}

/// Read and parse the export file for `mode`. The file is read from disk on
/// every call.
pub async fn load_export(base_dir: &Path, mode: Mode) -> Result<Value, CoreError> {
    let path = export_path(base_dir, mode);
    debug!("Loading {} export from {}", mode, path.display());

    let contents = match tokio::fs::read_to_string(&path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ExportError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    serde_json::from_str(&contents).map_err(|e| {
        ExportError::InvalidJson {
            path: path.display().to_string(),
            details: e.to_string(),
        }
        .into()
    })
}
