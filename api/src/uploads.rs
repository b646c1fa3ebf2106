//! On-disk store for uploaded export files.
//!
//! Each accepted file is written to `<upload_dir>/<uuid>.json`. Only the
//! stored file is kept, so lookups and listings rebuild the record from the
//! file's metadata and report the stored name as `filename`.

use chrono::{DateTime, Utc};
use insight_core::{CoreError, Upload, UploadError};
use serde::de::IgnoredAny;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

const JSON_EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_file_size: u64,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, max_file_size: u64) -> Self {
        Self {
            dir: dir.into(),
            max_file_size,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub async fn ensure_dir(&self) -> Result<(), CoreError> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Whether the upload directory exists and is a directory.
    pub async fn is_ready(&self) -> bool {
        fs::metadata(&self.dir)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    /// Reject anything whose name does not end in `.json`.
    pub fn check_filename(filename: &str) -> Result<(), UploadError> {
        match Path::new(filename).extension().and_then(|ext| ext.to_str()) {
            Some(JSON_EXTENSION) => Ok(()),
            _ => Err(UploadError::NotJson {
                filename: filename.to_string(),
            }),
        }
    }

    pub async fn save(&self, filename: &str, contents: &[u8]) -> Result<Upload, CoreError> {
        Self::check_filename(filename)?;
        if contents.len() as u64 > self.max_file_size {
            return Err(UploadError::TooLarge {
                max: self.max_file_size,
            }
            .into());
        }
        serde_json::from_slice::<IgnoredAny>(contents).map_err(|e| UploadError::InvalidJson {
            details: e.to_string(),
        })?;

        let id = Uuid::new_v4().to_string();
        let stored_as = stored_name(&id);

        self.ensure_dir().await?;
        fs::write(self.dir.join(&stored_as), contents).await?;

        info!(
            "Stored upload {} ({} bytes) as {}",
            filename,
            contents.len(),
            stored_as
        );

        Ok(Upload {
            id,
            filename: client_file_name(filename),
            stored_as,
            size: contents.len() as u64,
            uploaded_at: Utc::now(),
        })
    }

    pub async fn get(&self, id: &str) -> Result<Upload, CoreError> {
        let not_found = || UploadError::NotFound { id: id.to_string() };

        // Ids are always UUIDs; anything else could escape the directory.
        let id = Uuid::parse_str(id).map_err(|_| not_found())?.to_string();
        let stored_as = stored_name(&id);

        match fs::metadata(self.dir.join(&stored_as)).await {
            Ok(meta) if meta.is_file() => Ok(record_from_metadata(id, stored_as, &meta)),
            Ok(_) => Err(not_found().into()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(not_found().into()),
            Err(e) => Err(e.into()),
        }
    }

    /// All stored uploads, oldest first. A missing directory lists as empty.
    pub async fn list(&self) -> Result<Vec<Upload>, CoreError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut uploads = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(JSON_EXTENSION) {
                continue;
            }
            let Some(id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| Uuid::parse_str(stem).ok())
            else {
                debug!("Skipping foreign file {}", path.display());
                continue;
            };

            let meta = entry.metadata().await?;
            if meta.is_file() {
                let id = id.to_string();
                let stored_as = stored_name(&id);
                uploads.push(record_from_metadata(id, stored_as, &meta));
            }
        }

        uploads.sort_by(|a, b| {
            a.uploaded_at
                .cmp(&b.uploaded_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(uploads)
    }
}

fn stored_name(id: &str) -> String {
    format!("{id}.{JSON_EXTENSION}")
}

/// Browsers may send a full path; keep only the last component.
fn client_file_name(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(filename)
        .to_string()
}

fn record_from_metadata(id: String, stored_as: String, meta: &std::fs::Metadata) -> Upload {
    let uploaded_at = meta
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    Upload {
        id,
        filename: stored_as.clone(),
        stored_as,
        size: meta.len(),
        uploaded_at,
    }
}
