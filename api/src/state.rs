use crate::uploads::UploadStore;
use categorizer::Categorizer;
use export_data::ExportStore;
use insight_core::AppConfig;
use llm_interface::LlmProvider;
use std::path::PathBuf;
use std::sync::Arc;

/// Read-only state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub store: ExportStore,
    pub categorizer: Categorizer,
    pub output_dir: PathBuf,
    pub default_model: String,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(config: &AppConfig, provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            store: ExportStore::new(config.data_dir.clone()),
            categorizer: Categorizer::new(provider, config.llm.concurrency),
            output_dir: config.output_dir.clone(),
            default_model: config.llm.default_model.clone(),
            uploads: UploadStore::new(
                config.uploads.upload_dir.clone(),
                config.uploads.max_file_size,
            ),
        }
    }
}
