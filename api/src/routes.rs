use crate::error::ApiError;
use crate::state::AppState;
use crate::uploads::UploadStore;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use categorizer::write_results;
use insight_core::{CaptionMap, CategoryResult, Post, Upload, UploadError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Multipart form field carrying the uploaded file.
const UPLOAD_FIELD: &str = "file";

fn default_sample_num() -> usize {
    10
}

fn default_seed() -> i64 {
    42
}

#[derive(Debug, Deserialize)]
pub struct SamplePostsRequest {
    pub mode: String,
    #[serde(default = "default_sample_num")]
    pub sample_num: usize,
    #[serde(default = "default_seed")]
    pub seed: i64,
    #[serde(default)]
    pub caption_map: Option<CaptionMap>,
}

#[derive(Debug, Serialize)]
pub struct SamplePostsResponse {
    pub posts: Vec<Post>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct CategorizeRequest {
    pub captions: Vec<String>,
    /// Falls back to the configured default model.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub save_results: bool,
}

#[derive(Debug, Serialize)]
pub struct CategorizeResponse {
    pub results: Vec<CategoryResult>,
    pub count: usize,
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Instagram Data Processor API",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": [
            "POST /posts/sample",
            "POST /posts/categorize",
            "POST /api/v1/uploads/json",
            "GET /api/v1/uploads",
            "GET /api/v1/uploads/:id",
            "GET /health",
            "GET /ready",
        ],
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Ready once the upload directory is in place.
pub async fn ready(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    if state.uploads.is_ready().await {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        warn!(
            "Upload directory {} is missing",
            state.uploads.dir().display()
        );
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not ready",
                "detail": "Upload directory is not available",
            })),
        )
    }
}

pub async fn sample_posts(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SamplePostsRequest>, JsonRejection>,
) -> Result<Json<SamplePostsResponse>, ApiError> {
    let Json(request) = payload?;

    // Negative seeds wrap; any i64 is a valid seed.
    let seed = request.seed as u64;
    let posts = state
        .store
        .sample_posts(
            &request.mode,
            request.sample_num,
            seed,
            request.caption_map.as_ref(),
        )
        .await
        .map_err(ApiError::from_sample_error)?;

    Ok(Json(SamplePostsResponse {
        count: posts.len(),
        posts,
    }))
}

pub async fn categorize_captions(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CategorizeRequest>, JsonRejection>,
) -> Result<Json<CategorizeResponse>, ApiError> {
    let Json(request) = payload?;
    let model = request
        .model
        .as_deref()
        .unwrap_or(state.default_model.as_str());

    let results = state
        .categorizer
        .categorize(&request.captions, model)
        .await
        .map_err(ApiError::from_categorize_error)?;

    if request.save_results {
        write_results(&state.output_dir, &results, &request.captions)
            .await
            .map_err(ApiError::from_categorize_error)?;
        info!("Saved {} results to {}", results.len(), state.output_dir.display());
    }

    Ok(Json(CategorizeResponse {
        count: results.len(),
        results,
    }))
}

#[derive(Debug, Serialize)]
pub struct UploadCreatedResponse {
    pub message: &'static str,
    pub upload: Upload,
}

#[derive(Debug, Serialize)]
pub struct UploadInfoResponse {
    #[serde(flatten)]
    pub upload: Upload,
    pub exists: bool,
}

#[derive(Debug, Serialize)]
pub struct UploadListResponse {
    pub uploads: Vec<Upload>,
    pub count: usize,
}

pub async fn upload_json(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadCreatedResponse>), ApiError> {
    let mut multipart = multipart?;
    let max = state.uploads.max_file_size();

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        UploadStore::check_filename(&filename)
            .map_err(|e| ApiError::from_upload_error(e.into()))?;

        let mut contents = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            if (contents.len() + chunk.len()) as u64 > max {
                return Err(ApiError::from_upload_error(
                    UploadError::TooLarge { max }.into(),
                ));
            }
            contents.extend_from_slice(&chunk);
        }

        let upload = state
            .uploads
            .save(&filename, &contents)
            .await
            .map_err(ApiError::from_upload_error)?;

        return Ok((
            StatusCode::CREATED,
            Json(UploadCreatedResponse {
                message: "File uploaded successfully",
                upload,
            }),
        ));
    }

    Err(ApiError::from_upload_error(UploadError::MissingFile.into()))
}

pub async fn get_upload(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UploadInfoResponse>, ApiError> {
    let upload = state
        .uploads
        .get(&id)
        .await
        .map_err(ApiError::from_upload_error)?;

    Ok(Json(UploadInfoResponse {
        upload,
        exists: true,
    }))
}

pub async fn list_uploads(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UploadListResponse>, ApiError> {
    let uploads = state
        .uploads
        .list()
        .await
        .map_err(ApiError::from_upload_error)?;

    Ok(Json(UploadListResponse {
        count: uploads.len(),
        uploads,
    }))
}
