pub mod error;
pub mod routes;
pub mod state;
pub mod uploads;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::AppState;
pub use uploads::UploadStore;

/// Room for multipart boundaries and part headers around the file itself.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit =
        usize::try_from(state.uploads.max_file_size().saturating_add(MULTIPART_OVERHEAD))
            .unwrap_or(usize::MAX);

    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/ready", get(routes::ready))
        .route("/posts/sample", post(routes::sample_posts))
        .route("/posts/categorize", post(routes::categorize_captions))
        .route(
            "/api/v1/uploads/json",
            post(routes::upload_json).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/uploads", get(routes::list_uploads))
        .route("/api/v1/uploads/:id", get(routes::get_upload))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
