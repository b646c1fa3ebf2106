use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use insight_core::{CoreError, ErrorExt, ExportError, UploadError};
use serde_json::json;

/// Error returned by a handler, rendered as `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Sampling failures: caller mistakes are 4xx, everything else 500.
    pub fn from_sample_error(error: CoreError) -> Self {
        match &error {
            CoreError::Export(
                e @ (ExportError::InvalidMode { .. }
                | ExportError::SampleOutOfRange { .. }
                | ExportError::SampleTooLarge { .. }),
            ) => Self::new(StatusCode::BAD_REQUEST, e.to_string()),
            CoreError::InvalidInput { message } => Self::new(StatusCode::BAD_REQUEST, message),
            CoreError::Export(e @ ExportError::FileNotFound { .. }) => {
                Self::new(StatusCode::NOT_FOUND, format!("Data file not found: {e}"))
            }
            _ => {
                error.log_error();
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Internal server error: {error}"),
                )
            }
        }
    }

    /// Any failure while categorizing or saving is a 500.
    pub fn from_categorize_error(error: CoreError) -> Self {
        error.log_error();
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Categorization failed: {error}"),
        )
    }

    pub fn from_upload_error(error: CoreError) -> Self {
        match &error {
            CoreError::Upload(e @ UploadError::NotFound { .. }) => {
                Self::new(StatusCode::NOT_FOUND, e.to_string())
            }
            CoreError::Upload(e @ UploadError::TooLarge { .. }) => {
                Self::new(StatusCode::PAYLOAD_TOO_LARGE, e.to_string())
            }
            CoreError::Upload(e) => Self::new(StatusCode::BAD_REQUEST, e.to_string()),
            _ => {
                error.log_error();
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Upload failed: {error}"),
                )
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

/// Body limit hits surface here as 413.
impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        Self::new(error.status(), error.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
