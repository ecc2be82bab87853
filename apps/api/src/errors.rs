use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::encoder::ReadError;

/// Shown when an upload's type is outside the allow-list.
pub const UNSUPPORTED_FILE_MESSAGE: &str =
    "Please upload a PDF, Text file, or Image of your resume.";
/// Shown in the Error state after the upload could not be read.
pub const READ_FAILURE_MESSAGE: &str = "Error reading file.";
/// Shown in the Error state for every model-service failure.
pub const ANALYSIS_FAILURE_MESSAGE: &str =
    "Could not analyze resume. Please try again or check your API key.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Analysis already in progress")]
    AnalysisInFlight,

    #[error("Results must be reset before a new upload")]
    ResetRequired,

    #[error("Read error: {0}")]
    Read(#[from] ReadError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnsupportedFileType(_) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FILE_TYPE",
                UNSUPPORTED_FILE_MESSAGE.to_string(),
            ),
            AppError::AnalysisInFlight => (
                StatusCode::CONFLICT,
                "ANALYSIS_IN_FLIGHT",
                "An analysis is already running".to_string(),
            ),
            AppError::ResetRequired => (
                StatusCode::CONFLICT,
                "RESET_REQUIRED",
                "Start over before uploading another resume".to_string(),
            ),
            AppError::Read(e) => {
                tracing::warn!("Read error: {e}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "READ_ERROR",
                    READ_FAILURE_MESSAGE.to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                AppError::UnsupportedFileType("application/zip".into()),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (AppError::AnalysisInFlight, StatusCode::CONFLICT),
            (AppError::ResetRequired, StatusCode::CONFLICT),
            (AppError::Read(ReadError::TooLarge), StatusCode::UNPROCESSABLE_ENTITY),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
