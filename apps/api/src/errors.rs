use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The AI provider could not produce an analysis. `details` carries the cause.
    #[error("Analysis failed: {details}")]
    AnalysisFailed { details: String },

    #[error("Text extraction failed: {details}")]
    ExtractionFailed { details: String },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::AnalysisFailed { details } => {
                tracing::error!("Analysis failed: {details}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ANALYSIS_FAILED",
                    "Failed to analyze resume".to_string(),
                    Some(details.clone()),
                )
            }
            AppError::ExtractionFailed { details } => {
                tracing::error!("Text extraction failed: {details}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXTRACTION_FAILED",
                    "Failed to extract text from file".to_string(),
                    Some(details.clone()),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(details) = details {
            body["details"] = json!(details);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::body_json;

    #[tokio::test]
    async fn test_validation_maps_to_400_without_details() {
        let response = AppError::Validation("careerGoal is required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "careerGoal is required");
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_analysis_failure_carries_details() {
        let response = AppError::AnalysisFailed {
            details: "AI provider returned no text content".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["details"], "AI provider returned no text content");
        assert_eq!(body["code"], "ANALYSIS_FAILED");
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let response = AppError::Internal(anyhow::anyhow!("pool exhausted")).into_response();
        let body = body_json(response).await;
        assert_eq!(body["error"], "An internal server error occurred");
    }
}
