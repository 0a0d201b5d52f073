//! Axum route handlers for the Analysis API.

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::HeaderMap,
    Json,
};
use bytes::Bytes;
use tracing::{info, warn};

use crate::analysis::orchestrator::run_analysis;
use crate::errors::AppError;
use crate::models::analysis::{AnalysisResult, AnalyzeRequest, UploadResult};
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Body field wins over the header. Blank values are ignored.
fn resolve_user_id(headers: &HeaderMap, body_user: Option<String>) -> Option<String> {
    body_user
        .filter(|u| !u.trim().is_empty())
        .or_else(|| {
            headers
                .get(USER_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
}

/// POST /api/analyze
///
/// A body that cannot be read as an analysis request is a validation error.
pub async fn handle_analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    let Json(mut request) =
        payload.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    request.user_id = resolve_user_id(&headers, request.user_id.take());
    let outcome = run_analysis(state.ai.as_ref(), state.analyses.as_ref(), &request).await?;
    Ok(Json(outcome.result))
}

struct UploadedFile {
    data: Bytes,
    mime_type: String,
    file_name: Option<String>,
}

#[derive(Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    career_goal: Option<String>,
    user_id: Option<String>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" | "resume" => {
                let mime_type = field
                    .content_type()
                    .filter(|ct| !ct.is_empty())
                    .unwrap_or(DEFAULT_MIME_TYPE)
                    .to_string();
                let file_name = field.file_name().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read file: {e}")))?;
                form.file = Some(UploadedFile {
                    data,
                    mime_type,
                    file_name,
                });
            }
            "careerGoal" => form.career_goal = Some(read_text(field).await?),
            "userId" => form.user_id = Some(read_text(field).await?),
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid form field: {e}")))
}

/// POST /api/upload-resume
///
/// Extracts text from an uploaded resume. When a career goal is supplied the text
/// is analysed too; a failed analysis is logged and omitted, extraction still succeeds.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<UploadResult>, AppError> {
    let form = read_upload_form(multipart).await?;
    let file = form
        .file
        .filter(|f| !f.data.is_empty())
        .ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;

    info!(
        "Extracting text from {} ({}, {} bytes)",
        file.file_name.as_deref().unwrap_or("upload"),
        file.mime_type,
        file.data.len()
    );

    let extracted_text = state
        .ai
        .extract_text_from_file(&file.data, &file.mime_type)
        .await
        .map_err(|e| AppError::ExtractionFailed {
            details: e.to_string(),
        })?;
    let character_count = extracted_text.chars().count();

    let career_goal = form
        .career_goal
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty());
    let analysis = match career_goal {
        Some(career_goal) if !extracted_text.trim().is_empty() => {
            let request = AnalyzeRequest {
                resume_text: extracted_text.clone(),
                career_goal,
                user_id: resolve_user_id(&headers, form.user_id),
            };
            match run_analysis(state.ai.as_ref(), state.analyses.as_ref(), &request).await {
                Ok(outcome) => Some(outcome.result),
                Err(e) => {
                    warn!("Analysis after upload failed: {e}");
                    None
                }
            }
        }
        _ => None,
    };

    Ok(Json(UploadResult {
        extracted_text,
        character_count,
        analysis,
    }))
}

/// GET /api/users/:user_id/analyses
pub async fn handle_list_analyses(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<AnalysisResult>>, AppError> {
    let analyses = state.analyses.list(&user_id).await?;
    Ok(Json(analyses))
}
