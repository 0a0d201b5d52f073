//! Axum route handlers for the user-curated course catalog.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::course::{Course, CourseUpdate, NewCourse};
use crate::state::AppState;

/// GET /api/courses
pub async fn handle_list_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<Course>>, AppError> {
    Ok(Json(state.courses.list().await?))
}

/// POST /api/courses
pub async fn handle_create_course(
    State(state): State<AppState>,
    Json(request): Json<NewCourse>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    if let Some(field) = request.missing_field() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    let course = state.courses.create(request).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// GET /api/courses/:id
pub async fn handle_get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Course>, AppError> {
    state
        .courses
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Course {id} not found")))
}

/// PUT /api/courses/:id
pub async fn handle_update_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<CourseUpdate>,
) -> Result<Json<Course>, AppError> {
    if let Some(field) = update.blanked_field() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    state
        .courses
        .update(id, update)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Course {id} not found")))
}

/// DELETE /api/courses/:id
pub async fn handle_delete_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.courses.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Course {id} not found")))
    }
}
