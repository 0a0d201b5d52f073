pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::courses::handlers as courses;
use crate::resources::handlers as resources;
use crate::state::AppState;

/// Uploaded resumes may be larger than axum's 2 MB default.
const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/analyze", post(analysis::handle_analyze))
        .route(
            "/api/upload-resume",
            post(analysis::handle_upload_resume).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/api/users/:user_id/analyses",
            get(analysis::handle_list_analyses),
        )
        // Learning resources
        .route(
            "/api/courses/external",
            post(resources::handle_external_courses),
        )
        // Course catalog
        .route(
            "/api/courses",
            get(courses::handle_list_courses).post(courses::handle_create_course),
        )
        .route(
            "/api/courses/:id",
            get(courses::handle_get_course)
                .put(courses::handle_update_course)
                .delete(courses::handle_delete_course),
        )
        .with_state(state)
}
