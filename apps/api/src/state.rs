use std::sync::Arc;

use crate::llm_client::AiProvider;
use crate::search_client::ResourceSearch;
use crate::store::{AnalysisStore, CourseRepository};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Generative-AI provider. Unconfigured providers fail every call.
    pub ai: Arc<dyn AiProvider>,
    /// Secondary search provider for learning resources.
    pub search: Arc<dyn ResourceSearch>,
    pub analyses: Arc<dyn AnalysisStore>,
    pub courses: Arc<dyn CourseRepository>,
}
