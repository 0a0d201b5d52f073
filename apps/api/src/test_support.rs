//! Fakes shared by unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;

use crate::llm_client::{AiProvider, Discovery, LlmError, ProviderAnalysis};
use crate::models::analysis::{AnalysisRecommendations, AnalysisReport, AnalysisResult, Source};
use crate::models::resources::StructuredResources;
use crate::routes::build_router;
use crate::search_client::{ResourceSearch, SearchError, SearchResources};
use crate::state::AppState;
use crate::store::memory::{InMemoryAnalysisStore, InMemoryCourseRepository};
use crate::store::AnalysisStore;

fn schema_error() -> LlmError {
    match serde_json::from_str::<serde_json::Value>("not json") {
        Err(e) => LlmError::SchemaParse(e),
        Ok(_) => LlmError::MalformedResponse,
    }
}

pub fn sample_report() -> AnalysisReport {
    AnalysisReport {
        resume_score: 72,
        missing_skills: vec!["SQL".into(), "Statistics".into(), "MLOps".into()],
        recommendations: AnalysisRecommendations {
            certifications: vec!["X".into()],
            opportunities: vec!["Y".into()],
        },
        summary: "...".into(),
    }
}

/// Configurable `AiProvider`. A `None` field makes the matching call fail.
#[derive(Default)]
pub struct FakeAi {
    pub analysis: Option<AnalysisReport>,
    pub analysis_sources: Vec<Source>,
    pub extracted_text: Option<String>,
    pub discovery: Option<Discovery>,
    pub structured: Option<StructuredResources>,
    pub panic_on_discovery: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeAi {
    pub fn analyzing(report: AnalysisReport) -> Self {
        Self {
            analysis: Some(report),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl AiProvider for FakeAi {
    async fn analyze_resume(
        &self,
        resume_text: &str,
        career_goal: &str,
    ) -> Result<ProviderAnalysis, LlmError> {
        self.record(format!("analyze:{career_goal}:{}", resume_text.chars().count()));
        let report = self.analysis.clone().ok_or(LlmError::MalformedResponse)?;
        Ok(ProviderAnalysis {
            report,
            sources: self.analysis_sources.clone(),
        })
    }

    async fn extract_text_from_file(
        &self,
        data: &[u8],
        mime_type: &str,
    ) -> Result<String, LlmError> {
        self.record(format!("extract:{mime_type}:{}", data.len()));
        self.extracted_text.clone().ok_or(LlmError::EmptyExtraction)
    }

    async fn discover_learning_resources(
        &self,
        _role: &str,
        skills: &str,
    ) -> Result<Discovery, LlmError> {
        self.record(format!("discover:{skills}"));
        if self.panic_on_discovery {
            panic!("discovery blew up");
        }
        self.discovery.clone().ok_or(LlmError::ProviderUnavailable)
    }

    async fn structure_learning_resources(
        &self,
        _raw_text: &str,
        _sources: &[Source],
    ) -> Result<StructuredResources, LlmError> {
        self.record("structure".to_string());
        self.structured.clone().ok_or_else(schema_error)
    }
}

pub struct FakeSearch {
    outcome: Result<SearchResources, Option<u16>>,
}

impl FakeSearch {
    pub fn returning(resources: SearchResources) -> Self {
        Self {
            outcome: Ok(resources),
        }
    }

    pub fn not_configured() -> Self {
        Self { outcome: Err(None) }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            outcome: Err(Some(status)),
        }
    }
}

#[async_trait]
impl ResourceSearch for FakeSearch {
    async fn search_resources(
        &self,
        _role: &str,
        _skills: &[String],
    ) -> Result<SearchResources, SearchError> {
        match &self.outcome {
            Ok(resources) => Ok(resources.clone()),
            Err(None) => Err(SearchError::NotConfigured),
            Err(Some(status)) => Err(SearchError::Api {
                status: *status,
                message: "unavailable".into(),
            }),
        }
    }
}

/// An analysis store whose writes always fail.
pub struct FailingStore;

#[async_trait]
impl AnalysisStore for FailingStore {
    async fn save(&self, _user_id: &str, _result: &AnalysisResult) -> anyhow::Result<()> {
        anyhow::bail!("document store is down")
    }

    async fn list(&self, _user_id: &str) -> anyhow::Result<Vec<AnalysisResult>> {
        anyhow::bail!("document store is down")
    }
}

pub fn test_state(ai: FakeAi, search: FakeSearch) -> AppState {
    AppState {
        ai: Arc::new(ai),
        search: Arc::new(search),
        analyses: Arc::new(InMemoryAnalysisStore::default()),
        courses: Arc::new(InMemoryCourseRepository::default()),
    }
}

pub fn test_router(state: AppState) -> Router {
    build_router(state)
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}
