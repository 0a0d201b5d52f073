use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A citation a provider claims as evidence for its generated content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

/// Plain-text recommendations carried by an analysis.
///
/// These are intentionally strings, unlike the structured course objects
/// returned by the learning-resources endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecommendations {
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub opportunities: Vec<String>,
}

/// The provider-generated body of an analysis, already shaped to the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// 0 to 100
    pub resume_score: u8,
    pub missing_skills: Vec<String>,
    pub recommendations: AnalysisRecommendations,
    pub summary: String,
}

/// A finished analysis. Never mutated after creation: re-analysing produces a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub id: Uuid,
    #[serde(flatten)]
    pub report: AnalysisReport,
    pub timestamp: DateTime<Utc>,
    pub career_goal: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl AnalysisResult {
    /// Stamps a fresh id and the server clock onto a provider report.
    pub fn new(report: AnalysisReport, career_goal: &str, sources: Vec<Source>) -> Self {
        Self {
            id: Uuid::new_v4(),
            report,
            timestamp: Utc::now(),
            career_goal: career_goal.to_string(),
            sources,
        }
    }
}

/// Body of `POST /api/analyze`.
///
/// Missing fields deserialize as empty strings so the orchestrator can
/// reject them with a validation error instead of an extractor rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub resume_text: String,
    #[serde(default)]
    pub career_goal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Response of `POST /api/upload-resume`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub extracted_text: String,
    pub character_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
}
