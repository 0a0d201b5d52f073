/// LLM client: the single point of entry for all generative-AI calls.
///
/// ARCHITECTURAL RULE: No other module may call the provider API directly.
/// Handlers depend on the `AiProvider` trait; `LlmClient` is the production backend.
///
/// The backend never retries a provider call. Retrying is the caller's job (see `client`).
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::analysis::{AnalysisReport, Source};
use crate::models::resources::StructuredResources;

pub mod prompts;
pub mod schema;

use prompts::{
    fill_template, ANALYSIS_PROMPT_TEMPLATE, DISCOVERY_PROMPT_TEMPLATE, EXTRACTION_PROMPT,
    STRUCTURE_PROMPT_TEMPLATE,
};
use schema::{analysis_schema, learning_resources_schema, RawAnalysis};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Resume text beyond this many characters is never sent to the provider.
pub const MAX_RESUME_CHARS: usize = 5000;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("AI provider is not configured (missing API key)")]
    ProviderUnavailable,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("AI provider returned no text content")]
    MalformedResponse,

    #[error("AI provider output is not valid JSON for the schema: {0}")]
    SchemaParse(#[from] serde_json::Error),

    #[error("No text could be extracted from the file")]
    EmptyExtraction,
}

/// Connection settings for the generative-AI provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

/// Structured analysis plus whatever citations the provider attached.
#[derive(Debug, Clone)]
pub struct ProviderAnalysis {
    pub report: AnalysisReport,
    pub sources: Vec<Source>,
}

/// Unstructured, search-grounded discovery output.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub text: String,
    pub sources: Vec<Source>,
}

/// The generative-AI operations the orchestrator relies on.
///
/// Carried in `AppState` as `Arc<dyn AiProvider>` so tests can swap in fakes.
#[async_trait]
pub trait AiProvider: Send + Sync {
    async fn analyze_resume(
        &self,
        resume_text: &str,
        career_goal: &str,
    ) -> Result<ProviderAnalysis, LlmError>;

    async fn extract_text_from_file(&self, data: &[u8], mime_type: &str)
        -> Result<String, LlmError>;

    async fn discover_learning_resources(
        &self,
        role: &str,
        skills: &str,
    ) -> Result<Discovery, LlmError>;

    /// Coerces discovery notes into the resource shape. Items without a link are
    /// returned as-is; dropping them is the caller's decision.
    async fn structure_learning_resources(
        &self,
        raw_text: &str,
        sources: &[Source],
    ) -> Result<StructuredResources, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire format
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GroundingChunk {
    pub web: Option<WebChunk>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebChunk {
    pub uri: Option<String>,
    pub title: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate. `None` when there are none.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.trim().is_empty()).then_some(text)
    }

    /// Web citations from grounding metadata, deduplicated by URI in order.
    pub fn sources(&self) -> Vec<Source> {
        let mut sources: Vec<Source> = Vec::new();
        let chunks = self
            .candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|m| m.grounding_chunks.as_slice())
            .unwrap_or_default();

        for web in chunks.iter().filter_map(|c| c.web.as_ref()) {
            let Some(uri) = web.uri.as_deref().filter(|u| !u.is_empty()) else {
                continue;
            };
            if sources.iter().any(|s| s.uri == uri) {
                continue;
            }
            sources.push(Source {
                uri: uri.to_string(),
                title: web.title.clone().unwrap_or_else(|| uri.to_string()),
            });
        }
        sources
    }
}

#[derive(Debug, Deserialize)]
struct ProviderErrorEnvelope {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Request builders
// ────────────────────────────────────────────────────────────────────────────

/// Truncates to at most `max` characters, always on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn text_part(text: String) -> Part {
    Part {
        text: Some(text),
        inline_data: None,
    }
}

fn json_output(schema: Value) -> Option<GenerationConfig> {
    Some(GenerationConfig {
        response_mime_type: "application/json",
        response_schema: schema,
    })
}

pub(crate) fn build_analysis_request(resume_text: &str, career_goal: &str) -> GenerateContentRequest {
    let resume_text = truncate_chars(resume_text, MAX_RESUME_CHARS);
    let prompt = fill_template(
        ANALYSIS_PROMPT_TEMPLATE,
        &[("career_goal", career_goal), ("resume_text", resume_text)],
    );

    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![text_part(prompt)],
        }],
        generation_config: json_output(analysis_schema()),
        tools: vec![],
    }
}

pub(crate) fn build_extraction_request(data: &[u8], mime_type: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![
                Part {
                    text: None,
                    inline_data: Some(InlineData {
                        mime_type: mime_type.to_string(),
                        data: BASE64.encode(data),
                    }),
                },
                text_part(EXTRACTION_PROMPT.to_string()),
            ],
        }],
        generation_config: None,
        tools: vec![],
    }
}

pub(crate) fn build_discovery_request(role: &str, skills: &str) -> GenerateContentRequest {
    let skills = if skills.trim().is_empty() {
        "the core skills of the role"
    } else {
        skills
    };
    let prompt = fill_template(DISCOVERY_PROMPT_TEMPLATE, &[("role", role), ("skills", skills)]);

    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![text_part(prompt)],
        }],
        generation_config: None,
        tools: vec![Tool {
            google_search: GoogleSearch {},
        }],
    }
}

pub(crate) fn build_structure_request(raw_text: &str, sources: &[Source]) -> GenerateContentRequest {
    let citations = if sources.is_empty() {
        "(none)".to_string()
    } else {
        sources
            .iter()
            .map(|s| format!("- {} ({})", s.title, s.uri))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let prompt = fill_template(
        STRUCTURE_PROMPT_TEMPLATE,
        &[("citations", citations.as_str()), ("raw_text", raw_text)],
    );

    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![text_part(prompt)],
        }],
        generation_config: json_output(learning_resources_schema()),
        tools: vec![],
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Production `AiProvider`. Without a config every call fails with
/// `LlmError::ProviderUnavailable`.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    config: Option<GeminiConfig>,
}

impl LlmClient {
    pub fn new(config: Option<GeminiConfig>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build AI provider HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> Option<&str> {
        self.config.as_ref().map(|c| c.model.as_str())
    }

    fn endpoint(config: &GeminiConfig) -> String {
        format!(
            "{}/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        )
    }

    /// Sends one `generateContent` request. No retries.
    async fn generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LlmError> {
        let config = self.config.as_ref().ok_or(LlmError::ProviderUnavailable)?;

        let response = self
            .client
            .post(Self::endpoint(config))
            .header("x-goog-api-key", &config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("AI provider returned {}: {}", status, message);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        debug!(
            "AI provider call succeeded: candidates={}",
            parsed.candidates.len()
        );
        Ok(parsed)
    }
}

/// Parses provider text as JSON of type `T`, tolerating markdown fences.
pub(crate) fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    serde_json::from_str(strip_json_fences(text)).map_err(LlmError::SchemaParse)
}

#[async_trait]
impl AiProvider for LlmClient {
    async fn analyze_resume(
        &self,
        resume_text: &str,
        career_goal: &str,
    ) -> Result<ProviderAnalysis, LlmError> {
        let request = build_analysis_request(resume_text, career_goal);
        let response = self.generate(&request).await?;
        let text = response.text().ok_or(LlmError::MalformedResponse)?;
        let raw: RawAnalysis = parse_structured(&text)?;

        Ok(ProviderAnalysis {
            report: raw.into(),
            sources: response.sources(),
        })
    }

    async fn extract_text_from_file(
        &self,
        data: &[u8],
        mime_type: &str,
    ) -> Result<String, LlmError> {
        let request = build_extraction_request(data, mime_type);
        let response = self.generate(&request).await?;
        response
            .text()
            .map(|t| t.trim().to_string())
            .ok_or(LlmError::EmptyExtraction)
    }

    async fn discover_learning_resources(
        &self,
        role: &str,
        skills: &str,
    ) -> Result<Discovery, LlmError> {
        let request = build_discovery_request(role, skills);
        let response = self.generate(&request).await?;
        let text = response.text().ok_or(LlmError::MalformedResponse)?;

        Ok(Discovery {
            text,
            sources: response.sources(),
        })
    }

    async fn structure_learning_resources(
        &self,
        raw_text: &str,
        sources: &[Source],
    ) -> Result<StructuredResources, LlmError> {
        let request = build_structure_request(raw_text, sources);
        let response = self.generate(&request).await?;
        let text = response.text().ok_or(LlmError::MalformedResponse)?;
        parse_structured(&text)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}
