//! Search/data-store client for course and opportunity records.
//!
//! One direct query per request, no discovery/structuring indirection.
//! The orchestrator treats every error from here, `NotConfigured` included,
//! as "skip this provider".

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::resources::{LearningCourse, Opportunity};

pub const DEFAULT_BASE_URL: &str = "https://discoveryengine.googleapis.com/v1";
const PAGE_SIZE: u32 = 10;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search provider is not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Connection settings for the search/data-store provider.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_key: String,
    pub project_id: String,
    pub location: String,
    pub data_store_id: String,
    pub base_url: String,
}

/// Courses and opportunities as returned by the search provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResources {
    pub courses: Vec<LearningCourse>,
    pub opportunities: Vec<Opportunity>,
}

#[async_trait]
pub trait ResourceSearch: Send + Sync {
    async fn search_resources(
        &self,
        role: &str,
        skills: &[String],
    ) -> Result<SearchResources, SearchError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest {
    query: String,
    page_size: u32,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResult {
    document: Option<Document>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    #[serde(default)]
    struct_data: Value,
    #[serde(default)]
    derived_struct_data: Value,
}

enum SearchHit {
    Course(LearningCourse),
    Opportunity(Opportunity),
}

pub(crate) fn build_query(role: &str, skills: &[String]) -> String {
    let skills: Vec<&str> = skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if skills.is_empty() {
        format!("{role} courses")
    } else {
        format!("{role} courses for {}", skills.join(", "))
    }
}

fn field(doc: &Document, key: &str) -> Option<String> {
    [&doc.struct_data, &doc.derived_struct_data]
        .into_iter()
        .find_map(|data| data.get(key).and_then(|v| v.as_str()))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Maps one result document. Documents without a title or link are skipped.
fn map_document(doc: &Document) -> Option<SearchHit> {
    let link = field(doc, "link").or_else(|| field(doc, "url"))?;
    let is_opportunity = doc
        .struct_data
        .get("type")
        .and_then(|v| v.as_str())
        .is_some_and(|t| t.eq_ignore_ascii_case("opportunity"));

    if is_opportunity {
        return Some(SearchHit::Opportunity(Opportunity {
            name: field(doc, "name").or_else(|| field(doc, "title"))?,
            description: field(doc, "description").or_else(|| field(doc, "snippet")),
            link,
            difficulty: field(doc, "difficulty"),
        }));
    }

    Some(SearchHit::Course(LearningCourse {
        title: field(doc, "title")?,
        provider: field(doc, "provider")
            .or_else(|| field(doc, "displayLink"))
            .unwrap_or_else(|| "Unknown".to_string()),
        link,
        cost: field(doc, "cost"),
        duration: field(doc, "duration"),
        level: field(doc, "level"),
    }))
}

fn collect_resources(response: SearchResponse) -> SearchResources {
    let mut resources = SearchResources::default();
    for doc in response.results.iter().filter_map(|r| r.document.as_ref()) {
        match map_document(doc) {
            Some(SearchHit::Course(course)) => resources.courses.push(course),
            Some(SearchHit::Opportunity(opportunity)) => {
                resources.opportunities.push(opportunity)
            }
            None => {}
        }
    }
    resources
}

/// Production `ResourceSearch` backed by a Discovery Engine data store.
#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    config: Option<SearchConfig>,
}

impl SearchClient {
    pub fn new(config: Option<SearchConfig>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build search HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    fn endpoint(config: &SearchConfig) -> String {
        format!(
            "{}/projects/{}/locations/{}/collections/default_collection/dataStores/{}/servingConfigs/default_search:search",
            config.base_url.trim_end_matches('/'),
            config.project_id,
            config.location,
            config.data_store_id
        )
    }
}

#[async_trait]
impl ResourceSearch for SearchClient {
    async fn search_resources(
        &self,
        role: &str,
        skills: &[String],
    ) -> Result<SearchResources, SearchError> {
        let config = self.config.as_ref().ok_or(SearchError::NotConfigured)?;
        let request = SearchRequest {
            query: build_query(role, skills),
            page_size: PAGE_SIZE,
        };

        let response = self
            .client
            .post(Self::endpoint(config))
            .header("x-goog-api-key", &config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Search provider returned {}: {}", status, message);
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SearchResponse = response.json().await?;
        let resources = collect_resources(parsed);
        debug!(
            "Search returned {} courses, {} opportunities",
            resources.courses.len(),
            resources.opportunities.len()
        );
        Ok(resources)
    }
}
