use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{self, GeminiConfig};
use crate::search_client::{self, SearchConfig};

/// Application configuration loaded from environment variables.
///
/// Provider settings are optional: a missing AI key disables analysis and upload,
/// missing search settings only skip the first learning-resources step.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub gemini: Option<GeminiConfig>,
    pub search: Option<SearchConfig>,
    pub provider_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini = get("GEMINI_API_KEY").map(|api_key| GeminiConfig {
            api_key,
            model: get("GEMINI_MODEL").unwrap_or_else(|| llm_client::DEFAULT_MODEL.to_string()),
            base_url: get("GEMINI_BASE_URL")
                .unwrap_or_else(|| llm_client::DEFAULT_BASE_URL.to_string()),
        });

        let search = match (
            get("VERTEX_SEARCH_API_KEY"),
            get("VERTEX_PROJECT_ID"),
            get("VERTEX_DATA_STORE_ID"),
        ) {
            (Some(api_key), Some(project_id), Some(data_store_id)) => Some(SearchConfig {
                api_key,
                project_id,
                location: get("VERTEX_LOCATION").unwrap_or_else(|| "global".to_string()),
                data_store_id,
                base_url: get("VERTEX_SEARCH_BASE_URL")
                    .unwrap_or_else(|| search_client::DEFAULT_BASE_URL.to_string()),
            }),
            _ => None,
        };

        let provider_timeout = get("PROVIDER_TIMEOUT_SECS")
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("PROVIDER_TIMEOUT_SECS must be a whole number of seconds")?
            .unwrap_or(60);

        Ok(Config {
            database_url: get("DATABASE_URL"),
            gemini,
            search,
            provider_timeout: Duration::from_secs(provider_timeout),
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
