//! Client-side analysis with retries.
//!
//! Wraps `POST /api/analyze` in a fixed exponential backoff: after failed attempt
//! `n` (0-indexed) the loop waits `2^n` seconds, for at most `MAX_ATTEMPTS`
//! attempts. Attempts never overlap. A `CancellationToken` stops the loop
//! during a request or a delay.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::models::analysis::{AnalysisResult, AnalyzeRequest};
use crate::store::AnalysisStore;

pub const MAX_ATTEMPTS: u32 = 5;
pub const BASE_DELAY: Duration = Duration::from_secs(1);
const ANALYZE_PATH: &str = "/api/analyze";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Analysis failed after {attempts} attempts: {last_error}")]
    AnalysisExhausted { attempts: u32, last_error: String },

    #[error("Analysis cancelled")]
    Cancelled,
}

/// One analysis round trip to the backend.
#[async_trait]
pub trait AnalyzeTransport: Send + Sync {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisResult, ClientError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    details: Option<String>,
}

/// Talks to a running backend over HTTP.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build backend HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl AnalyzeTransport for HttpTransport {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisResult, ClientError> {
        let url = format!("{}{ANALYZE_PATH}", self.base_url.trim_end_matches('/'));
        let response = self.client.post(url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(ErrorBody {
                    error,
                    details: Some(details),
                }) => format!("{error}: {details}"),
                Ok(ErrorBody { error, .. }) => error,
                Err(_) => body,
            };
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

/// Delay after failed attempt `attempt` (0-indexed): `base * 2^attempt`.
pub fn backoff_delay(attempt: u32, base: Duration) -> Duration {
    base.saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX))
}

/// Retry wrapper around an `AnalyzeTransport`, with optional local persistence.
pub struct RetryingAnalyzer<T> {
    transport: T,
    store: Option<Arc<dyn AnalysisStore>>,
    user_id: Option<String>,
    max_attempts: u32,
    base_delay: Duration,
}

impl<T: AnalyzeTransport> RetryingAnalyzer<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            store: None,
            user_id: None,
            max_attempts: MAX_ATTEMPTS,
            base_delay: BASE_DELAY,
        }
    }

    /// Persists successful results for `user_id`. Both are needed for a save.
    pub fn with_store(mut self, store: Arc<dyn AnalysisStore>, user_id: impl Into<String>) -> Self {
        self.store = Some(store);
        self.user_id = Some(user_id.into());
        self
    }

    pub async fn analyze(
        &self,
        request: &AnalyzeRequest,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, ClientError> {
        let mut last_error = String::new();

        for attempt in 0..self.max_attempts {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Err(ClientError::Cancelled),
                outcome = self.transport.analyze(request) => outcome,
            };

            match outcome {
                Ok(result) => {
                    info!("Analysis succeeded on attempt {}", attempt + 1);
                    self.persist(&result).await;
                    return Ok(result);
                }
                Err(e) => {
                    let delay = backoff_delay(attempt, self.base_delay);
                    warn!(
                        "Analysis attempt {} of {} failed: {e}; waiting {}ms",
                        attempt + 1,
                        self.max_attempts,
                        delay.as_millis()
                    );
                    last_error = e.to_string();

                    tokio::select! {
                        _ = cancel.cancelled() => return Err(ClientError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }

        Err(ClientError::AnalysisExhausted {
            attempts: self.max_attempts,
            last_error,
        })
    }

    async fn persist(&self, result: &AnalysisResult) {
        let (Some(store), Some(user_id)) = (&self.store, &self.user_id) else {
            return;
        };
        if let Err(e) = store.save(user_id, result).await {
            warn!("Could not save analysis {} locally: {e:#}", result.id);
        }
    }
}
