use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::engine::types::ExclusionSet;

const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";
const DEFAULT_MODEL: &str = "conclave-ai";
const DEFAULT_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("word source disabled")]
    Disabled,
    #[error("word source unavailable: {0}")]
    Unavailable(#[from] reqwest::Error),
    #[error("word source timed out after {0:?}")]
    Timeout(Duration),
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: reqwest::StatusCode, body: String },
    #[error("malformed payload: {0}")]
    Malformed(String),
    #[error("invalid candidate word: {0:?}")]
    Invalid(String),
}

impl GenerationError {
    /// Network-side failures, as opposed to a reply that could not be used.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Disabled | Self::Unavailable(_) | Self::Timeout(_) | Self::HttpStatus { .. }
        )
    }
}

/// One textual exchange with the generator.
#[derive(Debug, Clone, Copy)]
pub struct WordRequest<'a> {
    pub prompt: &'a str,
    pub excluded: &'a ExclusionSet,
    pub temperature: Option<f64>,
}

/// Unreliable oracle proposing a single candidate word as free text.
pub trait WordSource: Send + Sync {
    fn propose(
        &self,
        request: &WordRequest<'_>,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

#[derive(Debug, Clone)]
pub struct WordSourceConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
}

impl WordSourceConfig {
    pub fn from_env() -> Self {
        let enabled = env_string("WORD_SOURCE_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);
        let endpoint = env_string("WORD_SOURCE_URL").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let model = env_string("WORD_SOURCE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let timeout =
            Duration::from_millis(env_u64("WORD_SOURCE_TIMEOUT_MS").unwrap_or(DEFAULT_TIMEOUT_MS));

        Self {
            enabled,
            endpoint,
            model,
            timeout,
        }
    }
}

impl Default for WordSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// Ollama-style `/api/generate` client.
#[derive(Clone)]
pub struct OllamaWordSource {
    config: WordSourceConfig,
    client: reqwest::Client,
}

impl OllamaWordSource {
    pub fn new(config: WordSourceConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { config, client }
    }

    pub fn from_env() -> Self {
        Self::new(WordSourceConfig::from_env())
    }

    pub fn is_available(&self) -> bool {
        self.config.enabled
            && !self.config.endpoint.trim().is_empty()
            && !self.config.model.trim().is_empty()
    }
}

impl WordSource for OllamaWordSource {
    async fn propose(&self, request: &WordRequest<'_>) -> Result<String, GenerationError> {
        if !self.is_available() {
            return Err(GenerationError::Disabled);
        }

        let mut payload = serde_json::json!({
            "model": self.config.model,
            "prompt": request.prompt,
            "stream": false,
        });
        if let Some(temperature) = request.temperature {
            payload["options"] = serde_json::json!({ "temperature": temperature });
        }

        let resp = self
            .client
            .post(&self.config.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(self.config.timeout)
                } else {
                    GenerationError::Unavailable(e)
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::HttpStatus { status, body });
        }

        let bytes = resp.bytes().await?;
        let parsed: GenerateResponse = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::debug!(body = %String::from_utf8_lossy(&bytes), "unparseable generator payload");
            GenerationError::Malformed(e.to_string())
        })?;

        parsed
            .response
            .ok_or_else(|| GenerationError::Malformed("missing `response` field".to_string()))
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    env_string(key)?.parse().ok()
}
