//! Ollama embedding provider.
//!
//! Calls `POST {url}/api/embeddings` with `{model, prompt}` and reads `{embedding}`.
//! Input is capped at `max_input_chars` characters before submission and every call is
//! bounded by the configured timeout.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{truncate_input, EmbeddingProvider};
use crate::config::EmbeddingConfig;
use crate::error::{MemoryError, MemoryResult};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

pub struct OllamaEmbeddingProvider {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    max_input_chars: usize,
    timeout: Duration,
}

impl OllamaEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build embedding HTTP client")?;

        let endpoint = format!("{}/api/embeddings", config.url.trim_end_matches('/'));
        tracing::info!(endpoint = %endpoint, model = %config.model, "ollama embedding provider ready");

        Ok(Self {
            http,
            endpoint,
            model: config.model.clone(),
            max_input_chars: config.max_input_chars,
            timeout,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn embed(&self, text: &str) -> MemoryResult<Vec<f32>> {
        let prompt = truncate_input(text, self.max_input_chars);
        let request = EmbeddingRequest {
            model: &self.model,
            prompt,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MemoryError::downstream(format!(
                        "embedding request timed out after {}s",
                        self.timeout.as_secs()
                    ))
                } else {
                    MemoryError::downstream(format!("embedding request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MemoryError::downstream(format!(
                "embedding provider returned HTTP {status}: {body}"
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| MemoryError::downstream(format!("invalid embedding response: {e}")))?;

        if parsed.embedding.is_empty() {
            return Err(MemoryError::downstream("embedding provider returned an empty vector"));
        }

        tracing::debug!(
            chars = prompt.chars().count(),
            dims = parsed.embedding.len(),
            "embedded text"
        );
        Ok(parsed.embedding)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
