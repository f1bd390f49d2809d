//! Ollama Embedding Provider
//!
//! Calls a local Ollama server's `/api/embed` endpoint, which accepts a list
//! of inputs per request. Failed requests are retried with exponential
//! backoff.

use crate::embeddings::EmbeddingProvider;
use async_trait::async_trait;
use clausal_core::{AppError, AppResult, EmbeddingConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const EMBED_ENDPOINT: &str = "/api/embed";

/// Maximum attempts per batch request
const MAX_RETRIES: u32 = 3;

/// Initial backoff duration in milliseconds
const INITIAL_BACKOFF_MS: u64 = 100;

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaProvider {
    /// Build a provider; no request is made until the first embedding.
    pub fn new(config: &EmbeddingConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AppError::Embedding(format!("Failed to create HTTP client for Ollama: {}", e))
            })?;

        let base_url = config
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), model = %self.model))]
    async fn embed_with_retries(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let mut attempt = 0;

        loop {
            match self.embed_once(texts).await {
                Ok(embeddings) => return Ok(embeddings),
                Err(e) => {
                    attempt += 1;
                    if attempt >= MAX_RETRIES {
                        return Err(e);
                    }

                    let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(attempt);
                    warn!(
                        "Embedding failed (attempt {}/{}): {}, retrying in {}ms",
                        attempt, MAX_RETRIES, e, backoff_ms
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
            }
        }
    }

    async fn embed_once(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let url = format!("{}{}", self.base_url, EMBED_ENDPOINT);
        let request = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("Failed to send request to Ollama: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|e| e.error)
                .unwrap_or(error_text);

            return Err(AppError::Embedding(format!(
                "Ollama API error ({}): {}",
                status, message
            )));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("Failed to parse Ollama response: {}", e)))?;

        self.check_response(texts.len(), body.embeddings)
    }

    fn check_response(
        &self,
        expected: usize,
        embeddings: Vec<Vec<f32>>,
    ) -> AppResult<Vec<Vec<f32>>> {
        if embeddings.len() != expected {
            return Err(AppError::Embedding(format!(
                "Ollama returned {} embeddings for {} inputs",
                embeddings.len(),
                expected
            )));
        }

        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dimensions) {
            return Err(AppError::Embedding(format!(
                "Ollama model '{}' returned {} dimensions, expected {}",
                self.model,
                bad.len(),
                self.dimensions
            )));
        }

        Ok(embeddings)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        if texts.iter().any(|t| t.trim().is_empty()) {
            return Err(AppError::Embedding("Cannot embed empty text".to_string()));
        }

        self.embed_with_retries(texts).await
    }
}
