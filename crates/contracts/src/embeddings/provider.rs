//! Embedding provider trait and factory.

use super::providers::{hash::HashProvider, ollama::OllamaProvider};
use clausal_core::{AppError, AppResult, EmbeddingConfig};
use std::sync::Arc;

/// Maps text to fixed-length vectors.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "hash", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Embed several texts; the result is one-to-one with `texts`.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }
}

/// Create an embedding provider based on configuration.
pub fn create_provider(config: &EmbeddingConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    if config.dimensions == 0 {
        return Err(AppError::Embedding(
            "Embedding dimensions must be greater than zero".to_string(),
        ));
    }

    match config.provider.as_str() {
        "hash" => Ok(Arc::new(HashProvider::new(&config.model, config.dimensions))),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config)?)),
        other => Err(AppError::Embedding(format!(
            "Unknown embedding provider: '{}'. Supported providers: hash, ollama",
            other
        ))),
    }
}
