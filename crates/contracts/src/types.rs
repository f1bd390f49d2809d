//! Report types produced by the contract pipeline.

use crate::chunk::{ChunkStatistics, ChunkStrategy};
use crate::store::{QueryMatch, StoreStats};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Outcome of processing one contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessReport {
    pub success: bool,
    pub path: PathBuf,
    pub strategy: ChunkStrategy,

    /// Extracted text length in characters
    #[serde(default)]
    pub text_length: usize,

    #[serde(default)]
    pub chunks_created: usize,

    #[serde(default)]
    pub embeddings_generated: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_statistics: Option<ChunkStatistics>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_statistics: Option<StoreStats>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessReport {
    pub(crate) fn failed(path: PathBuf, strategy: ChunkStrategy, error: String) -> Self {
        Self {
            success: false,
            path,
            strategy,
            text_length: 0,
            chunks_created: 0,
            embeddings_generated: 0,
            chunk_statistics: None,
            index_statistics: None,
            error: Some(error),
        }
    }
}

/// One search result, with segment fields lifted out of the stored metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub heading: String,
    pub content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    pub metadata: Value,
}

impl From<QueryMatch> for SearchHit {
    fn from(m: QueryMatch) -> Self {
        let text_field = |key: &str| {
            m.metadata
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Self {
            heading: text_field("heading").unwrap_or_default(),
            content: text_field("content").unwrap_or_default(),
            source: text_field("source"),
            id: m.id,
            score: m.score,
            metadata: m.metadata,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStats {
    pub index: StoreStats,
    pub embedding_provider: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
}

/// Result of checking a file before processing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Extracted text length in characters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_length: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
}

impl ValidationReport {
    pub(crate) fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}
