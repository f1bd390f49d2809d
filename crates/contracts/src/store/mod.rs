//! Vector store abstraction for embedded segments.
//!
//! Defines a trait for backend-agnostic vector storage and retrieval.

mod sqlite;

pub use sqlite::SqliteStore;

use clausal_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One stored vector with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: Value,
}

/// A ranked query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    pub score: f32,
    pub metadata: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_vectors: usize,
    /// Length of the stored vectors, `None` while the store is empty
    pub dimension: Option<usize>,
}

/// Equality conditions over metadata keys; all must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataFilter {
    conditions: BTreeMap<String, Value>,
}

impl MetadataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(key.into(), value.into());
        self
    }

    /// Parse `key=value` expressions.
    ///
    /// Values that read as JSON (numbers, booleans, quoted strings) are
    /// compared as such; anything else is a plain string.
    pub fn parse<S: AsRef<str>>(expressions: &[S]) -> AppResult<Self> {
        let mut filter = Self::new();

        for expr in expressions {
            let expr = expr.as_ref();
            let (key, raw) = expr.split_once('=').ok_or_else(|| {
                AppError::Config(format!("Invalid filter '{}': expected key=value", expr))
            })?;

            let key = key.trim();
            if key.is_empty() {
                return Err(AppError::Config(format!(
                    "Invalid filter '{}': empty key",
                    expr
                )));
            }

            let raw = raw.trim();
            let value =
                serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
            filter.conditions.insert(key.to_string(), value);
        }

        Ok(filter)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, metadata: &Value) -> bool {
        self.conditions
            .iter()
            .all(|(key, expected)| metadata.get(key) == Some(expected))
    }
}

/// Trait for vector store backends.
pub trait VectorStore: Send + Sync {
    /// Insert or replace records by id; returns the number written.
    fn upsert(&self, records: &[VectorRecord]) -> AppResult<usize>;

    /// Top-k records by descending cosine similarity, restricted by `filter`.
    fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> AppResult<Vec<QueryMatch>>;

    /// Records for the given ids; unknown ids are skipped.
    fn fetch(&self, ids: &[String]) -> AppResult<Vec<VectorRecord>>;

    /// Delete the given ids; returns the number removed.
    fn delete(&self, ids: &[String]) -> AppResult<usize>;

    fn delete_all(&self) -> AppResult<()>;

    fn stats(&self) -> AppResult<StoreStats>;
}
