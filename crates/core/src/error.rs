//! Error types for clausal.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, text extraction, chunking,
//! embedding and vector storage.

use thiserror::Error;

/// Unified error type for clausal.
///
/// Library functions return `Result<T, AppError>`; nothing panics on bad input.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A requested file or record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller asked for a chunking strategy that does not exist
    #[error("Unknown chunking strategy: '{0}'. Supported: clauses, sentences, paragraphs")]
    InvalidStrategy(String),

    /// PDF / text extraction errors
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Embedding provider errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_strategy_names_offender() {
        let err = AppError::InvalidStrategy("by-words".to_string());
        assert!(err.to_string().contains("'by-words'"));
    }

    #[test]
    fn test_from_serde_json() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
