//! Clausal Core Library
//!
//! This crate provides the foundational utilities shared by the clausal crates:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, ChunkingConfig, EmbeddingConfig, SearchConfig, StoreConfig};
pub use error::{AppError, AppResult};
