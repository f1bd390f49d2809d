//! Contract clause search.
//!
//! Splits contract text into clause-aware segments, embeds them, and serves
//! nearest-neighbour search over a local SQLite index.

pub mod chunk;
pub mod embeddings;
pub mod extract;
pub mod pipeline;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use chunk::{ChunkEngine, ChunkStatistics, ChunkStrategy, Segment};
pub use embeddings::{create_provider, EmbeddingProvider};
pub use extract::{AutoSource, ExtractedText, PdfExtractor, PlainTextSource, TextSource};
pub use pipeline::ContractPipeline;
pub use store::{MetadataFilter, SqliteStore, StoreStats, VectorStore};
pub use types::{PipelineStats, ProcessReport, SearchHit, ValidationReport};
