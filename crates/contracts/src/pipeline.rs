//! End-to-end contract processing: extract, chunk, embed, store, search.

use crate::chunk::{ChunkEngine, ChunkStatistics, ChunkStrategy, Segment};
use crate::embeddings::{create_provider, validate_embedding, EmbeddingProvider};
use crate::extract::{is_pdf, PdfExtractor, TextSource};
use crate::store::{MetadataFilter, SqliteStore, StoreStats, VectorRecord, VectorStore};
use crate::types::{PipelineStats, ProcessReport, SearchHit, ValidationReport};
use clausal_core::{AppConfig, AppError, AppResult};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

const DEFAULT_BATCH_SIZE: usize = 100;
const DEFAULT_TOP_K: usize = 3;

/// What a successful run produced, before it is folded into a report.
struct ProcessOutcome {
    text_length: usize,
    chunks_created: usize,
    embeddings_generated: usize,
    chunk_statistics: ChunkStatistics,
    index_statistics: StoreStats,
}

pub struct ContractPipeline {
    source: Box<dyn TextSource>,
    engine: ChunkEngine,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Box<dyn VectorStore>,
    batch_size: usize,
    default_top_k: usize,
}

impl ContractPipeline {
    pub fn new(
        source: Box<dyn TextSource>,
        engine: ChunkEngine,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Box<dyn VectorStore>,
    ) -> Self {
        Self {
            source,
            engine,
            embedder,
            store,
            batch_size: DEFAULT_BATCH_SIZE,
            default_top_k: DEFAULT_TOP_K,
        }
    }

    /// Wire up the PDF extractor, configured engine and provider, and the
    /// on-disk SQLite index under the workspace.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;
        config.ensure_clausal_dir()?;

        let engine = ChunkEngine::new(&config.chunking)?;
        let embedder = create_provider(&config.embedding)?;
        let store = SqliteStore::open(&config.index_path())?;

        tracing::info!(
            "Contract pipeline ready (provider: {}, model: {}, index: {:?})",
            embedder.provider_name(),
            embedder.model_name(),
            config.index_path()
        );

        Ok(Self::new(Box::new(PdfExtractor::new()), engine, embedder, Box::new(store))
            .with_batch_size(config.embedding.batch_size)
            .with_default_top_k(config.search.default_top_k))
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_default_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k;
        self
    }

    pub fn engine(&self) -> &ChunkEngine {
        &self.engine
    }

    /// Run one contract through the whole pipeline.
    ///
    /// Failures at any step are reported in the returned value rather than
    /// propagated.
    pub async fn process_contract(&self, path: &Path, strategy: ChunkStrategy) -> ProcessReport {
        tracing::info!("Processing contract: {:?}", path);
        let start = Instant::now();

        match self.run(path, strategy).await {
            Ok(outcome) => {
                tracing::info!(
                    "Processed {:?}: {} chunks in {:.2}s",
                    path,
                    outcome.chunks_created,
                    start.elapsed().as_secs_f64()
                );

                ProcessReport {
                    success: true,
                    path: path.to_path_buf(),
                    strategy,
                    text_length: outcome.text_length,
                    chunks_created: outcome.chunks_created,
                    embeddings_generated: outcome.embeddings_generated,
                    chunk_statistics: Some(outcome.chunk_statistics),
                    index_statistics: Some(outcome.index_statistics),
                    error: None,
                }
            }
            Err(e) => {
                tracing::error!("Error processing contract {:?}: {}", path, e);
                ProcessReport::failed(path.to_path_buf(), strategy, e.to_string())
            }
        }
    }

    async fn run(&self, path: &Path, strategy: ChunkStrategy) -> AppResult<ProcessOutcome> {
        let extracted = self.source.extract(path)?;
        let text_length = extracted.text.chars().count();
        tracing::info!("Extracted {} characters", text_length);

        let segments = self.engine.chunk(&extracted.text, strategy);
        let chunk_statistics = self.engine.statistics(&segments);
        tracing::info!(
            "Created {} chunks using {} strategy",
            segments.len(),
            strategy
        );

        let embeddings = self.embed_segments(&segments).await?;
        tracing::info!("Generated {} embeddings", embeddings.len());

        let source_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string());
        let records: Vec<VectorRecord> = segments
            .iter()
            .zip(embeddings)
            .map(|(segment, values)| VectorRecord {
                id: uuid::Uuid::new_v4().to_string(),
                values,
                metadata: segment_metadata(segment, source_name.as_deref()),
            })
            .collect();

        let embeddings_generated = records.len();
        self.store.upsert(&records)?;

        Ok(ProcessOutcome {
            text_length,
            chunks_created: segments.len(),
            embeddings_generated,
            chunk_statistics,
            index_statistics: self.store.stats()?,
        })
    }

    async fn embed_segments(&self, segments: &[Segment]) -> AppResult<Vec<Vec<f32>>> {
        let contents: Vec<String> = segments.iter().map(|s| s.content.clone()).collect();
        let dimensions = self.embedder.dimensions();
        let mut embeddings = Vec::with_capacity(contents.len());

        for (batch_index, batch) in contents.chunks(self.batch_size).enumerate() {
            let batch_embeddings = self.embedder.embed_batch(batch).await?;

            if batch_embeddings.len() != batch.len() {
                return Err(AppError::Embedding(format!(
                    "Provider returned {} embeddings for {} texts",
                    batch_embeddings.len(),
                    batch.len()
                )));
            }
            if !batch_embeddings
                .iter()
                .all(|e| validate_embedding(e, dimensions))
            {
                return Err(AppError::Embedding(format!(
                    "Provider returned an invalid embedding (expected {} finite values)",
                    dimensions
                )));
            }

            tracing::debug!("Embedded batch {} ({} texts)", batch_index + 1, batch.len());
            embeddings.extend(batch_embeddings);
        }

        Ok(embeddings)
    }

    /// Process contracts one after another; one failure does not stop the rest.
    pub async fn batch_process(
        &self,
        paths: &[PathBuf],
        strategy: ChunkStrategy,
    ) -> Vec<ProcessReport> {
        tracing::info!("Batch processing {} contracts", paths.len());

        let mut reports = Vec::with_capacity(paths.len());
        for (i, path) in paths.iter().enumerate() {
            tracing::info!("Processing contract {}/{}: {:?}", i + 1, paths.len(), path);
            let report = self.process_contract(path, strategy).await;

            if !report.success {
                tracing::warn!(
                    "Failed to process contract {}: {}",
                    i + 1,
                    report.error.as_deref().unwrap_or("Unknown error")
                );
            }
            reports.push(report);
        }

        let successful = reports.iter().filter(|r| r.success).count();
        tracing::info!(
            "Batch processing complete: {}/{} contracts processed successfully",
            successful,
            paths.len()
        );

        reports
    }

    /// Natural-language search over stored segments.
    pub async fn search(
        &self,
        query: &str,
        top_k: Option<usize>,
        filter: Option<&MetadataFilter>,
    ) -> AppResult<Vec<SearchHit>> {
        let top_k = top_k.unwrap_or(self.default_top_k);
        tracing::info!("Searching contracts (top-{}): {}", top_k, query);

        let query_embedding = self.embedder.embed(query).await?;
        let filter = filter.filter(|f| !f.is_empty());
        let matches = self.store.query(&query_embedding, top_k, filter)?;

        tracing::info!("Search returned {} results", matches.len());
        Ok(matches.into_iter().map(SearchHit::from).collect())
    }

    pub fn statistics(&self) -> AppResult<PipelineStats> {
        Ok(PipelineStats {
            index: self.store.stats()?,
            embedding_provider: self.embedder.provider_name().to_string(),
            embedding_model: self.embedder.model_name().to_string(),
            embedding_dimension: self.embedder.dimensions(),
        })
    }

    /// Remove every stored vector.
    pub fn clear(&self) -> AppResult<()> {
        tracing::info!("Clearing all contract data from index");
        self.store.delete_all()
    }

    /// Check that `path` is a readable, non-empty PDF.
    pub fn validate_pdf(&self, path: &Path) -> ValidationReport {
        if !path.exists() {
            return ValidationReport::invalid("File does not exist");
        }

        if !is_pdf(path) {
            return ValidationReport::invalid("File is not a PDF");
        }

        match self.source.extract(path) {
            Ok(extracted) if extracted.text.trim().is_empty() => {
                ValidationReport::invalid("PDF appears to be empty or unreadable")
            }
            Ok(extracted) => ValidationReport {
                valid: true,
                error: None,
                text_length: Some(extracted.text.chars().count()),
                page_count: Some(extracted.page_count),
            },
            Err(e) => ValidationReport::invalid(e.to_string()),
        }
    }
}

/// Segment metadata plus the originating file name.
fn segment_metadata(segment: &Segment, source: Option<&str>) -> Value {
    let mut metadata = segment.metadata();
    if let (Value::Object(map), Some(source)) = (&mut metadata, source) {
        map.insert("source".to_string(), Value::String(source.to_string()));
    }
    metadata
}
