//! End-to-end tests for the contract pipeline with an in-memory index.

use crate::chunk::{ChunkEngine, ChunkStrategy};
use crate::embeddings::providers::hash::HashProvider;
use crate::embeddings::EmbeddingProvider;
use crate::extract::{ExtractedText, TextSource};
use crate::pipeline::ContractPipeline;
use crate::store::{MetadataFilter, SqliteStore};
use clausal_core::{AppError, AppResult};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

const CONTRACT: &str = "1 Termination\n\
Either party may terminate this agreement with thirty days written notice.\n\
2 Payment Terms\n\
Invoices are payable within thirty days of receipt in euros.\n\
3 Governing Law\n\
This agreement is governed by the laws of Sweden.";

/// Returns fixed text for every path except those containing "broken".
struct FixedSource {
    text: String,
}

impl TextSource for FixedSource {
    fn extract(&self, path: &Path) -> AppResult<ExtractedText> {
        if path.to_string_lossy().contains("broken") {
            return Err(AppError::Extraction("Failed to read PDF: bad xref".to_string()));
        }
        Ok(ExtractedText::from_pages(vec![self.text.clone()]))
    }
}

/// Counts `embed_batch` calls.
#[derive(Debug)]
struct CountingProvider {
    inner: HashProvider,
    calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl EmbeddingProvider for CountingProvider {
    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_batch(texts).await
    }
}

fn pipeline_with(text: &str, calls: Arc<AtomicUsize>) -> ContractPipeline {
    let provider = CountingProvider {
        inner: HashProvider::new("trigram-v1", 384),
        calls,
    };

    ContractPipeline::new(
        Box::new(FixedSource {
            text: text.to_string(),
        }),
        ChunkEngine::default(),
        Arc::new(provider),
        Box::new(SqliteStore::in_memory().unwrap()),
    )
}

fn pipeline() -> ContractPipeline {
    pipeline_with(CONTRACT, Arc::new(AtomicUsize::new(0)))
}

#[tokio::test]
async fn test_process_contract_stores_every_clause() {
    let pipeline = pipeline();
    let report = pipeline
        .process_contract(Path::new("msa.pdf"), ChunkStrategy::Clauses)
        .await;

    assert!(report.success, "unexpected error: {:?}", report.error);
    assert_eq!(report.text_length, CONTRACT.chars().count());
    assert_eq!(report.chunks_created, 3);
    assert_eq!(report.embeddings_generated, 3);
    assert_eq!(report.chunk_statistics.unwrap().total_chunks, 3);

    let index = report.index_statistics.unwrap();
    assert_eq!(index.total_vectors, 3);
    assert_eq!(index.dimension, Some(384));
}

#[tokio::test]
async fn test_search_finds_matching_clause() {
    let pipeline = pipeline();
    pipeline
        .process_contract(Path::new("msa.pdf"), ChunkStrategy::Clauses)
        .await;

    let hits = pipeline
        .search("terminate the agreement with notice", Some(1), None)
        .await
        .unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].heading, "1 Termination");
    assert!(hits[0].content.starts_with("1 Termination\nEither party"));
    assert_eq!(hits[0].source.as_deref(), Some("msa.pdf"));
    assert_eq!(hits[0].metadata["start_position"], 0);
    assert_eq!(hits[0].metadata["chunk_id"], "0_88");
}

#[tokio::test]
async fn test_search_respects_filter_and_default_top_k() {
    let pipeline = pipeline().with_default_top_k(2);
    pipeline
        .process_contract(Path::new("msa.pdf"), ChunkStrategy::Clauses)
        .await;

    let hits = pipeline.search("termination", None, None).await.unwrap();
    assert_eq!(hits.len(), 2);

    let filter = MetadataFilter::parse(&["heading=3 Governing Law"]).unwrap();
    let hits = pipeline
        .search("termination", Some(5), Some(&filter))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].heading, "3 Governing Law");
}

#[tokio::test]
async fn test_vector_ids_are_fresh_per_run() {
    let pipeline = pipeline();
    pipeline
        .process_contract(Path::new("msa.pdf"), ChunkStrategy::Clauses)
        .await;
    pipeline
        .process_contract(Path::new("msa.pdf"), ChunkStrategy::Clauses)
        .await;

    assert_eq!(pipeline.statistics().unwrap().index.total_vectors, 6);
}

#[tokio::test]
async fn test_embedding_runs_in_batches() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pipeline = pipeline_with(CONTRACT, calls.clone()).with_batch_size(2);

    let report = pipeline
        .process_contract(Path::new("msa.pdf"), ChunkStrategy::Clauses)
        .await;

    assert!(report.success);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_extraction_becomes_report() {
    let pipeline = pipeline();
    let report = pipeline
        .process_contract(Path::new("broken.pdf"), ChunkStrategy::Clauses)
        .await;

    assert!(!report.success);
    assert!(report.error.unwrap().contains("bad xref"));
    assert_eq!(pipeline.statistics().unwrap().index.total_vectors, 0);
}

#[tokio::test]
async fn test_batch_process_continues_past_failures() {
    let pipeline = pipeline();
    let paths = vec![PathBuf::from("broken.pdf"), PathBuf::from("msa.pdf")];

    let reports = pipeline
        .batch_process(&paths, ChunkStrategy::Paragraphs)
        .await;

    assert_eq!(reports.len(), 2);
    assert!(!reports[0].success);
    assert!(reports[1].success);
    assert_eq!(reports[1].strategy, ChunkStrategy::Paragraphs);
}

#[tokio::test]
async fn test_empty_text_processes_to_nothing() {
    let pipeline = pipeline_with("   \n\n  ", Arc::new(AtomicUsize::new(0)));
    let report = pipeline
        .process_contract(Path::new("blank.pdf"), ChunkStrategy::Sentences)
        .await;

    assert!(report.success);
    assert_eq!(report.chunks_created, 0);
    assert_eq!(report.index_statistics.unwrap().total_vectors, 0);
}

#[tokio::test]
async fn test_statistics_and_clear() {
    let pipeline = pipeline();
    pipeline
        .process_contract(Path::new("msa.pdf"), ChunkStrategy::Sentences)
        .await;

    let stats = pipeline.statistics().unwrap();
    assert!(stats.index.total_vectors > 0);
    assert_eq!(stats.embedding_provider, "hash");
    assert_eq!(stats.embedding_model, "trigram-v1");
    assert_eq!(stats.embedding_dimension, 384);

    pipeline.clear().unwrap();
    assert_eq!(pipeline.statistics().unwrap().index.total_vectors, 0);
}

#[test]
fn test_validate_pdf() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline();

    let missing = pipeline.validate_pdf(&dir.path().join("missing.pdf"));
    assert!(!missing.valid);
    assert_eq!(missing.error.as_deref(), Some("File does not exist"));

    let txt = dir.path().join("notes.txt");
    std::fs::write(&txt, CONTRACT).unwrap();
    let not_pdf = pipeline.validate_pdf(&txt);
    assert_eq!(not_pdf.error.as_deref(), Some("File is not a PDF"));

    let pdf = dir.path().join("MSA.PDF");
    std::fs::write(&pdf, b"%PDF-1.4").unwrap();
    let valid = pipeline.validate_pdf(&pdf);
    assert!(valid.valid);
    assert_eq!(valid.text_length, Some(CONTRACT.chars().count()));
    assert_eq!(valid.page_count, Some(1));
}

#[test]
fn test_validate_pdf_rejects_blank_text() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("scan.pdf");
    std::fs::write(&pdf, b"%PDF-1.4").unwrap();

    let pipeline = pipeline_with("  \n ", Arc::new(AtomicUsize::new(0)));
    let report = pipeline.validate_pdf(&pdf);
    assert!(!report.valid);
    assert_eq!(
        report.error.as_deref(),
        Some("PDF appears to be empty or unreadable")
    );
}
