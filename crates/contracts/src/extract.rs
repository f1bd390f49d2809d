//! Text extraction from contract documents.

use clausal_core::{AppError, AppResult};
use std::path::Path;

/// Text pulled out of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// Non-blank pages joined with `"\n"`
    pub text: String,

    /// Number of pages in the document, blank ones included
    pub page_count: usize,

    /// Per-page text, blank ones included
    pub pages: Vec<String>,
}

impl ExtractedText {
    /// Assemble from per-page text.
    pub fn from_pages(pages: Vec<String>) -> Self {
        let text = pages
            .iter()
            .filter(|page| !page.trim().is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            text,
            page_count: pages.len(),
            pages,
        }
    }

    /// Text of page `index` (0-based).
    pub fn page(&self, index: usize) -> AppResult<&str> {
        self.pages.get(index).map(String::as_str).ok_or_else(|| {
            AppError::Extraction(format!(
                "Page {} does not exist. Document has {} pages.",
                index, self.page_count
            ))
        })
    }
}

/// Source of plain text for a document path.
pub trait TextSource: Send + Sync {
    fn extract(&self, path: &Path) -> AppResult<ExtractedText>;
}

/// Extracts text from PDF files with `pdf-extract`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract from in-memory PDF bytes.
    pub fn extract_bytes(&self, bytes: &[u8]) -> AppResult<ExtractedText> {
        let raw = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| AppError::Extraction(format!("Failed to read PDF: {}", e)))?;

        let extracted = ExtractedText::from_pages(split_pages(&raw));
        if extracted.page_count == 0 {
            return Err(AppError::Extraction("PDF appears to be empty".to_string()));
        }

        Ok(extracted)
    }
}

impl TextSource for PdfExtractor {
    fn extract(&self, path: &Path) -> AppResult<ExtractedText> {
        tracing::info!("Extracting text from PDF: {:?}", path);

        if !path.exists() {
            tracing::error!("PDF file not found: {:?}", path);
            return Err(AppError::NotFound(format!("PDF file not found: {:?}", path)));
        }

        let bytes = std::fs::read(path)?;
        let extracted = self.extract_bytes(&bytes).map_err(|e| {
            tracing::error!("Error extracting text from PDF {:?}: {}", path, e);
            e
        })?;

        tracing::info!(
            "Successfully extracted {} characters from {} pages",
            extracted.text.chars().count(),
            extracted.page_count
        );

        Ok(extracted)
    }
}

/// Reads UTF-8 text files as single-page documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextSource;

impl TextSource for PlainTextSource {
    fn extract(&self, path: &Path) -> AppResult<ExtractedText> {
        if !path.exists() {
            return Err(AppError::NotFound(format!("File not found: {:?}", path)));
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::Extraction(format!("Failed to read {:?}: {}", path, e)))?;

        Ok(ExtractedText::from_pages(vec![text]))
    }
}

/// Picks the PDF extractor for `.pdf` paths and plain text otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoSource;

impl TextSource for AutoSource {
    fn extract(&self, path: &Path) -> AppResult<ExtractedText> {
        if is_pdf(path) {
            PdfExtractor.extract(path)
        } else {
            PlainTextSource.extract(path)
        }
    }
}

/// Whether `path` has a `.pdf` extension (any case).
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// pdf-extract separates pages with form feeds; a trailing one leaves an
/// empty final piece.
fn split_pages(raw: &str) -> Vec<String> {
    let mut pages: Vec<String> = raw
        .split('\x0C')
        .map(|page| page.trim_end_matches('\n').to_string())
        .collect();

    while pages.last().is_some_and(|page| page.trim().is_empty()) {
        pages.pop();
    }

    pages
}
