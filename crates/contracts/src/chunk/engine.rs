//! Chunking engine: strategy dispatch and recursive re-splitting.

use super::{
    boundary::BoundaryDetector,
    offsets::{trimmed_range, CharOffsets},
    sentences::split_sentences,
    stats::ChunkStatistics,
    Segment,
};
use clausal_core::{AppError, AppResult, ChunkingConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Segmentation strategy selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStrategy {
    Clauses,
    Sentences,
    Paragraphs,
}

impl ChunkStrategy {
    pub const ALL: [ChunkStrategy; 3] = [Self::Clauses, Self::Sentences, Self::Paragraphs];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clauses => "clauses",
            Self::Sentences => "sentences",
            Self::Paragraphs => "paragraphs",
        }
    }
}

impl FromStr for ChunkStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clauses" => Ok(Self::Clauses),
            "sentences" => Ok(Self::Sentences),
            "paragraphs" => Ok(Self::Paragraphs),
            _ => Err(AppError::InvalidStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for ChunkStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits contract text into ordered, size-bounded segments.
///
/// Holds only read-only state (the compiled clause pattern and size bounds),
/// so one engine can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct ChunkEngine {
    detector: BoundaryDetector,
    clause_max_chars: usize,
    sentence_max_chars: usize,
    paragraph_max_chars: usize,
    default_strategy: ChunkStrategy,
}

impl ChunkEngine {
    /// Build an engine from configuration, compiling the clause pattern.
    pub fn new(config: &ChunkingConfig) -> AppResult<Self> {
        Ok(Self {
            detector: BoundaryDetector::new(&config.clause_pattern)?,
            clause_max_chars: config.clause_max_chars,
            sentence_max_chars: config.sentence_max_chars,
            paragraph_max_chars: config.paragraph_max_chars,
            default_strategy: config.default_strategy.parse()?,
        })
    }

    /// Default bounds around a custom detector.
    pub fn with_detector(detector: BoundaryDetector) -> Self {
        Self {
            detector,
            ..Self::default()
        }
    }

    pub fn detector(&self) -> &BoundaryDetector {
        &self.detector
    }

    pub fn default_strategy(&self) -> ChunkStrategy {
        self.default_strategy
    }

    /// Configured size bound for `strategy`.
    pub fn max_chars(&self, strategy: ChunkStrategy) -> usize {
        match strategy {
            ChunkStrategy::Clauses => self.clause_max_chars,
            ChunkStrategy::Sentences => self.sentence_max_chars,
            ChunkStrategy::Paragraphs => self.paragraph_max_chars,
        }
    }

    /// Chunk with `strategy` at its configured size bound.
    pub fn chunk(&self, text: &str, strategy: ChunkStrategy) -> Vec<Segment> {
        self.chunk_with_limit(text, strategy, self.max_chars(strategy))
    }

    /// Chunk with `strategy` at an explicit size bound.
    pub fn chunk_with_limit(
        &self,
        text: &str,
        strategy: ChunkStrategy,
        max_chunk_size: usize,
    ) -> Vec<Segment> {
        match strategy {
            ChunkStrategy::Clauses => self.chunk_by_clauses(text, max_chunk_size),
            ChunkStrategy::Sentences => self.chunk_by_sentences(text, max_chunk_size),
            ChunkStrategy::Paragraphs => self.chunk_by_paragraphs(text, max_chunk_size),
        }
    }

    /// Chunk with a strategy given by name; an unknown name is an error.
    pub fn chunk_named(&self, text: &str, strategy: &str) -> AppResult<Vec<Segment>> {
        let strategy: ChunkStrategy = strategy.parse()?;
        Ok(self.chunk(text, strategy))
    }

    /// Split at clause headings.
    ///
    /// Each clause runs from its heading to the next heading (or end of text).
    /// Clauses longer than `max_chunk_size` are re-split by sentences and
    /// labelled `"{heading} - Part {k}"`. Without any heading the whole text
    /// is chunked by sentences at the same bound.
    pub fn chunk_by_clauses(&self, text: &str, max_chunk_size: usize) -> Vec<Segment> {
        tracing::info!("Chunking {} bytes into clauses", text.len());

        let boundaries = self.detector.detect(text);
        if boundaries.is_empty() {
            tracing::warn!(
                "No clause patterns found in text, falling back to sentence-based chunking"
            );
            return self.chunk_by_sentences(text, max_chunk_size);
        }

        let mut offsets = CharOffsets::new(text);
        let mut segments = Vec::with_capacity(boundaries.len());

        for (i, boundary) in boundaries.iter().enumerate() {
            let span_end = boundaries.get(i + 1).map_or(text.len(), |next| next.start);
            let (start, end) = trimmed_range(text, boundary.start, span_end);
            if start == end {
                continue;
            }

            let content = &text[start..end];
            let start_position = offsets.at(start);
            let end_position = offsets.at(end);
            let char_len = end_position - start_position;

            if char_len > max_chunk_size {
                tracing::info!(
                    "Clause '{}' is too large ({} chars), splitting further",
                    preview(&boundary.heading),
                    char_len
                );
                let parts = split_sentences(content, max_chunk_size, start_position);
                segments.extend(label_parts(parts, &boundary.heading));
            } else {
                segments.push(Segment::new(
                    boundary.heading.clone(),
                    content,
                    start_position,
                    end_position,
                ));
            }

            tracing::debug!("Created chunk: {}", preview(&boundary.heading));
        }

        tracing::info!("Created {} chunks from text", segments.len());
        segments
    }

    /// Greedy sentence merge up to `max_chunk_size` characters.
    pub fn chunk_by_sentences(&self, text: &str, max_chunk_size: usize) -> Vec<Segment> {
        tracing::info!("Chunking {} bytes by sentences", text.len());

        let segments = split_sentences(text, max_chunk_size, 0);

        tracing::info!("Created {} sentence-based chunks", segments.len());
        segments
    }

    /// Split at blank lines (`"\n\n"`).
    ///
    /// Paragraph ordinals count every paragraph, blank ones included, so
    /// `"Paragraph 3"` is always the third `"\n\n"`-separated piece.
    /// Paragraphs longer than `max_chunk_size` are re-split by sentences and
    /// labelled `"Paragraph {n} - Part {k}"`.
    pub fn chunk_by_paragraphs(&self, text: &str, max_chunk_size: usize) -> Vec<Segment> {
        tracing::info!("Chunking {} bytes by paragraphs", text.len());

        let mut offsets = CharOffsets::new(text);
        let mut segments = Vec::new();
        let mut cursor = 0;

        for (i, paragraph) in text.split("\n\n").enumerate() {
            let ordinal = i + 1;
            let (start, end) = trimmed_range(text, cursor, cursor + paragraph.len());
            cursor += paragraph.len() + 2;

            if start == end {
                continue;
            }

            let content = &text[start..end];
            let start_position = offsets.at(start);
            let end_position = offsets.at(end);
            let char_len = end_position - start_position;

            if char_len > max_chunk_size {
                tracing::info!(
                    "Paragraph {} is too large ({} chars), splitting into sentences",
                    ordinal,
                    char_len
                );
                let parts = split_sentences(content, max_chunk_size, start_position);
                segments.extend(label_parts(parts, &format!("Paragraph {}", ordinal)));
            } else {
                segments.push(Segment::new(
                    format!("Paragraph {}", ordinal),
                    content,
                    start_position,
                    end_position,
                ));
            }
        }

        tracing::info!("Created {} paragraph-based chunks", segments.len());
        segments
    }

    /// Length statistics over any segment sequence.
    pub fn statistics(&self, segments: &[Segment]) -> ChunkStatistics {
        ChunkStatistics::from_segments(segments)
    }
}

impl Default for ChunkEngine {
    fn default() -> Self {
        let config = ChunkingConfig::default();
        Self {
            detector: BoundaryDetector::default(),
            clause_max_chars: config.clause_max_chars,
            sentence_max_chars: config.sentence_max_chars,
            paragraph_max_chars: config.paragraph_max_chars,
            default_strategy: ChunkStrategy::Clauses,
        }
    }
}

fn label_parts<'a>(parts: Vec<Segment>, heading: &'a str) -> impl Iterator<Item = Segment> + 'a {
    parts
        .into_iter()
        .enumerate()
        .map(move |(k, part)| part.relabel(format!("{} - Part {}", heading, k + 1)))
}

/// First 50 characters of a heading, for log lines.
fn preview(heading: &str) -> String {
    heading.chars().take(50).collect()
}
