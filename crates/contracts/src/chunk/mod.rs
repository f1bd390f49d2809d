//! Clause-aware chunking engine.
//!
//! Converts raw contract text into an ordered sequence of bounded,
//! position-tracked [`Segment`]s:
//! - `clauses`: split at numbered clause headings, re-splitting oversized clauses
//! - `sentences`: greedy merge of punctuation-delimited sentences up to a bound
//! - `paragraphs`: split at blank lines, re-splitting oversized paragraphs
//!
//! Positions are character offsets into the text handed to the engine call.

mod boundary;
mod engine;
mod offsets;
mod sentences;
mod stats;

pub use boundary::{Boundary, BoundaryDetector};
pub use engine::{ChunkEngine, ChunkStrategy};
pub use stats::ChunkStatistics;

use serde::{Deserialize, Serialize};

/// One chunk of source text destined for embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Clause heading, or a synthetic label like "Chunk 3" / "Paragraph 2 - Part 1"
    pub heading: String,

    /// Trimmed, non-empty text
    pub content: String,

    /// Character offset where the content starts
    pub start_position: usize,

    /// Character offset one past the content's last character
    pub end_position: usize,

    /// Identifier, `"{start}_{end}"` unless supplied by the caller
    pub id: String,
}

impl Segment {
    /// Create a segment whose id is derived from its position.
    pub fn new(
        heading: impl Into<String>,
        content: impl Into<String>,
        start_position: usize,
        end_position: usize,
    ) -> Self {
        Self {
            heading: heading.into(),
            content: content.into(),
            start_position,
            end_position,
            id: format!("{}_{}", start_position, end_position),
        }
    }

    /// Create a segment with a caller-supplied id, kept verbatim.
    pub fn with_id(
        id: impl Into<String>,
        heading: impl Into<String>,
        content: impl Into<String>,
        start_position: usize,
        end_position: usize,
    ) -> Self {
        Self {
            id: id.into(),
            ..Self::new(heading, content, start_position, end_position)
        }
    }

    /// Replace the heading, keeping everything else.
    pub fn relabel(self, heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            ..self
        }
    }

    /// Content length in characters.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Metadata stored alongside the segment's vector.
    pub fn metadata(&self) -> serde_json::Value {
        serde_json::json!({
            "heading": self.heading,
            "content": self.content,
            "chunk_id": self.id,
            "start_position": self.start_position,
            "end_position": self.end_position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_id_from_positions() {
        let segment = Segment::new("1 Scope", "1 Scope\nText.", 0, 13);
        assert_eq!(segment.id, "0_13");
    }

    #[test]
    fn test_caller_id_kept_verbatim() {
        let segment = Segment::with_id("custom/42", "h", "c", 5, 6);
        assert_eq!(segment.id, "custom/42");
        assert_eq!(segment.start_position, 5);
    }

    #[test]
    fn test_relabel_keeps_id_and_positions() {
        let segment = Segment::new("Chunk 1", "text", 10, 14).relabel("4 Fees - Part 1");
        assert_eq!(segment.heading, "4 Fees - Part 1");
        assert_eq!(segment.id, "10_14");
        assert_eq!(segment.content, "text");
    }

    #[test]
    fn test_metadata_fields() {
        let segment = Segment::new("2 Term", "2 Term\nOne year", 3, 18);
        let metadata = segment.metadata();
        assert_eq!(metadata["heading"], "2 Term");
        assert_eq!(metadata["chunk_id"], "3_18");
        assert_eq!(metadata["start_position"], 3);
        assert_eq!(metadata["end_position"], 18);
    }

    #[test]
    fn test_char_len_counts_characters() {
        let segment = Segment::new("h", "café", 0, 4);
        assert_eq!(segment.char_len(), 4);
    }
}
