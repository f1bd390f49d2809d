//! Aggregate statistics over a chunking result.

use super::Segment;
use serde::{Deserialize, Serialize};

/// Length statistics of a segment sequence, in characters.
///
/// An empty sequence yields all zeros.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkStatistics {
    pub total_chunks: usize,
    pub avg_length: f64,
    pub min_length: usize,
    pub max_length: usize,
    pub total_characters: usize,
}

impl ChunkStatistics {
    pub fn from_segments(segments: &[Segment]) -> Self {
        if segments.is_empty() {
            return Self::default();
        }

        let lengths: Vec<usize> = segments.iter().map(Segment::char_len).collect();
        let total_characters: usize = lengths.iter().sum();

        Self {
            total_chunks: lengths.len(),
            avg_length: total_characters as f64 / lengths.len() as f64,
            min_length: lengths.iter().copied().min().unwrap_or(0),
            max_length: lengths.iter().copied().max().unwrap_or(0),
            total_characters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_zeroed() {
        let stats = ChunkStatistics::from_segments(&[]);
        assert_eq!(stats.total_chunks, 0);
        assert_eq!(stats.avg_length, 0.0);
        assert_eq!(stats.min_length, 0);
        assert_eq!(stats.max_length, 0);
        assert_eq!(stats.total_characters, 0);
    }

    #[test]
    fn test_lengths() {
        let segments = vec![
            Segment::new("a", "1234", 0, 4),
            Segment::new("b", "12", 5, 7),
            Segment::new("c", "123456789", 8, 17),
        ];

        let stats = ChunkStatistics::from_segments(&segments);
        assert_eq!(stats.total_chunks, 3);
        assert_eq!(stats.min_length, 2);
        assert_eq!(stats.max_length, 9);
        assert_eq!(stats.total_characters, 15);
        assert!((stats.avg_length - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_idempotent() {
        let segments = vec![Segment::new("a", "abc", 0, 3), Segment::new("b", "de", 4, 6)];
        assert_eq!(
            ChunkStatistics::from_segments(&segments),
            ChunkStatistics::from_segments(&segments)
        );
    }

    #[test]
    fn test_serializes_named_fields() {
        let json = serde_json::to_value(ChunkStatistics::default()).unwrap();
        assert_eq!(json["total_chunks"], 0);
        assert_eq!(json["avg_length"], 0.0);
    }
}
