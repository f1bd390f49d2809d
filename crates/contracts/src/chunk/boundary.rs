//! Clause-heading boundary detection.

use clausal_core::config::DEFAULT_CLAUSE_PATTERN;
use clausal_core::{AppError, AppResult};
use regex::{Regex, RegexBuilder};

/// A detected clause heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    /// Byte offset in the scanned text where the match begins
    pub start: usize,

    /// Matched heading text, trimmed
    pub heading: String,
}

/// Locates clause headings with a pattern compiled once, in multi-line mode,
/// so `^` anchors after every newline.
#[derive(Debug, Clone)]
pub struct BoundaryDetector {
    pattern: Regex,
}

impl BoundaryDetector {
    /// Compile `pattern`; an invalid expression is a configuration error.
    pub fn new(pattern: &str) -> AppResult<Self> {
        let pattern = RegexBuilder::new(pattern)
            .multi_line(true)
            .build()
            .map_err(|e| AppError::Config(format!("Invalid clause pattern: {}", e)))?;

        Ok(Self { pattern })
    }

    /// The source of the compiled pattern.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// All heading matches in `text`, left to right. Empty when nothing matches.
    pub fn detect(&self, text: &str) -> Vec<Boundary> {
        self.pattern
            .find_iter(text)
            .map(|m| Boundary {
                start: m.start(),
                heading: m.as_str().trim().to_string(),
            })
            .collect()
    }
}

impl Default for BoundaryDetector {
    fn default() -> Self {
        Self::new(DEFAULT_CLAUSE_PATTERN).expect("default clause pattern must compile")
    }
}
