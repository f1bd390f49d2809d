//! Byte/character offset bookkeeping shared by the strategies.

/// Converts byte offsets of one text into character offsets.
///
/// Lookups are expected in non-decreasing order; each call then only scans
/// the bytes since the previous one. A backwards lookup rescans from the start.
pub(crate) struct CharOffsets<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharOffsets<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            chars: 0,
        }
    }

    /// Character offset of `byte`, which must lie on a char boundary.
    pub(crate) fn at(&mut self, byte: usize) -> usize {
        if byte < self.byte {
            self.byte = 0;
            self.chars = 0;
        }
        self.chars += self.text[self.byte..byte].chars().count();
        self.byte = byte;
        self.chars
    }
}

/// Byte range of `text[start..end]` without leading and trailing whitespace.
///
/// An all-whitespace span collapses to the empty range `(end, end)`.
pub(crate) fn trimmed_range(text: &str, start: usize, end: usize) -> (usize, usize) {
    let span = &text[start..end];
    let lead = span.len() - span.trim_start().len();
    let trimmed = span.trim().len();
    (start + lead, start + lead + trimmed)
}
