//! Size-bounded sentence splitting.
//!
//! Sentences are whatever lies between runs of `.`, `!` or `?`. The
//! terminators themselves are dropped, fragments are trimmed, and fragments
//! are merged greedily (joined by one space) until the next one would push
//! the chunk past the size bound. A fragment longer than the bound on its own
//! becomes its own oversized chunk; there is no sub-sentence splitting.

use super::offsets::{trimmed_range, CharOffsets};
use super::Segment;
use once_cell::sync::Lazy;
use regex::Regex;

static SENTENCE_TERMINATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("Invalid sentence terminator pattern"));

/// A trimmed sentence fragment with its character span in the input.
#[derive(Debug)]
struct Fragment<'a> {
    text: &'a str,
    start: usize,
    end: usize,
}

impl Fragment<'_> {
    fn char_len(&self) -> usize {
        self.end - self.start
    }
}

/// Chunk under construction.
struct Pending {
    content: String,
    char_len: usize,
    start: usize,
    end: usize,
}

impl Pending {
    fn start(fragment: &Fragment<'_>) -> Self {
        Self {
            content: fragment.text.to_string(),
            char_len: fragment.char_len(),
            start: fragment.start,
            end: fragment.end,
        }
    }

    /// Whether `fragment` plus its joining space stays within `max_chars`.
    fn fits(&self, fragment: &Fragment<'_>, max_chars: usize) -> bool {
        self.char_len + 1 + fragment.char_len() <= max_chars
    }

    fn extend(mut self, fragment: &Fragment<'_>) -> Self {
        self.content.push(' ');
        self.content.push_str(fragment.text);
        self.char_len += 1 + fragment.char_len();
        self.end = fragment.end;
        self
    }

    fn finish(self, ordinal: usize) -> Segment {
        Segment::new(
            format!("Chunk {}", ordinal),
            self.content,
            self.start,
            self.end,
        )
    }
}

/// Split `text` on sentence terminators into trimmed, non-empty fragments.
///
/// Spans are character offsets into `text` shifted by `base`.
fn fragments(text: &str, base: usize) -> Vec<Fragment<'_>> {
    let mut offsets = CharOffsets::new(text);
    let mut out = Vec::new();
    let mut last = 0;

    for terminator in SENTENCE_TERMINATORS.find_iter(text) {
        push_fragment(text, last, terminator.start(), base, &mut offsets, &mut out);
        last = terminator.end();
    }
    push_fragment(text, last, text.len(), base, &mut offsets, &mut out);

    out
}

fn push_fragment<'a>(
    text: &'a str,
    from: usize,
    to: usize,
    base: usize,
    offsets: &mut CharOffsets<'a>,
    out: &mut Vec<Fragment<'a>>,
) {
    let (start, end) = trimmed_range(text, from, to);
    if start == end {
        return;
    }
    out.push(Fragment {
        text: &text[start..end],
        start: base + offsets.at(start),
        end: base + offsets.at(end),
    });
}

/// Merge the sentences of `text` into segments of at most `max_chars`
/// characters, headed `"Chunk 1"`, `"Chunk 2"`, ...
///
/// `base` is the character offset of `text` within the document being
/// chunked, so recursive calls report document positions.
pub(crate) fn split_sentences(text: &str, max_chars: usize, base: usize) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut pending: Option<Pending> = None;

    for fragment in fragments(text, base) {
        pending = Some(match pending.take() {
            None => Pending::start(&fragment),
            Some(current) if current.fits(&fragment, max_chars) => current.extend(&fragment),
            Some(current) => {
                segments.push(current.finish(segments.len() + 1));
                Pending::start(&fragment)
            }
        });
    }

    if let Some(current) = pending {
        segments.push(current.finish(segments.len() + 1));
    }

    tracing::debug!(
        "Sentence splitter created {} chunks from {} bytes (max {} chars)",
        segments.len(),
        text.len(),
        max_chars
    );

    segments
}
