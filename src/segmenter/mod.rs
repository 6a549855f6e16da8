// WHY: Sentence segmentation entry point, kept free of host and settings state
// so the same text always yields the same units

use std::ops::Range;

pub mod scanner;

pub use scanner::ScanState;

/// Configuration for sentence boundary detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryRules {
    /// Characters that end a sentence when followed by whitespace
    pub terminal_punctuation: Vec<char>,
}

impl Default for BoundaryRules {
    fn default() -> Self {
        Self {
            terminal_punctuation: vec!['.', '!', '?'],
        }
    }
}

impl BoundaryRules {
    pub fn is_terminal(&self, ch: char) -> bool {
        self.terminal_punctuation.contains(&ch)
    }
}

/// A trimmed sentence-like run of the document, borrowed from the snapshot it was cut from.
///
/// `start` and `end` are character offsets (Unicode scalar values); `byte_range`
/// addresses the same text for slicing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceUnit<'a> {
    pub index: usize,
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
    pub byte_range: Range<usize>,
    pub word_count: usize,
}

/// Count whitespace-separated words, ignoring empty tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Sentence segmenter over a fixed rule set
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    rules: BoundaryRules,
}

impl Segmenter {
    pub fn new(rules: BoundaryRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &BoundaryRules {
        &self.rules
    }

    /// Partition `text` into trimmed, non-empty units in document order
    pub fn segment<'a>(&self, text: &'a str) -> Vec<SentenceUnit<'a>> {
        scanner::scan(text, &self.rules)
    }
}

/// Segment with the default rules (`.`, `!`, `?`)
pub fn segment(text: &str) -> Vec<SentenceUnit<'_>> {
    Segmenter::default().segment(text)
}
