// WHY: Word-count threshold kept separate from segmentation so the predicate
// can be applied to units from any source

use crate::segmenter::{Segmenter, SentenceUnit};

/// Predicate selecting units strictly longer than `max_words`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdFilter {
    max_words: usize,
}

impl ThresholdFilter {
    pub fn new(max_words: usize) -> Self {
        Self { max_words }
    }

    pub fn max_words(&self) -> usize {
        self.max_words
    }

    /// A unit with exactly `max_words` words does not qualify
    pub fn exceeds(&self, unit: &SentenceUnit<'_>) -> bool {
        unit.word_count > self.max_words
    }

    pub fn apply<'a>(&self, units: Vec<SentenceUnit<'a>>) -> Vec<SentenceUnit<'a>> {
        units.into_iter().filter(|unit| self.exceeds(unit)).collect()
    }
}

/// Segment `text` and keep only the units longer than `max_words`
pub fn long_sentences(text: &str, max_words: usize) -> Vec<SentenceUnit<'_>> {
    long_sentences_with(&Segmenter::default(), text, max_words)
}

pub fn long_sentences_with<'a>(
    segmenter: &Segmenter,
    text: &'a str,
    max_words: usize,
) -> Vec<SentenceUnit<'a>> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    ThresholdFilter::new(max_words).apply(segmenter.segment(text))
}
