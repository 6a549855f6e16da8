// WHY: Position resolution only ever scans forward, so repeated sentence text
// resolves to the right occurrence and the total cost stays linear

use std::ops::Range;

use tracing::warn;

use crate::error::HighlightError;
use crate::segmenter::SentenceUnit;

/// Byte cursor into a document that also tracks the matching character offset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ForwardCursor {
    byte: usize,
    chars: usize,
}

impl ForwardCursor {
    /// Advance to `byte`, counting the characters passed over
    fn advance_to(&mut self, document: &str, byte: usize) {
        debug_assert!(byte >= self.byte);
        self.chars += document[self.byte..byte].chars().count();
        self.byte = byte;
    }
}

/// Spans found by a resolution pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Character ranges, strictly increasing and non-overlapping
    pub spans: Vec<Range<usize>>,
    /// Indexes of inputs that could not be placed
    pub misses: Vec<usize>,
}

impl Resolution {
    pub fn is_complete(&self) -> bool {
        self.misses.is_empty()
    }
}

struct Resolver<'d> {
    document: &'d str,
    cursor: ForwardCursor,
    resolution: Resolution,
}

impl<'d> Resolver<'d> {
    fn new(document: &'d str) -> Self {
        Self {
            document,
            cursor: ForwardCursor::default(),
            resolution: Resolution::default(),
        }
    }

    /// Place `fragment` at the first occurrence at or after the cursor
    fn search(&mut self, index: usize, fragment: &str) {
        if fragment.is_empty() || self.cursor.byte > self.document.len() {
            self.miss(index);
            return;
        }
        match self.document[self.cursor.byte..].find(fragment) {
            Some(relative) => {
                let start_byte = self.cursor.byte + relative;
                self.accept(start_byte, start_byte + fragment.len());
            }
            None => self.miss(index),
        }
    }

    fn accept(&mut self, start_byte: usize, end_byte: usize) {
        self.cursor.advance_to(self.document, start_byte);
        let from = self.cursor.chars;
        self.cursor.advance_to(self.document, end_byte);
        self.resolution.spans.push(from..self.cursor.chars);
    }

    fn miss(&mut self, index: usize) {
        let err = HighlightError::PositionResolutionMiss {
            index,
            cursor: self.cursor.chars,
        };
        warn!(error = %err, "Skipping unresolved sentence");
        self.resolution.misses.push(index);
    }
}

/// Resolve sentence strings against `document` by forward-only search.
///
/// Each fragment is placed at its first occurrence at or after the end of the
/// previously placed one. Fragments that cannot be found are skipped.
pub fn resolve_spans<'s, I>(document: &str, fragments: I) -> Resolution
where
    I: IntoIterator<Item = &'s str>,
{
    let mut resolver = Resolver::new(document);
    for (index, fragment) in fragments.into_iter().enumerate() {
        resolver.search(index, fragment);
    }
    resolver.resolution
}

/// Resolve segmenter units, trusting their byte ranges when they still match the
/// document at or after the cursor and falling back to a forward search otherwise
pub fn resolve_units(document: &str, units: &[SentenceUnit<'_>]) -> Resolution {
    let mut resolver = Resolver::new(document);
    for (index, unit) in units.iter().enumerate() {
        let range = unit.byte_range.clone();
        let trusted = range.start >= resolver.cursor.byte
            && range.start < range.end
            && document.get(range.clone()) == Some(unit.text);
        if trusted {
            resolver.accept(range.start, range.end);
        } else {
            resolver.search(index, unit.text);
        }
    }
    resolver.resolution
}
