//! Highlight annotations and the ordered set that holds them.
//!
//! Offsets are character offsets into the document snapshot the set was computed
//! against. The set is replaced wholesale on every recompute; between recomputes a
//! host substrate may shift ranges through edits with [`AnnotationSet::map_through`],
//! but never adds new ones.

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// How a highlighted range is rendered
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum HighlightStyle {
    #[default]
    Background,
    Underline,
}

impl HighlightStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Underline => "underline",
        }
    }

    /// Mark class the rendering layer attaches to ranges of this style
    pub fn mark_class(&self) -> &'static str {
        match self {
            Self::Background => "long-sentence-highlight",
            Self::Underline => "long-sentence-underline",
        }
    }
}

impl std::str::FromStr for HighlightStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "background" => Ok(Self::Background),
            "underline" => Ok(Self::Underline),
            other => Err(format!("unknown highlight style: {other}")),
        }
    }
}

/// A highlighted half-open range `from..to` in character offsets
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annotation {
    pub from: usize,
    pub to: usize,
    pub style: HighlightStyle,
}

impl Annotation {
    pub fn new(from: usize, to: usize, style: HighlightStyle) -> Self {
        Self { from, to, style }
    }

    pub fn len(&self) -> usize {
        self.to.saturating_sub(self.from)
    }

    pub fn is_empty(&self) -> bool {
        self.from >= self.to
    }
}

/// A single document change in character offsets: `deleted` characters removed at
/// `at`, then `inserted` placed there
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub at: usize,
    pub deleted: usize,
    pub inserted: String,
}

impl TextEdit {
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self { at, deleted: 0, inserted: text.into() }
    }

    pub fn delete(at: usize, len: usize) -> Self {
        Self { at, deleted: len, inserted: String::new() }
    }

    pub fn replace(at: usize, len: usize, text: impl Into<String>) -> Self {
        Self { at, deleted: len, inserted: text.into() }
    }
}

/// Check that `annotations` are non-empty, ordered by `from` and pairwise disjoint
pub fn validate_ordering(annotations: &[Annotation]) -> Result<(), RenderError> {
    for (index, annotation) in annotations.iter().enumerate() {
        if annotation.is_empty() {
            return Err(RenderError::EmptyRange {
                index,
                from: annotation.from,
                to: annotation.to,
            });
        }
        if index > 0 && annotations[index - 1].to > annotation.from {
            return Err(RenderError::Unordered { index });
        }
    }
    Ok(())
}

/// Ordered, non-overlapping annotations over one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationSet {
    annotations: Vec<Annotation>,
    generation: u64,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn as_slice(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    /// Number of replacements applied so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Install `annotations` in place of the current contents.
    ///
    /// Either the whole set is accepted or nothing changes.
    pub fn replace_all(&mut self, annotations: Vec<Annotation>) -> Result<(), RenderError> {
        validate_ordering(&annotations)?;
        self.annotations = annotations;
        self.generation += 1;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.annotations.clear();
        self.generation += 1;
    }

    /// Shift ranges through an edit. Ranges swallowed by a deletion are dropped;
    /// insertions strictly inside a range extend it.
    pub fn map_through(&mut self, edit: &TextEdit) {
        let del_start = edit.at;
        let del_end = edit.at + edit.deleted;

        if edit.deleted > 0 {
            for annotation in &mut self.annotations {
                if annotation.to <= del_start {
                    continue;
                } else if annotation.from >= del_end {
                    annotation.from -= edit.deleted;
                    annotation.to -= edit.deleted;
                } else {
                    // Clamp each end into the surviving text
                    annotation.from = clamp_deleted(annotation.from, del_start, del_end);
                    annotation.to = clamp_deleted(annotation.to, del_start, del_end);
                }
            }
        }

        let inserted = edit.inserted.chars().count();
        if inserted > 0 {
            let pos = edit.at;
            for annotation in &mut self.annotations {
                if annotation.from >= pos {
                    annotation.from += inserted;
                    annotation.to += inserted;
                } else if annotation.to > pos {
                    annotation.to += inserted;
                }
            }
        }

        self.annotations.retain(|annotation| !annotation.is_empty());
    }
}

fn clamp_deleted(offset: usize, del_start: usize, del_end: usize) -> usize {
    if offset <= del_start {
        offset
    } else if offset >= del_end {
        offset - (del_end - del_start)
    } else {
        del_start
    }
}

impl<'a> IntoIterator for &'a AnnotationSet {
    type Item = &'a Annotation;
    type IntoIter = std::slice::Iter<'a, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.annotations.iter()
    }
}
