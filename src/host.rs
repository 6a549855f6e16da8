//! The boundary between the highlighting core and whatever editor embeds it.
//!
//! The core never holds the document or the rendered highlight layer itself; it asks
//! the host for a snapshot, hands back a complete replacement set and reports problems
//! through notices.

use anyhow::Result;
use std::path::PathBuf;
use tracing::debug;

use crate::annotation::{Annotation, AnnotationSet, TextEdit};
use crate::error::RenderError;
use crate::settings::Settings;

/// Capabilities the core needs from an embedding editor
pub trait EditorHost {
    /// Full text of the active document, or `None` when no document is open.
    /// An error means a document is open but could not be read.
    fn document_snapshot(&self) -> Result<Option<String>>;

    /// Install `annotations` in place of the previous set as one update.
    /// An empty slice clears.
    fn replace_annotations(&mut self, annotations: &[Annotation]) -> Result<(), RenderError>;

    fn settings(&self) -> Settings;

    fn save_settings(&mut self, settings: &Settings) -> Result<()>;

    /// Show a short user-visible message
    fn notify(&mut self, message: &str);
}

/// In-memory editor: one optional document, its highlight layer and a notice log.
///
/// Edits go through [`MemoryHost::apply_edit`], which shifts the current highlights the
/// way an editor's decoration layer would until the next recompute replaces them.
#[derive(Debug, Default)]
pub struct MemoryHost {
    document: Option<String>,
    annotations: AnnotationSet,
    settings: Settings,
    settings_path: Option<PathBuf>,
    notices: Vec<String>,
    replace_calls: usize,
}

impl MemoryHost {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn with_document(mut self, text: impl Into<String>) -> Self {
        self.document = Some(text.into());
        self
    }

    /// Persist settings to `path` whenever they are saved
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    pub fn open_document(&mut self, text: impl Into<String>) {
        self.document = Some(text.into());
        self.annotations.clear();
    }

    pub fn close_document(&mut self) {
        self.document = None;
        self.annotations.clear();
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    /// Apply an edit to the open document and remap the current highlights through it
    pub fn apply_edit(&mut self, edit: &TextEdit) -> Result<()> {
        let Some(document) = self.document.as_mut() else {
            anyhow::bail!("No open document to edit");
        };

        let start = byte_offset(document, edit.at)
            .ok_or_else(|| anyhow::anyhow!("Edit offset {} is past the document end", edit.at))?;
        let end = byte_offset(document, edit.at + edit.deleted).ok_or_else(|| {
            anyhow::anyhow!("Edit deletes past the document end at {}", edit.at + edit.deleted)
        })?;

        document.replace_range(start..end, &edit.inserted);
        self.annotations.map_through(edit);
        debug!(at = edit.at, deleted = edit.deleted, inserted = edit.inserted.len(), "Applied edit");
        Ok(())
    }

    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    /// Text currently covered by each highlight
    pub fn highlighted_text(&self) -> Vec<String> {
        let Some(document) = self.document.as_deref() else {
            return Vec::new();
        };
        self.annotations
            .iter()
            .map(|a| document.chars().skip(a.from).take(a.len()).collect())
            .collect()
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// How many replacement sets have been accepted
    pub fn replace_calls(&self) -> usize {
        self.replace_calls
    }

    /// Change settings behind the core's back, as a settings UI would
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }
}

impl EditorHost for MemoryHost {
    fn document_snapshot(&self) -> Result<Option<String>> {
        Ok(self.document.clone())
    }

    fn replace_annotations(&mut self, annotations: &[Annotation]) -> Result<(), RenderError> {
        let Some(document) = self.document.as_deref() else {
            return Err(RenderError::NoView);
        };
        let len = document.chars().count();
        if let Some((index, annotation)) = annotations.iter().enumerate().find(|(_, a)| a.to > len) {
            return Err(RenderError::OutOfBounds {
                index,
                to: annotation.to,
                len,
            });
        }
        self.annotations.replace_all(annotations.to_vec())?;
        self.replace_calls += 1;
        Ok(())
    }

    fn settings(&self) -> Settings {
        self.settings.clone()
    }

    fn save_settings(&mut self, settings: &Settings) -> Result<()> {
        self.settings = settings.clone();
        if let Some(path) = &self.settings_path {
            settings.save_blocking(path)?;
        }
        Ok(())
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

/// Byte offset of character `offset`, allowing one past the last character
pub(crate) fn byte_offset(text: &str, offset: usize) -> Option<usize> {
    text.char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()))
        .nth(offset)
}
