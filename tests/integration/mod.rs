// Integration test utilities and common code
// WHY: Centralized utilities avoid duplication across integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use overlong::{Annotation, EditorHost, RenderError, Settings};

pub const LONG_SENTENCE: &str = "This is a very long sentence that is far beyond the limit of the 10 words that commonly people want to read.";

/// Settings with a threshold of 10 words, as used throughout the examples
pub fn ten_word_settings() -> Settings {
    Settings {
        max_words: 10,
        ..Default::default()
    }
}

/// Test fixture helper for temporary notes and settings files
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();
        Self { temp_dir, root_path }
    }

    /// Create a note file with given content
    pub fn create_note<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        let file_path = self.root_path.join(relative_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&file_path, content).expect("Failed to write note");
        file_path
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root_path.join(".plugin").join("data.json")
    }

    pub fn write_settings_json(&self, json: &str) -> PathBuf {
        let path = self.settings_path();
        fs::create_dir_all(path.parent().unwrap()).expect("Failed to create settings dir");
        fs::write(&path, json).expect("Failed to write settings");
        path
    }
}

/// Host whose document can be edited from the test while an event loop owns it
#[derive(Clone, Default)]
pub struct SharedHost {
    pub document: Arc<Mutex<Option<String>>>,
    pub settings: Arc<Mutex<Settings>>,
    pub applied: Arc<Mutex<Vec<Vec<Annotation>>>>,
    pub notices: Arc<Mutex<Vec<String>>>,
}

impl SharedHost {
    pub fn new(document: &str, settings: Settings) -> Self {
        let host = Self::default();
        *host.document.lock().unwrap() = Some(document.to_string());
        *host.settings.lock().unwrap() = settings;
        host
    }

    pub fn set_document(&self, text: &str) {
        *self.document.lock().unwrap() = Some(text.to_string());
    }

    pub fn applied_count(&self) -> usize {
        self.applied.lock().unwrap().len()
    }

    pub fn last_applied(&self) -> Option<Vec<Annotation>> {
        self.applied.lock().unwrap().last().cloned()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }
}

impl EditorHost for SharedHost {
    fn document_snapshot(&self) -> anyhow::Result<Option<String>> {
        Ok(self.document.lock().unwrap().clone())
    }

    fn replace_annotations(&mut self, annotations: &[Annotation]) -> Result<(), RenderError> {
        self.applied.lock().unwrap().push(annotations.to_vec());
        Ok(())
    }

    fn settings(&self) -> Settings {
        self.settings.lock().unwrap().clone()
    }

    fn save_settings(&mut self, settings: &Settings) -> anyhow::Result<()> {
        *self.settings.lock().unwrap() = settings.clone();
        Ok(())
    }

    fn notify(&mut self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }
}
