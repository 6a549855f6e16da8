use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::warn;

use crate::annotation::HighlightStyle;
use crate::error::HighlightError;

/// User-facing configuration owned by the host shell.
///
/// The core reads `max_words` and `highlight_style` on every recompute and keeps no
/// copy between runs. Field names serialize in camelCase so an existing plugin
/// `data.json` loads unchanged.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Sentences with more words than this are highlighted
    pub max_words: usize,
    pub highlight_color: String,
    pub enabled: bool,
    pub highlight_style: HighlightStyle,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_words: 20,
            highlight_color: "#ffeb3b".to_string(),
            enabled: true,
            highlight_style: HighlightStyle::Background,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), HighlightError> {
        if self.max_words == 0 {
            return Err(HighlightError::InvalidSettings(
                "word threshold must be greater than zero".to_string(),
            ));
        }
        if self.highlight_color.trim().is_empty() {
            return Err(HighlightError::InvalidSettings(
                "highlight color must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Load settings from `path`, layering saved fields over the defaults.
    ///
    /// A missing, unreadable, malformed or invalid file yields the defaults.
    pub async fn load(path: &Path) -> Self {
        match fs::read_to_string(path).await {
            Ok(content) => Self::from_json(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring unusable settings file");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn load_blocking(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_json(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring unusable settings file");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(content).context("malformed settings JSON")?;
        settings.validate()?;
        Ok(settings)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;
        Ok(())
    }

    /// Synchronous save for hosts that persist from inside the event loop
    pub fn save_blocking(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;
        Ok(())
    }
}
