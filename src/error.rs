use thiserror::Error;

/// Failures surfaced by a recompute. None of them propagate past the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HighlightError {
    #[error("no active document to highlight")]
    DocumentUnavailable,

    #[error("failed to read the active document: {0}")]
    SnapshotFailure(String),

    #[error("sentence segmentation failed: {0}")]
    SegmentationFailure(String),

    #[error("sentence {index} not found at or after character {cursor}")]
    PositionResolutionMiss { index: usize, cursor: usize },

    #[error("host rejected annotation update: {0}")]
    RenderApplyFailure(#[from] RenderError),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

impl HighlightError {
    /// Benign conditions are logged at debug level and never shown to the user
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::DocumentUnavailable)
    }
}

/// Reasons a host or annotation substrate refuses a replacement set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("annotation {index} has an empty or inverted range {from}..{to}")]
    EmptyRange { index: usize, from: usize, to: usize },

    #[error("annotation {index} overlaps or precedes the one before it")]
    Unordered { index: usize },

    #[error("annotation {index} ends at {to}, past the document end at {len}")]
    OutOfBounds { index: usize, to: usize, len: usize },

    #[error("no live view to apply annotations to")]
    NoView,

    #[error("{0}")]
    Host(String),
}
