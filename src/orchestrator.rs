// WHY: Owns the recompute cycle (snapshot, segment, filter, resolve, replace) and
// keeps every failure on this side of the host boundary

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, info, warn};

use crate::annotation::Annotation;
use crate::error::HighlightError;
use crate::host::EditorHost;
use crate::resolve::resolve_units;
use crate::segmenter::Segmenter;
use crate::settings::Settings;
use crate::threshold::long_sentences_with;

/// Compute the highlight set for `snapshot` without touching any host.
///
/// Returns an empty set when highlighting is disabled.
pub fn compute_highlights(snapshot: &str, settings: &Settings) -> Vec<Annotation> {
    compute_highlights_with(&Segmenter::default(), snapshot, settings)
}

pub fn compute_highlights_with(
    segmenter: &Segmenter,
    snapshot: &str,
    settings: &Settings,
) -> Vec<Annotation> {
    if !settings.enabled {
        return Vec::new();
    }
    let units = long_sentences_with(segmenter, snapshot, settings.max_words);
    let resolution = resolve_units(snapshot, &units);
    if !resolution.is_complete() {
        debug!(
            resolved = resolution.spans.len(),
            skipped = resolution.misses.len(),
            "Highlighting the sentences that could be placed"
        );
    }
    resolution
        .spans
        .into_iter()
        .map(|span| Annotation::new(span.start, span.end, settings.highlight_style))
        .collect()
}

/// Signature of the pure highlight step a [`Highlighter`] runs
type ComputeFn = fn(&Segmenter, &str, &Settings) -> Vec<Annotation>;

/// Explicit user commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Flip `enabled`, persist it, then highlight or clear
    Toggle,
    /// Recompute now
    Highlight,
    /// Remove all highlights now
    Clear,
}

impl std::str::FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "toggle" => Ok(Self::Toggle),
            "highlight" => Ok(Self::Highlight),
            "clear" => Ok(Self::Clear),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Computing,
}

/// What a recompute did to the host's highlight layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecomputeOutcome {
    /// A new set was installed
    Applied { count: usize },
    /// The empty set was installed
    Cleared,
    /// Nothing to do, e.g. no open document
    Skipped,
    /// The previous set was left untouched
    Failed(HighlightError),
}

/// Counters for logging and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecomputeStats {
    pub runs: u64,
    pub applied: u64,
    pub cleared: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Runs recomputes against an [`EditorHost`]
pub struct Highlighter<H: EditorHost> {
    host: H,
    segmenter: Segmenter,
    compute: ComputeFn,
    phase: Phase,
    stats: RecomputeStats,
}

impl<H: EditorHost> Highlighter<H> {
    pub fn new(host: H) -> Self {
        Self::with_segmenter(host, Segmenter::default())
    }

    pub fn with_segmenter(host: H, segmenter: Segmenter) -> Self {
        Self {
            host,
            segmenter,
            compute: compute_highlights_with,
            phase: Phase::Idle,
            stats: RecomputeStats::default(),
        }
    }

    /// Swap the pure step, so failure handling can be driven from tests
    #[cfg(test)]
    fn with_compute(mut self, compute: ComputeFn) -> Self {
        self.compute = compute;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> RecomputeStats {
        self.stats
    }

    pub fn settings(&self) -> Settings {
        self.host.settings()
    }

    /// Recompute highlights for the current snapshot and replace the host's set.
    ///
    /// Clears when highlighting is disabled. On failure the previous set stays in
    /// place and the user gets a notice.
    pub fn recompute(&mut self) -> RecomputeOutcome {
        self.phase = Phase::Computing;
        let result = self.try_recompute();
        self.phase = Phase::Idle;
        self.stats.runs += 1;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => self.report(err, "Error highlighting sentences"),
        };
        self.record(&outcome);
        outcome
    }

    fn try_recompute(&mut self) -> Result<RecomputeOutcome, HighlightError> {
        let settings = self.host.settings();
        if !settings.enabled {
            return self.clear_layer();
        }

        let snapshot = self.snapshot()?;

        let segmenter = &self.segmenter;
        let compute = self.compute;
        // WHY: a panic in the pure step must not escape into the host's dispatch
        let annotations = panic::catch_unwind(AssertUnwindSafe(|| {
            compute(segmenter, &snapshot, &settings)
        }))
        .map_err(|payload| HighlightError::SegmentationFailure(panic_message(payload.as_ref())))?;

        self.host.replace_annotations(&annotations)?;
        debug!(
            count = annotations.len(),
            max_words = settings.max_words,
            chars = snapshot.chars().count(),
            "Installed highlight set"
        );
        Ok(RecomputeOutcome::Applied {
            count: annotations.len(),
        })
    }

    /// Current document text. `None` from the host is benign; a read error is not.
    fn snapshot(&self) -> Result<String, HighlightError> {
        match self.host.document_snapshot() {
            Ok(Some(text)) => Ok(text),
            Ok(None) => Err(HighlightError::DocumentUnavailable),
            Err(e) => Err(HighlightError::SnapshotFailure(format!("{e:#}"))),
        }
    }

    /// Remove all highlights from the current view
    pub fn clear(&mut self) -> RecomputeOutcome {
        let outcome = match self.clear_layer() {
            Ok(outcome) => outcome,
            Err(err) => self.report(err, "Error clearing highlights"),
        };
        self.record(&outcome);
        outcome
    }

    fn clear_layer(&mut self) -> Result<RecomputeOutcome, HighlightError> {
        self.snapshot()?;
        self.host.replace_annotations(&[])?;
        Ok(RecomputeOutcome::Cleared)
    }

    pub fn run_command(&mut self, command: Command) -> RecomputeOutcome {
        info!(?command, "Running command");
        match command {
            Command::Highlight => self.recompute(),
            Command::Clear => self.clear(),
            Command::Toggle => {
                let mut settings = self.host.settings();
                settings.enabled = !settings.enabled;
                self.persist(&settings);

                if settings.enabled {
                    let outcome = self.recompute();
                    self.host.notify("Highlighting enabled");
                    outcome
                } else {
                    let outcome = self.clear();
                    self.host.notify("Highlighting disabled");
                    outcome
                }
            }
        }
    }

    /// Adopt new settings from the shell and refresh the highlights.
    ///
    /// Invalid settings are rejected and the previous ones stay in force.
    pub fn update_settings(
        &mut self,
        settings: Settings,
    ) -> Result<RecomputeOutcome, HighlightError> {
        settings.validate()?;
        self.persist(&settings);
        Ok(self.recompute())
    }

    fn persist(&mut self, settings: &Settings) {
        if let Err(e) = self.host.save_settings(settings) {
            warn!(error = %e, "Failed to save settings");
        }
    }

    fn report(&mut self, err: HighlightError, notice: &str) -> RecomputeOutcome {
        if err.is_benign() {
            debug!(error = %err, "Nothing to highlight");
            return RecomputeOutcome::Skipped;
        }
        error!(error = %err, "Recompute failed; keeping previous highlights");
        self.host.notify(notice);
        RecomputeOutcome::Failed(err)
    }

    fn record(&mut self, outcome: &RecomputeOutcome) {
        match outcome {
            RecomputeOutcome::Applied { .. } => self.stats.applied += 1,
            RecomputeOutcome::Cleared => self.stats.cleared += 1,
            RecomputeOutcome::Skipped => self.stats.skipped += 1,
            RecomputeOutcome::Failed(_) => self.stats.failed += 1,
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
