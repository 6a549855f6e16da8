// WHY: Keyed debounce state, separate from the event loop so supersede and
// firing order can be checked without a runtime

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Notification sources that recompute after a delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    InitialLoad,
    ViewActivated,
    DocumentEdited,
    ThemeChanged,
}

/// Debounce delays per trigger kind, in milliseconds
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct DebounceConfig {
    pub initial_load_ms: u64,
    pub view_activated_ms: u64,
    pub document_edited_ms: u64,
    pub theme_changed_ms: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            initial_load_ms: 1000,
            view_activated_ms: 500,
            document_edited_ms: 300,
            theme_changed_ms: 100,
        }
    }
}

impl DebounceConfig {
    pub fn delay_for(&self, kind: TriggerKind) -> Duration {
        let ms = match kind {
            TriggerKind::InitialLoad => self.initial_load_ms,
            TriggerKind::ViewActivated => self.view_activated_ms,
            TriggerKind::DocumentEdited => self.document_edited_ms,
            TriggerKind::ThemeChanged => self.theme_changed_ms,
        };
        Duration::from_millis(ms)
    }
}

/// Pending deferred tasks keyed by kind.
///
/// Scheduling a kind that is already pending replaces its deadline, so a burst of
/// notifications fires once, one delay after the last of them.
#[derive(Debug)]
pub struct Debouncer<K> {
    pending: HashMap<K, Instant>,
}

impl<K> Default for Debouncer<K> {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash + std::fmt::Debug> Debouncer<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` to fire `delay` from now. Returns true if an unfired
    /// schedule of the same kind was superseded.
    pub fn schedule(&mut self, kind: K, delay: Duration) -> bool {
        self.schedule_at(kind, Instant::now(), delay)
    }

    pub fn schedule_at(&mut self, kind: K, now: Instant, delay: Duration) -> bool {
        let superseded = self.pending.insert(kind, now + delay).is_some();
        debug!(?kind, delay_ms = delay.as_millis() as u64, superseded, "Scheduled recompute");
        superseded
    }

    pub fn is_pending(&self, kind: K) -> bool {
        self.pending.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Remove and return every kind whose deadline has passed, earliest first
    pub fn take_due(&mut self, now: Instant) -> Vec<K> {
        let mut due: Vec<(Instant, K)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(kind, deadline)| (*deadline, *kind))
            .collect();
        due.sort_by_key(|(deadline, _)| *deadline);

        for (_, kind) in &due {
            self.pending.remove(kind);
        }
        due.into_iter().map(|(_, kind)| kind).collect()
    }

    /// Drop every pending schedule
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
