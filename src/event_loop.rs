//! Single-task driver that turns host notifications into recomputes.
//!
//! Everything runs on one task: events are handled and debounced recomputes fire
//! strictly one after another, so the last recompute to run decides the final set.
//! A recompute that fires after further edits simply reads the newer snapshot.

use futures::future::OptionFuture;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::host::EditorHost;
use crate::orchestrator::{Command, Highlighter};
use crate::scheduler::{DebounceConfig, Debouncer, TriggerKind};
use crate::settings::Settings;

/// Notifications a host delivers to the core
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    DocumentChanged,
    ActiveViewChanged,
    ThemeChanged,
    Command(Command),
    SettingsChanged(Settings),
    Shutdown,
}

/// Sending half handed to the host shell
pub type EventSender = mpsc::Sender<HostEvent>;

pub struct EventLoop<H: EditorHost> {
    highlighter: Highlighter<H>,
    debouncer: Debouncer<TriggerKind>,
    config: DebounceConfig,
    events: mpsc::Receiver<HostEvent>,
}

impl<H: EditorHost> EventLoop<H> {
    /// Create a loop and the channel the host uses to feed it
    pub fn new(highlighter: Highlighter<H>, config: DebounceConfig, capacity: usize) -> (Self, EventSender) {
        let (tx, rx) = mpsc::channel(capacity);
        let event_loop = Self {
            highlighter,
            debouncer: Debouncer::new(),
            config,
            events: rx,
        };
        (event_loop, tx)
    }

    pub fn highlighter(&self) -> &Highlighter<H> {
        &self.highlighter
    }

    /// Run until `Shutdown` arrives or every sender is dropped, then hand the
    /// highlighter back. Pending debounced recomputes are dropped on exit.
    pub async fn run(mut self) -> Highlighter<H> {
        info!("Highlight event loop started");
        self.schedule(TriggerKind::InitialLoad);

        loop {
            let timer: OptionFuture<_> = self.debouncer.next_deadline().map(sleep_until).into();

            tokio::select! {
                event = self.events.recv() => match event {
                    Some(HostEvent::Shutdown) | None => break,
                    Some(event) => self.handle(event),
                },
                Some(()) = timer => self.fire_due(),
            }
        }

        if !self.debouncer.is_empty() {
            debug!(pending = self.debouncer.len(), "Dropping pending recomputes");
            self.debouncer.clear();
        }
        info!(stats = ?self.highlighter.stats(), "Highlight event loop stopped");
        self.highlighter
    }

    fn handle(&mut self, event: HostEvent) {
        debug!(?event, "Host event");
        match event {
            HostEvent::DocumentChanged => self.schedule(TriggerKind::DocumentEdited),
            HostEvent::ActiveViewChanged => self.schedule(TriggerKind::ViewActivated),
            HostEvent::ThemeChanged => self.schedule(TriggerKind::ThemeChanged),
            HostEvent::Command(command) => {
                self.highlighter.run_command(command);
            }
            HostEvent::SettingsChanged(settings) => {
                if let Err(e) = self.highlighter.update_settings(settings) {
                    warn!(error = %e, "Rejected settings change");
                    self.highlighter.host_mut().notify(&e.to_string());
                }
            }
            HostEvent::Shutdown => {}
        }
    }

    /// Debounced triggers are only scheduled while highlighting is enabled
    fn schedule(&mut self, kind: TriggerKind) {
        if !self.highlighter.settings().enabled {
            debug!(?kind, "Highlighting disabled; not scheduling");
            return;
        }
        self.debouncer.schedule(kind, self.config.delay_for(kind));
    }

    fn fire_due(&mut self) {
        for kind in self.debouncer.take_due(Instant::now()) {
            let outcome = self.highlighter.recompute();
            debug!(?kind, ?outcome, "Debounced recompute finished");
        }
    }
}
