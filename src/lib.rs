pub mod annotation;
pub mod error;
pub mod event_loop;
pub mod host;
pub mod orchestrator;
pub mod resolve;
pub mod scheduler;
pub mod segmenter;
pub mod settings;
pub mod threshold;

// Re-export the types a host shell needs
pub use annotation::{Annotation, AnnotationSet, HighlightStyle, TextEdit};
pub use error::{HighlightError, RenderError};
pub use event_loop::{EventLoop, EventSender, HostEvent};
pub use host::{EditorHost, MemoryHost};
pub use orchestrator::{compute_highlights, Command, Highlighter, RecomputeOutcome};
pub use scheduler::{DebounceConfig, TriggerKind};
pub use segmenter::{segment, Segmenter, SentenceUnit};
pub use settings::Settings;
pub use threshold::long_sentences;
