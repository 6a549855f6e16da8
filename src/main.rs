use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn, Level};

use overlong::annotation::validate_ordering;
use overlong::segmenter::word_count;
use overlong::{
    compute_highlights, Annotation, Command, DebounceConfig, EditorHost, EventLoop, EventSender,
    HighlightStyle, Highlighter, HostEvent, RenderError, Settings,
};

#[derive(Parser, Debug)]
#[command(name = "overlong")]
#[command(about = "Highlight sentences that run past a word limit")]
#[command(version)]
struct Args {
    /// Settings file in plugin data.json format
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Log debug events
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Print the long sentences in a file and exit
    Check {
        file: PathBuf,

        /// Override the word threshold from the settings file
        #[arg(long)]
        max_words: Option<usize>,

        /// Override the highlight style (background or underline)
        #[arg(long)]
        style: Option<HighlightStyle>,
    },
    /// Re-highlight a file whenever it changes. Reads `toggle`, `highlight`,
    /// `clear`, `theme`, `view` and `quit` from stdin.
    Watch {
        file: PathBuf,

        /// How often to check the file for changes
        #[arg(long, default_value_t = 250)]
        poll_ms: u64,
    },
    /// Write a settings file with the default values
    InitSettings { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr);
    if args.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(?args, "Parsed CLI arguments");

    match args.mode {
        Mode::Check { ref file, max_words, style } => {
            let mut settings = load_settings(args.settings.as_deref()).await;
            if let Some(max_words) = max_words {
                settings.max_words = max_words;
            }
            if let Some(style) = style {
                settings.highlight_style = style;
            }
            settings.enabled = true;
            settings.validate()?;
            check_file(file, &settings).await
        }
        Mode::Watch { ref file, poll_ms } => {
            let settings = load_settings(args.settings.as_deref()).await;
            settings.validate()?;
            watch_file(file, settings, args.settings.clone(), poll_ms).await
        }
        Mode::InitSettings { ref path } => {
            Settings::default().save(path).await?;
            println!("Wrote default settings to {}", path.display());
            Ok(())
        }
    }
}

async fn load_settings(path: Option<&Path>) -> Settings {
    match path {
        Some(path) => Settings::load(path).await,
        None => Settings::default(),
    }
}

async fn check_file(file: &Path, settings: &Settings) -> Result<()> {
    if !file.is_file() {
        anyhow::bail!("Not a file: {}", file.display());
    }
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let highlights = compute_highlights(&text, settings);
    info!(file = %file.display(), count = highlights.len(), "Checked file");

    println!(
        "{}: {} sentence(s) over {} words",
        file.display(),
        highlights.len(),
        settings.max_words
    );
    print_highlights(&text, &highlights);
    Ok(())
}

fn print_highlights(text: &str, highlights: &[Annotation]) {
    let chars: Vec<char> = text.chars().collect();
    for annotation in highlights {
        let excerpt: String = chars[annotation.from..annotation.to].iter().collect();
        println!(
            "  {}..{} [{}] {} words: {}",
            annotation.from,
            annotation.to,
            annotation.style.mark_class(),
            word_count(&excerpt),
            excerpt.split_whitespace().collect::<Vec<_>>().join(" ")
        );
    }
}

/// Host backed by a file on disk; the highlight layer is the terminal
struct FileHost {
    path: PathBuf,
    settings: Settings,
    settings_path: Option<PathBuf>,
    last_snapshot: RefCell<Option<String>>,
}

impl EditorHost for FileHost {
    fn document_snapshot(&self) -> Result<Option<String>> {
        let read = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()));
        let snapshot = match read {
            Ok(text) => Some(text),
            Err(e) => {
                *self.last_snapshot.borrow_mut() = None;
                return Err(e);
            }
        };
        *self.last_snapshot.borrow_mut() = snapshot.clone();
        Ok(snapshot)
    }

    fn replace_annotations(&mut self, annotations: &[Annotation]) -> Result<(), RenderError> {
        let snapshot = self.last_snapshot.borrow();
        let Some(text) = snapshot.as_deref() else {
            return Err(RenderError::NoView);
        };
        validate_ordering(annotations)?;
        let len = text.chars().count();
        if let Some((index, annotation)) = annotations.iter().enumerate().find(|(_, a)| a.to > len) {
            return Err(RenderError::OutOfBounds { index, to: annotation.to, len });
        }

        println!("--- {} highlight(s) in {}", annotations.len(), self.path.display());
        print_highlights(text, annotations);
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
        eprintln!("[notice] {message}");
    }
}

async fn watch_file(file: &Path, settings: Settings, settings_path: Option<PathBuf>, poll_ms: u64) -> Result<()> {
    if !file.is_file() {
        anyhow::bail!("Not a file: {}", file.display());
    }

    let host = FileHost {
        path: file.to_path_buf(),
        settings,
        settings_path,
        last_snapshot: RefCell::new(None),
    };
    let (event_loop, tx) = EventLoop::new(Highlighter::new(host), DebounceConfig::default(), 64);

    tokio::spawn(poll_for_changes(file.to_path_buf(), Duration::from_millis(poll_ms.max(10)), tx.clone()));
    tokio::spawn(read_commands(tx.clone()));
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            if let Err(e) = tx.send(HostEvent::Shutdown).await {
                debug!(error = %e, "Event loop already stopped");
            }
        }
    });

    info!(file = %file.display(), "Watching for changes");
    let highlighter = event_loop.run().await;
    info!(stats = ?highlighter.stats(), "Stopped watching");
    Ok(())
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

async fn poll_for_changes(path: PathBuf, every: Duration, tx: EventSender) {
    let mut last_seen = modified_at(&path);
    let mut ticks = IntervalStream::new(tokio::time::interval(every));

    while ticks.next().await.is_some() {
        let current = modified_at(&path);
        if current != last_seen {
            last_seen = current;
            if tx.send(HostEvent::DocumentChanged).await.is_err() {
                break;
            }
        }
    }
}

async fn read_commands(tx: EventSender) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let event = match line.trim() {
            "" => continue,
            "quit" | "exit" => HostEvent::Shutdown,
            "theme" => HostEvent::ThemeChanged,
            "view" => HostEvent::ActiveViewChanged,
            other => match other.parse::<Command>() {
                Ok(command) => HostEvent::Command(command),
                Err(e) => {
                    warn!("{e}");
                    continue;
                }
            },
        };
        if tx.send(event).await.is_err() {
            break;
        }
    }
}
