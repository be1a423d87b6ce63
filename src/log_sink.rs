//! Observability sink for the organizer and the configuration store.
//!
//! The core never talks to a logger directly. It writes events through the
//! narrow [`LogSink`] interface, so the binary can route them to `tracing`
//! while tests capture them in memory.

use std::sync::Mutex;
use tracing::Level;

/// Append-only destination for log events.
pub trait LogSink {
    /// Records one event at the given level.
    fn log(&self, level: Level, message: &str);
}

/// Forwards every event to the global `tracing` dispatcher.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: Level, message: &str) {
        // tracing macros need the level as a constant
        if level == Level::ERROR {
            tracing::error!(target: "fancy_organizer", "{}", message);
        } else if level == Level::WARN {
            tracing::warn!(target: "fancy_organizer", "{}", message);
        } else if level == Level::INFO {
            tracing::info!(target: "fancy_organizer", "{}", message);
        } else if level == Level::DEBUG {
            tracing::debug!(target: "fancy_organizer", "{}", message);
        } else {
            tracing::trace!(target: "fancy_organizer", "{}", message);
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _level: Level, _message: &str) {}
}

/// Keeps every event in memory, in order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded events.
    pub fn events(&self) -> Vec<(Level, String)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Returns the messages recorded at exactly `level`.
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn log(&self, level: Level, message: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push((level, message.to_string()));
        }
    }
}

/// Maps the CLI's `-v`/`-q` counts to a default filter directive.
pub fn verbosity_filter(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global `tracing` subscriber writing to stderr.
///
/// `RUST_LOG`, when set, takes precedence over `default_filter`. Calling this
/// twice is harmless; the second installation is ignored.
pub fn init_subscriber(default_filter: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
