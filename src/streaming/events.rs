//! Relay event log
//!
//! Line-oriented records of relay activity, separate from `tracing` diagnostics:
//!
//! ```text
//! [TRACK SWITCH]
//! [IN][MANIFEST] http://origin.example/video_270.m3u8
//! [OUT][MANIFEST] http://origin.example/video_270.m3u8 (12.34ms)
//! ```

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::warn;
use url::Url;

use crate::config::EventOutput;
use crate::streaming::classification::ResourceKind;

/// One relay event; `Display` renders the exact log line without terminator
#[derive(Debug, Clone, Copy)]
pub enum RelayEvent<'a> {
    TrackSwitch,
    Incoming {
        kind: ResourceKind,
        url: &'a Url,
    },
    Outgoing {
        kind: ResourceKind,
        url: &'a Url,
        elapsed: Duration,
    },
}

impl fmt::Display for RelayEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayEvent::TrackSwitch => f.write_str("[TRACK SWITCH]"),
            RelayEvent::Incoming { kind, url } => write!(f, "[IN][{kind}] {url}"),
            RelayEvent::Outgoing { kind, url, elapsed } => write!(
                f,
                "[OUT][{kind}] {url} ({:.2}ms)",
                elapsed.as_secs_f64() * 1000.0
            ),
        }
    }
}

/// Destination for relay event lines
pub trait EventSink: Send + Sync {
    /// Write one complete line. Implementations must not interleave partial lines.
    fn emit(&self, line: &str);

    fn record(&self, event: RelayEvent<'_>) {
        self.emit(&event.to_string());
    }
}

/// Sink writing newline-terminated lines to an `io::Write`
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl<W: Write + Send> EventSink for WriterSink<W> {
    fn emit(&self, line: &str) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let result = writeln!(writer, "{line}").and_then(|_| writer.flush());
        if let Err(e) = result {
            warn!("Failed to write relay event: {}", e);
        }
    }
}

/// Sink collecting lines in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines emitted so far, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

/// Sink for the configured output stream
pub fn sink_for(output: EventOutput) -> Arc<dyn EventSink> {
    match output {
        EventOutput::Stdout => Arc::new(WriterSink::new(io::stdout())),
        EventOutput::Stderr => Arc::new(WriterSink::new(io::stderr())),
    }
}
