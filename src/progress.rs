//! Indexing progress reporters.
//!
//! Progress is emitted on **stderr** so stdout remains parseable for
//! scripts. [`ChannelProgress`] forwards events into a tokio channel for
//! callers that drain them from another task.

use std::io::Write;

use tokio::sync::mpsc;

use note_linker_core::progress::{
    IndexPhase, IndexProgressEvent, IndexProgressReporter, NoProgress,
};

/// Human-friendly progress on stderr: "index  embedding  50 / 1,234".
pub struct StderrProgress;

impl IndexProgressReporter for StderrProgress {
    fn report(&self, event: IndexProgressEvent) {
        let line = match event.phase {
            IndexPhase::Complete | IndexPhase::Failed => {
                format!("index  {}  {}\n", event.phase.as_str(), event.message)
            }
            _ => format!(
                "index  {}  {} / {}\n",
                event.phase.as_str(),
                format_number(event.current as u64),
                format_number(event.total as u64)
            ),
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl IndexProgressReporter for JsonProgress {
    fn report(&self, event: IndexProgressEvent) {
        let obj = serde_json::json!({
            "event": "progress",
            "phase": event.phase,
            "current": event.current,
            "total": event.total,
            "message": event.message,
            "summary": event.summary,
        });
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

/// Forwards every event into an unbounded tokio channel. Events reported
/// after the receiver is dropped are discarded.
pub struct ChannelProgress {
    tx: mpsc::UnboundedSender<IndexProgressEvent>,
}

impl ChannelProgress {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<IndexProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl IndexProgressReporter for ChannelProgress {
    fn report(&self, event: IndexProgressEvent) {
        let _ = self.tx.send(event);
    }
}

pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn IndexProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
