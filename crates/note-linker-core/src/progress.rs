//! Indexing progress events.
//!
//! An indexing run walks a fixed sequence of phases:
//!
//! ```text
//! Scanning → Diffing → Embedding (one event per batch) → Storing → Complete
//! ```
//!
//! A run that fails ends with a single `Failed` event instead of
//! `Complete`. No phase is skipped: an empty phase still reports
//! `current = 0, total = 0`.
//!
//! Observers implement [`IndexProgressReporter`]. The app crate provides
//! stderr, JSON-lines, and channel reporters.

use std::sync::Mutex;

use serde::Serialize;

use crate::indexer::IndexingSummary;

/// Phase of the indexing pipeline.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexPhase {
    Scanning,
    Diffing,
    Embedding,
    Storing,
    Complete,
    Failed,
}

impl IndexPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexPhase::Scanning => "scanning",
            IndexPhase::Diffing => "diffing",
            IndexPhase::Embedding => "embedding",
            IndexPhase::Storing => "storing",
            IndexPhase::Complete => "complete",
            IndexPhase::Failed => "failed",
        }
    }

    /// `true` for `Complete` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, IndexPhase::Complete | IndexPhase::Failed)
    }
}

/// A single progress event.
#[derive(Clone, Debug, Serialize)]
pub struct IndexProgressEvent {
    pub phase: IndexPhase,
    pub current: usize,
    pub total: usize,
    pub message: String,
    /// Present only on the `Complete` event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<IndexingSummary>,
}

impl IndexProgressEvent {
    pub fn new(phase: IndexPhase, current: usize, total: usize, message: impl Into<String>) -> Self {
        Self {
            phase,
            current,
            total,
            message: message.into(),
            summary: None,
        }
    }

    pub fn complete(summary: IndexingSummary) -> Self {
        let total = summary.total_notes_indexed;
        Self {
            phase: IndexPhase::Complete,
            current: total,
            total,
            message: format!(
                "Indexed {} notes ({} embeddings computed, {} cached)",
                total, summary.embeddings_computed, summary.embeddings_cached
            ),
            summary: Some(summary),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(IndexPhase::Failed, 0, 0, message)
    }
}

/// Receives indexing progress. Called from the indexing pipeline.
pub trait IndexProgressReporter: Send + Sync {
    fn report(&self, event: IndexProgressEvent);
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl IndexProgressReporter for NoProgress {
    fn report(&self, _event: IndexProgressEvent) {}
}

/// Keeps every event in memory, in arrival order.
#[derive(Default)]
pub struct CollectingProgress {
    events: Mutex<Vec<IndexProgressEvent>>,
}

impl CollectingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<IndexProgressEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn phases(&self) -> Vec<IndexPhase> {
        self.events().iter().map(|e| e.phase).collect()
    }
}

impl IndexProgressReporter for CollectingProgress {
    fn report(&self, event: IndexProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
