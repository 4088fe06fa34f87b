//! Error types for note-linker-core.
//!
//! Validation failures, missing resources, and concurrency conflicts are
//! typed here so callers can tell them apart. Store and provider plumbing
//! keeps using `anyhow`; a [`LinkerError`] travels inside an
//! `anyhow::Error` and can be recovered with `downcast_ref`.

use thiserror::Error;

/// Errors raised by the indexing and ranking pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkerError {
    /// A rank passed to RRF was zero.
    #[error("Rank must be a positive integer, got {0}")]
    InvalidRank(usize),
    /// An embedding operation was given nothing to work on.
    #[error("Cannot compute embeddings or similarities over an empty input set")]
    EmptyEmbeddingInput,
    /// The lexical scorer was built over zero documents.
    #[error("Cannot build a lexical index over an empty corpus")]
    EmptyLexicalCorpus,
    /// The vault root does not exist.
    #[error("Vault not found: {0}")]
    VaultNotFound(String),
    /// Another indexing run holds the run lock.
    #[error("Indexing already running")]
    AlreadyRunning,
    /// The embedding backend failed for a batch.
    #[error("Embedding provider failed: {0}")]
    Embedding(String),
    /// The backend returned a different number of vectors than texts.
    #[error("Embedding provider returned {got} vectors for {expected} texts")]
    EmbeddingCountMismatch { expected: usize, got: usize },
}

/// Returns `true` if `err` wraps [`LinkerError::AlreadyRunning`].
pub fn is_already_running(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<LinkerError>(),
        Some(LinkerError::AlreadyRunning)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_running_survives_anyhow() {
        let err: anyhow::Error = LinkerError::AlreadyRunning.into();
        assert!(is_already_running(&err));
        assert_eq!(err.to_string(), "Indexing already running");
    }

    #[test]
    fn test_other_errors_are_not_already_running() {
        let err: anyhow::Error = LinkerError::InvalidRank(0).into();
        assert!(!is_already_running(&err));
        assert!(!is_already_running(&anyhow::anyhow!("boom")));
    }
}
