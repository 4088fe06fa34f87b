//! Storage abstraction for Note Linker.
//!
//! The [`Store`] trait covers the three persisted entities: per-path index
//! records, the fingerprint-keyed embedding cache, and review decisions.
//! Each method is atomic on its own; no operation spans several calls.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Decision, EmbeddingEntry, NoteRecord};

/// Abstract storage backend for Note Linker.
///
/// All operations are async (via `async-trait`). In-memory implementations
/// return immediately-ready futures.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`list_notes`](Store::list_notes) | All index records, path-sorted |
/// | [`get_note`](Store::get_note) | One index record by path |
/// | [`upsert_note`](Store::upsert_note) | Insert or overwrite a path's fingerprint |
/// | [`delete_note`](Store::delete_note) | Remove a path's record |
/// | [`get_embeddings`](Store::get_embeddings) | Cache lookup, hits only |
/// | [`save_embeddings`](Store::save_embeddings) | Write-once cache insert |
/// | [`all_embeddings`](Store::all_embeddings) | Every cached vector |
/// | [`save_decision`](Store::save_decision) | Upsert a decision by pair |
/// | [`list_decisions`](Store::list_decisions) | All decisions |
#[async_trait]
pub trait Store: Send + Sync {
    /// All index records, ordered by path.
    async fn list_notes(&self) -> Result<Vec<NoteRecord>>;

    async fn get_note(&self, path: &str) -> Result<Option<NoteRecord>>;

    /// Insert a record or overwrite its fingerprint and `indexed_at`.
    async fn upsert_note(&self, path: &str, fingerprint: &str) -> Result<()>;

    /// Returns `true` if a record was removed.
    async fn delete_note(&self, path: &str) -> Result<bool>;

    async fn count_notes(&self) -> Result<usize>;

    /// Cached entries for the given fingerprints. Misses are omitted.
    async fn get_embeddings(&self, fingerprints: &[String])
        -> Result<HashMap<String, EmbeddingEntry>>;

    /// Insert cache entries. A fingerprint that already has an entry is
    /// left untouched (first writer wins). Returns the number inserted.
    ///
    /// # Panics
    ///
    /// If `fingerprints` and `vectors` differ in length.
    async fn save_embeddings(
        &self,
        fingerprints: &[String],
        vectors: &[Vec<f32>],
        model: &str,
        dims: usize,
    ) -> Result<usize>;

    /// Every cached vector, keyed by fingerprint.
    async fn all_embeddings(&self) -> Result<HashMap<String, Vec<f32>>>;

    async fn count_embeddings(&self) -> Result<usize>;

    /// Insert a decision or overwrite the existing one for the same pair.
    async fn save_decision(&self, decision: &Decision) -> Result<()>;

    async fn list_decisions(&self) -> Result<Vec<Decision>>;

    async fn count_decisions(&self) -> Result<usize>;
}
