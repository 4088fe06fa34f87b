//! Incremental indexing.
//!
//! [`Indexer::run`] brings the stored index in line with the vault:
//!
//! 1. **Scanning**: read the current snapshot from a [`NoteSource`].
//! 2. **Diffing**: classify notes against stored records ([`diff::classify`]).
//! 3. **Embedding**: look up `new ∪ changed` fingerprints in the cache, embed
//!    the misses (deduplicated by fingerprint) in fixed-size batches, and
//!    after each batch write its cache entries, then its notes' records.
//! 4. **Storing**: write records for notes served from cache and remove
//!    records of deleted paths. Cache entries are never evicted.
//! 5. **Complete** with an [`IndexingSummary`].
//!
//! A failure at any step ends the run with a `Failed` event and returns
//! the error. Batches committed before the failure stay committed.
//!
//! Only one run per [`Indexer`] (and its clones) may be active; a second
//! call fails fast with [`LinkerError::AlreadyRunning`] and emits no events.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::diff::{self, FingerprintedNote, IndexDiff};
use crate::embedding::EmbeddingProvider;
use crate::error::LinkerError;
use crate::guard::IndexRunLock;
use crate::markdown::prepare_note_text;
use crate::models::{title_from_path, Note};
use crate::progress::{IndexPhase, IndexProgressEvent, IndexProgressReporter};
use crate::store::Store;

/// Number of texts sent to the embedding provider per call.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Supplies the current vault snapshot.
pub trait NoteSource: Send + Sync {
    fn scan(&self) -> Result<Vec<Note>>;
}

impl NoteSource for Vec<Note> {
    fn scan(&self) -> Result<Vec<Note>> {
        Ok(self.clone())
    }
}

/// Counts reported when an indexing run completes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IndexingSummary {
    pub notes_added: usize,
    pub notes_updated: usize,
    pub notes_deleted: usize,
    pub notes_unchanged: usize,
    pub embeddings_computed: usize,
    /// New or changed notes whose embedding was already cached.
    pub embeddings_cached: usize,
    pub total_notes_indexed: usize,
}

/// Read-only comparison of the vault against the index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IndexingStatus {
    pub total_notes_in_vault: usize,
    pub notes_indexed: usize,
    pub notes_needing_indexing: usize,
    pub embeddings_cached: usize,
    pub decisions_recorded: usize,
}

/// Runs incremental indexing against a store and an embedding provider.
#[derive(Clone)]
pub struct Indexer {
    store: Arc<dyn Store>,
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
    lock: IndexRunLock,
}

impl Indexer {
    pub fn new(store: Arc<dyn Store>, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            store,
            provider,
            batch_size: DEFAULT_BATCH_SIZE,
            lock: IndexRunLock::new(),
        }
    }

    /// Set the embedding batch size. Values below 1 are raised to 1.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Share an existing run lock, e.g. one owned by a long-lived service.
    pub fn with_lock(mut self, lock: IndexRunLock) -> Self {
        self.lock = lock;
        self
    }

    pub fn lock(&self) -> &IndexRunLock {
        &self.lock
    }

    /// Run one indexing pass. See the module docs for the phase sequence.
    pub async fn run(
        &self,
        source: &dyn NoteSource,
        reporter: &dyn IndexProgressReporter,
    ) -> Result<IndexingSummary> {
        let _guard = self.lock.try_acquire()?;

        match self.run_phases(source, reporter).await {
            Ok(summary) => {
                info!(
                    added = summary.notes_added,
                    updated = summary.notes_updated,
                    deleted = summary.notes_deleted,
                    unchanged = summary.notes_unchanged,
                    computed = summary.embeddings_computed,
                    cached = summary.embeddings_cached,
                    "indexing complete"
                );
                reporter.report(IndexProgressEvent::complete(summary.clone()));
                Ok(summary)
            }
            Err(e) => {
                warn!(error = %e, "indexing failed");
                reporter.report(IndexProgressEvent::failed(format!("{:#}", e)));
                Err(e)
            }
        }
    }

    async fn run_phases(
        &self,
        source: &dyn NoteSource,
        reporter: &dyn IndexProgressReporter,
    ) -> Result<IndexingSummary> {
        let snapshot = source.scan()?;
        reporter.report(IndexProgressEvent::new(
            IndexPhase::Scanning,
            snapshot.len(),
            snapshot.len(),
            format!("Found {} notes", snapshot.len()),
        ));

        let records = self.store.list_notes().await?;
        let diff = diff::classify(&snapshot, &records);
        reporter.report(IndexProgressEvent::new(
            IndexPhase::Diffing,
            diff.needs_indexing(),
            snapshot.len(),
            format!(
                "Found {} new, {} changed, {} deleted, {} unchanged",
                diff.new.len(),
                diff.changed.len(),
                diff.deleted.len(),
                diff.unchanged.len()
            ),
        ));

        let to_embed = diff.to_embed();
        let (cached_paths, embeddings_computed) = self.embed_missing(&to_embed, reporter).await?;

        let stored = self.store_cached(&to_embed, &cached_paths).await?;
        let removed = self.remove_deleted(&diff).await?;
        reporter.report(IndexProgressEvent::new(
            IndexPhase::Storing,
            stored + removed,
            stored + removed,
            format!("Stored {} cached notes, removed {} deleted", stored, removed),
        ));

        Ok(IndexingSummary {
            notes_added: diff.new.len(),
            notes_updated: diff.changed.len(),
            notes_deleted: diff.deleted.len(),
            notes_unchanged: diff.unchanged.len(),
            embeddings_computed,
            embeddings_cached: cached_paths.len(),
            total_notes_indexed: self.store.count_notes().await?,
        })
    }

    /// Embed every cache miss in batches and record the notes of each batch.
    ///
    /// Returns the paths served from cache and the number of embeddings
    /// computed.
    async fn embed_missing(
        &self,
        to_embed: &[&FingerprintedNote],
        reporter: &dyn IndexProgressReporter,
    ) -> Result<(HashSet<String>, usize)> {
        let fingerprints: Vec<String> = to_embed
            .iter()
            .map(|n| n.fingerprint.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let hits = if fingerprints.is_empty() {
            HashMap::new()
        } else {
            self.store.get_embeddings(&fingerprints).await?
        };

        for entry in hits.values() {
            if entry.model != self.provider.model_name() {
                warn!(
                    fingerprint = %entry.fingerprint,
                    cached_model = %entry.model,
                    configured_model = %self.provider.model_name(),
                    "reusing embedding computed with a different model"
                );
            }
        }

        let mut cached_paths = HashSet::new();
        // Misses in path order, one text per distinct fingerprint.
        let mut misses: Vec<(String, String)> = Vec::new();
        let mut paths_by_fp: HashMap<String, Vec<String>> = HashMap::new();
        for note in to_embed {
            if hits.contains_key(&note.fingerprint) {
                cached_paths.insert(note.path.clone());
                continue;
            }
            let paths = paths_by_fp.entry(note.fingerprint.clone()).or_default();
            if paths.is_empty() {
                let text = prepare_note_text(&title_from_path(&note.path), &note.content);
                misses.push((note.fingerprint.clone(), text));
            }
            paths.push(note.path.clone());
        }

        let total = misses.len();
        if total == 0 {
            reporter.report(IndexProgressEvent::new(
                IndexPhase::Embedding,
                0,
                0,
                "All embeddings cached",
            ));
            return Ok((cached_paths, 0));
        }

        let mut processed = 0;
        for batch in misses.chunks(self.batch_size) {
            let (batch_fps, texts): (Vec<String>, Vec<String>) = batch.iter().cloned().unzip();

            let vectors = self
                .provider
                .embed(&texts)
                .await
                .map_err(|e| LinkerError::Embedding(format!("{:#}", e)))?;
            if vectors.len() != texts.len() {
                return Err(LinkerError::EmbeddingCountMismatch {
                    expected: texts.len(),
                    got: vectors.len(),
                }
                .into());
            }

            self.store
                .save_embeddings(
                    &batch_fps,
                    &vectors,
                    self.provider.model_name(),
                    self.provider.dims(),
                )
                .await?;
            for fp in &batch_fps {
                for path in paths_by_fp.get(fp).into_iter().flatten() {
                    self.store.upsert_note(path, fp).await?;
                }
            }

            processed += batch.len();
            debug!(processed, total, "embedded batch");
            reporter.report(IndexProgressEvent::new(
                IndexPhase::Embedding,
                processed,
                total,
                format!("Embedded {}/{} notes", processed, total),
            ));
        }

        Ok((cached_paths, total))
    }

    async fn store_cached(
        &self,
        to_embed: &[&FingerprintedNote],
        cached_paths: &HashSet<String>,
    ) -> Result<usize> {
        let mut stored = 0;
        for note in to_embed.iter().filter(|n| cached_paths.contains(&n.path)) {
            self.store.upsert_note(&note.path, &note.fingerprint).await?;
            stored += 1;
        }
        Ok(stored)
    }

    async fn remove_deleted(&self, diff: &IndexDiff) -> Result<usize> {
        for path in &diff.deleted {
            self.store.delete_note(path).await?;
        }
        Ok(diff.deleted.len())
    }

    /// Compare a fresh scan with the index without embedding anything.
    pub async fn status(&self, source: &dyn NoteSource) -> Result<IndexingStatus> {
        indexing_status(self.store.as_ref(), source).await
    }
}

/// Compare a fresh scan with the index without embedding anything.
pub async fn indexing_status(store: &dyn Store, source: &dyn NoteSource) -> Result<IndexingStatus> {
    let snapshot = source.scan()?;
    let records = store.list_notes().await?;
    let diff = diff::classify(&snapshot, &records);
    Ok(IndexingStatus {
        total_notes_in_vault: snapshot.len(),
        notes_indexed: records.len(),
        notes_needing_indexing: diff.needs_indexing(),
        embeddings_cached: store.count_embeddings().await?,
        decisions_recorded: store.count_decisions().await?,
    })
}
