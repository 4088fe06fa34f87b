//! In-memory [`Store`] implementation for tests and embedding in other tools.
//!
//! Uses `BTreeMap`s behind `std::sync::RwLock` so listings come back in
//! key order, matching the SQLite store's `ORDER BY`.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

use crate::models::{Decision, EmbeddingEntry, NoteRecord};

use super::Store;

/// In-memory store.
pub struct InMemoryStore {
    notes: RwLock<BTreeMap<String, NoteRecord>>,
    embeddings: RwLock<BTreeMap<String, EmbeddingEntry>>,
    decisions: RwLock<BTreeMap<(String, String), Decision>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            notes: RwLock::new(BTreeMap::new()),
            embeddings: RwLock::new(BTreeMap::new()),
            decisions: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn list_notes(&self) -> Result<Vec<NoteRecord>> {
        Ok(self.notes.read().unwrap().values().cloned().collect())
    }

    async fn get_note(&self, path: &str) -> Result<Option<NoteRecord>> {
        Ok(self.notes.read().unwrap().get(path).cloned())
    }

    async fn upsert_note(&self, path: &str, fingerprint: &str) -> Result<()> {
        self.notes.write().unwrap().insert(
            path.to_string(),
            NoteRecord {
                path: path.to_string(),
                fingerprint: fingerprint.to_string(),
                indexed_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn delete_note(&self, path: &str) -> Result<bool> {
        Ok(self.notes.write().unwrap().remove(path).is_some())
    }

    async fn count_notes(&self) -> Result<usize> {
        Ok(self.notes.read().unwrap().len())
    }

    async fn get_embeddings(
        &self,
        fingerprints: &[String],
    ) -> Result<HashMap<String, EmbeddingEntry>> {
        let cache = self.embeddings.read().unwrap();
        Ok(fingerprints
            .iter()
            .filter_map(|fp| cache.get(fp).map(|e| (fp.clone(), e.clone())))
            .collect())
    }

    async fn save_embeddings(
        &self,
        fingerprints: &[String],
        vectors: &[Vec<f32>],
        model: &str,
        dims: usize,
    ) -> Result<usize> {
        assert_eq!(
            fingerprints.len(),
            vectors.len(),
            "fingerprints and vectors must have the same length"
        );
        let mut cache = self.embeddings.write().unwrap();
        let mut inserted = 0;
        for (fp, vector) in fingerprints.iter().zip(vectors) {
            if cache.contains_key(fp) {
                continue;
            }
            cache.insert(
                fp.clone(),
                EmbeddingEntry {
                    fingerprint: fp.clone(),
                    vector: vector.clone(),
                    model: model.to_string(),
                    dims,
                    created_at: Utc::now(),
                },
            );
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn all_embeddings(&self) -> Result<HashMap<String, Vec<f32>>> {
        Ok(self
            .embeddings
            .read()
            .unwrap()
            .iter()
            .map(|(fp, e)| (fp.clone(), e.vector.clone()))
            .collect())
    }

    async fn count_embeddings(&self) -> Result<usize> {
        Ok(self.embeddings.read().unwrap().len())
    }

    async fn save_decision(&self, decision: &Decision) -> Result<()> {
        self.decisions.write().unwrap().insert(
            (decision.path_a.clone(), decision.path_b.clone()),
            decision.clone(),
        );
        Ok(())
    }

    async fn list_decisions(&self) -> Result<Vec<Decision>> {
        Ok(self.decisions.read().unwrap().values().cloned().collect())
    }

    async fn count_decisions(&self) -> Result<usize> {
        Ok(self.decisions.read().unwrap().len())
    }
}
