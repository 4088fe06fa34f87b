//! SQLite-backed [`Store`] implementation.
//!
//! Timestamps are stored as unix seconds. Vectors are stored as
//! little-endian `f32` BLOBs via [`vec_to_blob`].

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use note_linker_core::embedding::{blob_to_vec, vec_to_blob};
use note_linker_core::models::{Decision, EmbeddingEntry, NoteRecord, Verdict};
use note_linker_core::store::Store;

use crate::config::Config;
use crate::{db, migrate};

/// SQLite implementation of the [`Store`] trait over the `notes`,
/// `embeddings` and `decisions` tables.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the configured database, creating the schema if missing.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::apply(&pool).await?;
        Ok(Self::new(pool))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn from_ts(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_default()
}

fn note_from_row(row: &SqliteRow) -> NoteRecord {
    NoteRecord {
        path: row.get("path"),
        fingerprint: row.get("fingerprint"),
        indexed_at: from_ts(row.get("indexed_at")),
    }
}

fn decision_from_row(row: &SqliteRow) -> Result<Decision> {
    let verdict: String = row.get("verdict");
    let verdict = Verdict::parse(&verdict)
        .with_context(|| format!("Unknown verdict in database: {}", verdict))?;
    Ok(Decision {
        path_a: row.get("path_a"),
        path_b: row.get("path_b"),
        verdict,
        hash_a: row.get("hash_a"),
        hash_b: row.get("hash_b"),
        decided_at: from_ts(row.get("decided_at")),
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn list_notes(&self) -> Result<Vec<NoteRecord>> {
        let rows = sqlx::query("SELECT path, fingerprint, indexed_at FROM notes ORDER BY path")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(note_from_row).collect())
    }

    async fn get_note(&self, path: &str) -> Result<Option<NoteRecord>> {
        let row = sqlx::query("SELECT path, fingerprint, indexed_at FROM notes WHERE path = ?")
            .bind(path)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(note_from_row))
    }

    async fn upsert_note(&self, path: &str, fingerprint: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notes (path, fingerprint, indexed_at)
            VALUES (?, ?, ?)
            ON CONFLICT(path) DO UPDATE SET
                fingerprint = excluded.fingerprint,
                indexed_at = excluded.indexed_at
            "#,
        )
        .bind(path)
        .bind(fingerprint)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_note(&self, path: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE path = ?")
            .bind(path)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_notes(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notes")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    async fn get_embeddings(
        &self,
        fingerprints: &[String],
    ) -> Result<HashMap<String, EmbeddingEntry>> {
        let mut hits = HashMap::new();
        for fp in fingerprints {
            if hits.contains_key(fp) {
                continue;
            }
            let row = sqlx::query(
                "SELECT embedding, model, dims, created_at FROM embeddings WHERE fingerprint = ?",
            )
            .bind(fp)
            .fetch_optional(&self.pool)
            .await?;

            if let Some(row) = row {
                let blob: Vec<u8> = row.get("embedding");
                let dims: i64 = row.get("dims");
                hits.insert(
                    fp.clone(),
                    EmbeddingEntry {
                        fingerprint: fp.clone(),
                        vector: blob_to_vec(&blob),
                        model: row.get("model"),
                        dims: dims as usize,
                        created_at: from_ts(row.get("created_at")),
                    },
                );
            }
        }
        Ok(hits)
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

        let now = Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for (fp, vector) in fingerprints.iter().zip(vectors) {
            let result = sqlx::query(
                r#"
                INSERT INTO embeddings (fingerprint, embedding, model, dims, created_at)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(fingerprint) DO NOTHING
                "#,
            )
            .bind(fp)
            .bind(vec_to_blob(vector))
            .bind(model)
            .bind(dims as i64)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected() as usize;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn all_embeddings(&self) -> Result<HashMap<String, Vec<f32>>> {
        let rows = sqlx::query("SELECT fingerprint, embedding FROM embeddings")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .iter()
            .map(|row| {
                let fp: String = row.get("fingerprint");
                let blob: Vec<u8> = row.get("embedding");
                (fp, blob_to_vec(&blob))
            })
            .collect())
    }

    async fn count_embeddings(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM embeddings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    async fn save_decision(&self, decision: &Decision) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO decisions (path_a, path_b, verdict, hash_a, hash_b, decided_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(path_a, path_b) DO UPDATE SET
                verdict = excluded.verdict,
                hash_a = excluded.hash_a,
                hash_b = excluded.hash_b,
                decided_at = excluded.decided_at
            "#,
        )
        .bind(&decision.path_a)
        .bind(&decision.path_b)
        .bind(decision.verdict.as_str())
        .bind(&decision.hash_a)
        .bind(&decision.hash_b)
        .bind(decision.decided_at.timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_decisions(&self) -> Result<Vec<Decision>> {
        let rows = sqlx::query(
            "SELECT path_a, path_b, verdict, hash_a, hash_b, decided_at FROM decisions ORDER BY path_a, path_b",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(decision_from_row).collect()
    }

    async fn count_decisions(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM decisions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }
}
