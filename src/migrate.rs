use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create every table and index if missing. Safe to call repeatedly.
pub async fn apply(pool: &SqlitePool) -> Result<()> {
    // One row per vault path, pointing at the content hash last indexed
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notes (
            path TEXT PRIMARY KEY,
            fingerprint TEXT NOT NULL,
            indexed_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Content-addressed vector cache, never deleted by indexing
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS embeddings (
            fingerprint TEXT PRIMARY KEY,
            embedding BLOB NOT NULL,
            model TEXT NOT NULL,
            dims INTEGER NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS decisions (
            path_a TEXT NOT NULL,
            path_b TEXT NOT NULL,
            verdict TEXT NOT NULL,
            hash_a TEXT NOT NULL,
            hash_b TEXT NOT NULL,
            decided_at INTEGER NOT NULL,
            PRIMARY KEY (path_a, path_b)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_notes_fingerprint ON notes(fingerprint)")
        .execute(pool)
        .await?;

    Ok(())
}
