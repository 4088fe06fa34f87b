//! `nlink index`: incremental indexing under the cross-process lock.

use std::sync::Arc;

use anyhow::Result;

use note_linker_core::embedding::EmbeddingProvider;
use note_linker_core::indexer::{Indexer, IndexingSummary};
use note_linker_core::progress::IndexProgressReporter;

use crate::config::Config;
use crate::embedding::create_provider;
use crate::lock::IndexFileLock;
use crate::progress::ProgressMode;
use crate::scanner::{ensure_vault, VaultScanner};
use crate::sqlite_store::SqliteStore;

pub async fn run_index(config: &Config, progress: ProgressMode) -> Result<()> {
    let reporter = progress.reporter();
    let summary = index_vault(config, reporter.as_ref()).await?;
    print_summary(&summary);
    Ok(())
}

/// Index the configured vault once. Fails with `AlreadyRunning` if another
/// process holds the index lock.
pub async fn index_vault(
    config: &Config,
    reporter: &dyn IndexProgressReporter,
) -> Result<IndexingSummary> {
    ensure_vault(&config.vault.path)?;
    let _lock = IndexFileLock::try_exclusive(&config.lock_path())?;

    let store = Arc::new(SqliteStore::open(config).await?);
    let provider = create_provider(&config.embedding)?;
    tracing::info!(
        vault = %config.vault.path.display(),
        model = %provider.model_name(),
        "indexing vault"
    );

    let indexer = Indexer::new(store.clone(), provider)
        .with_batch_size(config.embedding.batch_size);
    let scanner = VaultScanner::from_config(config);
    let result = indexer.run(&scanner, reporter).await;

    store.close().await;
    result
}

fn print_summary(summary: &IndexingSummary) {
    println!("Indexing complete");
    println!("  added:      {}", summary.notes_added);
    println!("  updated:    {}", summary.notes_updated);
    println!("  deleted:    {}", summary.notes_deleted);
    println!("  unchanged:  {}", summary.notes_unchanged);
    println!(
        "  embeddings: {} computed, {} cached",
        summary.embeddings_computed, summary.embeddings_cached
    );
    println!("  indexed:    {}", summary.total_notes_indexed);
}
