//! `nlink candidates`: rank unlinked, undecided note pairs.

use std::sync::Arc;

use anyhow::Result;

use note_linker_core::candidate::{CandidateRanker, CandidateReport};
use note_linker_core::indexer::NoteSource;
use note_linker_core::lexical::Bm25Scorer;

use crate::config::Config;
use crate::lock::IndexFileLock;
use crate::scanner::{ensure_vault, VaultScanner};
use crate::sqlite_store::SqliteStore;

pub async fn run_candidates(config: &Config, limit: Option<usize>, json: bool) -> Result<()> {
    let mut report = rank_candidates(config).await?;
    report
        .candidates
        .truncate(limit.unwrap_or(config.ranking.limit));

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.candidates.is_empty() {
        println!("No candidates.");
    }
    for (i, pair) in report.candidates.iter().enumerate() {
        println!("{}. {} <-> {}", i + 1, pair.note_a_path, pair.note_b_path);
        println!("   {}", pair.explanation());
    }
    eprintln!(
        "{} notes ranked, {} pairs considered, {} already linked, {} decided",
        report.notes_ranked, report.pairs_considered, report.removed_linked, report.removed_decided
    );
    Ok(())
}

/// Full ranking over the current index. Waits for a running index to
/// finish so the snapshot is consistent.
pub async fn rank_candidates(config: &Config) -> Result<CandidateReport> {
    ensure_vault(&config.vault.path)?;
    let lock_path = config.lock_path();
    let _lock = tokio::task::spawn_blocking(move || IndexFileLock::shared(&lock_path)).await??;

    let store = Arc::new(SqliteStore::open(config).await?);
    let snapshot = VaultScanner::from_config(config).scan()?;

    let ranker = CandidateRanker::new(store.clone(), Arc::new(Bm25Scorer::default()))
        .with_rrf_k(config.ranking.rrf_k);
    let report = ranker.rank(&snapshot).await;

    store.close().await;
    report
}
