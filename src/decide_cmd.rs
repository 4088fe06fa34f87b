//! `nlink decide`: record a verdict on a pair, pinned to current content.

use anyhow::{bail, Result};

use note_linker_core::indexer::NoteSource;
use note_linker_core::models::{Decision, Verdict};
use note_linker_core::store::Store;

use crate::config::Config;
use crate::scanner::VaultScanner;
use crate::sqlite_store::SqliteStore;

pub async fn run_decide(config: &Config, a: &str, b: &str, verdict: &str) -> Result<()> {
    let decision = record_decision(config, a, b, verdict).await?;
    println!(
        "Recorded {} for {} <-> {}",
        decision.verdict.as_str(),
        decision.path_a,
        decision.path_b
    );
    Ok(())
}

pub async fn record_decision(config: &Config, a: &str, b: &str, verdict: &str) -> Result<Decision> {
    let Some(verdict) = Verdict::parse(verdict) else {
        bail!("Invalid verdict '{}': expected yes or no", verdict);
    };
    if a == b {
        bail!("Cannot decide a note against itself: {}", a);
    }

    let snapshot = VaultScanner::from_config(config).scan()?;
    let hash_of = |path: &str| -> Result<String> {
        match snapshot.iter().find(|n| n.path == path) {
            Some(note) => Ok(note.fingerprint()),
            None => bail!("Note not found in vault: {}", path),
        }
    };
    let decision = Decision::new(a, b, verdict, &hash_of(a)?, &hash_of(b)?);

    let store = SqliteStore::open(config).await?;
    store.save_decision(&decision).await?;
    store.close().await;

    tracing::info!(
        a = %decision.path_a,
        b = %decision.path_b,
        verdict = decision.verdict.as_str(),
        "recorded decision"
    );
    Ok(decision)
}
