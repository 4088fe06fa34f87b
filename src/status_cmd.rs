//! `nlink status`: compare the vault with the index without embedding.

use anyhow::Result;

use note_linker_core::indexer::{indexing_status, IndexingStatus};

use crate::config::Config;
use crate::embedding::configured_model_name;
use crate::scanner::{ensure_vault, VaultScanner};
use crate::sqlite_store::SqliteStore;

pub async fn run_status(config: &Config) -> Result<()> {
    let status = vault_status(config).await?;
    let db_path = config.db_path();
    let db_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    println!("Note Linker Status");
    println!("==================");
    println!();
    println!("  Vault:       {}", config.vault.path.display());
    println!("  Database:    {}", db_path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!(
        "  Model:       {} ({})",
        configured_model_name(&config.embedding),
        config.embedding.provider
    );
    println!();
    println!("  Notes in vault:     {}", status.total_notes_in_vault);
    println!("  Notes indexed:      {}", status.notes_indexed);
    println!("  Needing indexing:   {}", status.notes_needing_indexing);
    println!("  Embeddings cached:  {}", status.embeddings_cached);
    println!("  Decisions recorded: {}", status.decisions_recorded);
    Ok(())
}

pub async fn vault_status(config: &Config) -> Result<IndexingStatus> {
    ensure_vault(&config.vault.path)?;
    let store = SqliteStore::open(config).await?;
    let scanner = VaultScanner::from_config(config);
    let status = indexing_status(&store, &scanner).await;
    store.close().await;
    status
}

fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.1} GB", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(12), "12 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1_048_576), "3.0 MB");
    }
}
