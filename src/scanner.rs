//! Vault scanner: walks the vault root and reads every Markdown note.

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use note_linker_core::error::LinkerError;
use note_linker_core::indexer::NoteSource;
use note_linker_core::models::Note;

use crate::config::{Config, STATE_DIR};

/// A [`NoteSource`] over a directory of Markdown files.
pub struct VaultScanner {
    root: PathBuf,
    exclude_globs: Vec<String>,
}

impl VaultScanner {
    pub fn new(root: impl Into<PathBuf>, exclude_globs: Vec<String>) -> Self {
        Self {
            root: root.into(),
            exclude_globs,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.vault.path.clone(),
            config.vault.exclude_globs.clone(),
        )
    }
}

impl NoteSource for VaultScanner {
    fn scan(&self) -> Result<Vec<Note>> {
        scan_vault(&self.root, &self.exclude_globs)
    }
}

/// Fails with [`LinkerError::VaultNotFound`] unless `root` is a directory.
/// Commands call this before creating anything under the state dir.
pub fn ensure_vault(root: &Path) -> Result<()> {
    if !root.is_dir() {
        return Err(LinkerError::VaultNotFound(root.display().to_string()).into());
    }
    Ok(())
}

/// Every `*.md` file under `root`, keyed by `/`-separated relative path
/// and sorted by it.
pub fn scan_vault(root: &Path, exclude_globs: &[String]) -> Result<Vec<Note>> {
    ensure_vault(root)?;

    let mut excludes = vec![
        "**/.obsidian/**".to_string(),
        format!("**/{}/**", STATE_DIR),
        ".obsidian/**".to_string(),
        format!("{}/**", STATE_DIR),
    ];
    excludes.extend(exclude_globs.iter().cloned());
    let exclude_set = build_globset(&excludes)?;

    let mut notes = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if exclude_set.is_match(&rel_str) {
            continue;
        }

        let bytes = std::fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes).into_owned();
        notes.push(Note::new(rel_str, content));
    }

    notes.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(notes = notes.len(), root = %root.display(), "Scanned vault");

    Ok(notes)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
