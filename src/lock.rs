//! Cross-process index lock on `<state_dir>/index.lock`.
//!
//! Indexing holds the file exclusively and never waits. Ranking takes a
//! shared lock and blocks until any running index finishes. Locks release
//! when the returned [`IndexFileLock`] drops.

use std::fs::{File, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use fs2::FileExt;

use note_linker_core::error::LinkerError;

pub struct IndexFileLock {
    file: File,
}

fn open_lock_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("Failed to open lock file: {}", path.display()))
}

impl IndexFileLock {
    /// Exclusive, non-blocking. A held lock maps to
    /// [`LinkerError::AlreadyRunning`].
    pub fn try_exclusive(path: &Path) -> Result<Self> {
        let file = open_lock_file(path)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self { file }),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                Err(LinkerError::AlreadyRunning.into())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to lock {}", path.display())),
        }
    }

    /// Shared, blocking until no exclusive holder remains.
    pub fn shared(path: &Path) -> Result<Self> {
        let file = open_lock_file(path)?;
        file.lock_shared()
            .with_context(|| format!("Failed to lock {}", path.display()))?;
        Ok(Self { file })
    }
}

impl Drop for IndexFileLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use note_linker_core::error::is_already_running;
    use tempfile::TempDir;

    #[test]
    fn test_second_exclusive_is_already_running() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("index.lock");

        let held = IndexFileLock::try_exclusive(&path).unwrap();
        let err = IndexFileLock::try_exclusive(&path).err().unwrap();
        assert!(is_already_running(&err));

        drop(held);
        assert!(IndexFileLock::try_exclusive(&path).is_ok());
    }

    #[test]
    fn test_shared_blocks_exclusive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.lock");

        let reader = IndexFileLock::shared(&path).unwrap();
        assert!(IndexFileLock::try_exclusive(&path).is_err());
        drop(reader);
        assert!(IndexFileLock::try_exclusive(&path).is_ok());
    }
}
