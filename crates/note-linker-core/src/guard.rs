//! Exclusive indexing-run guard.
//!
//! [`IndexRunLock::try_acquire`] either hands out an [`IndexRunGuard`] or
//! fails immediately with [`LinkerError::AlreadyRunning`]; callers are
//! never queued. The lock is released when the guard drops, on every exit
//! path including `?` returns and unwinding panics.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::LinkerError;

/// Shared flag marking an indexing run in progress. Cheap to clone.
#[derive(Clone, Debug, Default)]
pub struct IndexRunLock {
    running: Arc<AtomicBool>,
}

impl IndexRunLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Result<IndexRunGuard, LinkerError> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| LinkerError::AlreadyRunning)?;
        Ok(IndexRunGuard {
            running: Arc::clone(&self.running),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Proof of holding the run lock. Releases it on drop.
#[derive(Debug)]
pub struct IndexRunGuard {
    running: Arc<AtomicBool>,
}

impl Drop for IndexRunGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_rejected() {
        let lock = IndexRunLock::new();
        let guard = lock.try_acquire().unwrap();
        assert!(lock.is_running());
        assert_eq!(lock.try_acquire().unwrap_err(), LinkerError::AlreadyRunning);
        drop(guard);
        assert!(!lock.is_running());
        assert!(lock.try_acquire().is_ok());
    }

    #[test]
    fn test_released_on_error_path() {
        fn run(lock: &IndexRunLock) -> Result<(), LinkerError> {
            let _guard = lock.try_acquire()?;
            Err(LinkerError::Embedding("boom".to_string()))
        }

        let lock = IndexRunLock::new();
        assert!(run(&lock).is_err());
        assert!(!lock.is_running());
    }

    #[test]
    fn test_released_on_panic() {
        let lock = IndexRunLock::new();
        let cloned = lock.clone();
        let result = std::thread::spawn(move || {
            let _guard = cloned.try_acquire().unwrap();
            panic!("indexing blew up");
        })
        .join();
        assert!(result.is_err());
        assert!(!lock.is_running());
    }

    #[test]
    fn test_clones_share_state() {
        let lock = IndexRunLock::new();
        let other = lock.clone();
        let _guard = lock.try_acquire().unwrap();
        assert!(other.try_acquire().is_err());
    }
}
