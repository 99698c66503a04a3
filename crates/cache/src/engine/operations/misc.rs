//! Accessors and lifecycle operations

use crate::engine::Diagnostic;
use crate::errors::{CacheError, Result};
use crossbeam::channel::Receiver;
use std::fs;
use std::path::Path;

use super::super::types::DiskLruCache;

impl DiskLruCache {
    /// Directory owned by this cache
    pub fn directory(&self) -> &Path {
        &self.inner.directory
    }

    pub fn app_version(&self) -> u32 {
        self.inner.header.app_version
    }

    /// Number of value slots per entry
    pub fn value_count(&self) -> usize {
        self.inner.header.value_count
    }

    /// Bytes currently committed across all readable entries
    pub fn size(&self) -> u64 {
        self.inner.state.lock().index.size()
    }

    pub fn max_size(&self) -> u64 {
        self.inner.state.lock().max_size
    }

    /// Change the size budget; shrinking it schedules a trim
    pub fn set_max_size(&self, max_size: u64) -> Result<()> {
        let mut state = self.inner.state.lock();
        state.ensure_open("set max size")?;

        state.max_size = max_size;
        tracing::debug!("Cache size budget set to {}", max_size);

        if state.over_budget() {
            self.inner.schedule_cleanup(&mut state);
        }
        Ok(())
    }

    /// Number of entries with a committed value
    pub fn len(&self) -> usize {
        self.inner
            .state
            .lock()
            .index
            .iter()
            .filter(|(_, entry)| entry.is_readable())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys with a committed value, least recently used first
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .state
            .lock()
            .index
            .iter()
            .filter(|(_, entry)| entry.is_readable())
            .map(|(key, _)| key.to_string())
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        !self.inner.state.lock().is_open()
    }

    /// Failures from eviction and journal compaction
    ///
    /// Every receiver shares one bounded queue; reports made while it is
    /// full are dropped.
    pub fn diagnostics(&self) -> Receiver<Diagnostic> {
        self.inner.diagnostics.subscribe()
    }

    /// Trim to budget and flush the journal
    pub fn flush(&self) -> Result<()> {
        let mut state = self.inner.state.lock();
        state.ensure_open("flush")?;

        self.inner.trim_locked(&mut state);
        state.journal("flush")?.flush()
    }

    /// Stop cleanup, trim to budget and release the journal
    ///
    /// Closing twice is a no-op. Every later operation fails with `Closed`.
    pub fn close(&self) -> Result<()> {
        // Taken in its own statement so the worker lock is not held while
        // joining.
        let worker = self.inner.cleanup.lock().take();
        if let Some(worker) = worker {
            worker.shutdown();
        }

        let mut state = self.inner.state.lock();
        if !state.is_open() {
            return Ok(());
        }

        self.inner.trim_locked(&mut state);

        let live_editors = state
            .index
            .iter()
            .filter(|(_, entry)| entry.is_being_edited())
            .count();
        if live_editors > 0 {
            tracing::warn!(
                "Closing cache with {} live editor(s); they can no longer commit",
                live_editors
            );
        }

        let synced = match state.journal.as_mut() {
            Some(journal) => journal.sync(),
            None => Ok(()),
        };
        state.journal = None;

        tracing::info!("Closed cache at {}", self.inner.directory.display());
        synced
    }

    /// Close the cache and delete its directory, including files the cache
    /// did not create
    pub fn delete(&self) -> Result<()> {
        self.close()?;

        match fs::remove_dir_all(&self.inner.directory) {
            Ok(()) => {
                tracing::info!("Deleted cache at {}", self.inner.directory.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::io(
                &self.inner.directory,
                "delete cache directory",
                e,
            )),
        }
    }
}
