//! Core cache types and structures

use crate::config::CleanupMode;
use crate::entry::EditorId;
use crate::errors::{CacheError, Result};
use crate::index::EntryIndex;
use crate::journal::{JournalHeader, JournalWriter};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

use super::cleanup::{CleanupWorker, Diagnostics};

/// Journaled, size-bounded LRU cache stored in one directory
///
/// Cloning is cheap and yields another handle to the same cache.
#[derive(Clone)]
pub struct DiskLruCache {
    pub(crate) inner: Arc<CacheInner>,
}

pub(crate) struct CacheInner {
    /// Directory owned by this cache
    pub directory: PathBuf,
    /// App version and slot count written to the journal header
    pub header: JournalHeader,
    /// Redundant operations tolerated before the journal is compacted
    pub rebuild_threshold: usize,
    /// Where trim and compaction run
    pub cleanup_mode: CleanupMode,
    /// Index, size counters and journal; one lock for all of them
    pub state: Mutex<CacheState>,
    /// Background cleanup worker, `None` in inline mode or after close
    pub cleanup: Mutex<Option<CleanupWorker>>,
    /// Failures from cleanup, surfaced to callers
    pub diagnostics: Diagnostics,
}

pub(crate) struct CacheState {
    /// Live journal; `None` once the cache is closed
    pub journal: Option<JournalWriter>,
    pub index: EntryIndex,
    pub max_size: u64,
    /// Journal records that compaction would drop
    pub op_count: usize,
    pub next_sequence_number: u64,
    pub next_editor_id: EditorId,
}

impl CacheState {
    pub fn is_open(&self) -> bool {
        self.journal.is_some()
    }

    pub fn ensure_open(&self, operation: &'static str) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(CacheError::closed(operation))
        }
    }

    /// The live journal, or `Closed` if the cache was closed
    pub fn journal(&mut self, operation: &'static str) -> Result<&mut JournalWriter> {
        self.journal
            .as_mut()
            .ok_or_else(|| CacheError::closed(operation))
    }

    /// Compact only once the redundant records outnumber the live entries
    pub fn rebuild_required(&self, threshold: usize) -> bool {
        self.op_count >= threshold && self.op_count >= self.index.len()
    }

    pub fn over_budget(&self) -> bool {
        self.index.size() > self.max_size
    }
}

impl Drop for CacheInner {
    fn drop(&mut self) {
        if let Some(worker) = self.cleanup.get_mut().take() {
            worker.shutdown();
        }

        if let Some(journal) = self.state.get_mut().journal.as_mut() {
            if let Err(e) = journal.flush() {
                tracing::warn!("Failed to flush journal on drop: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for DiskLruCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("DiskLruCache")
            .field("directory", &self.inner.directory)
            .field("app_version", &self.inner.header.app_version)
            .field("value_count", &self.inner.header.value_count)
            .field("size", &state.index.size())
            .field("max_size", &state.max_size)
            .field("entry_count", &state.index.len())
            .field("open", &state.is_open())
            .finish()
    }
}
