//! Cache cleanup: trim to budget, then compact the journal when required

mod background;

pub(crate) use background::CleanupWorker;

use crate::config::CleanupMode;
use crate::errors::Result;
use crate::index::EntryIndex;
use crate::journal::{self, JournalRecord};
use crossbeam::channel::{self, Receiver, Sender, TrySendError};

use super::types::{CacheInner, CacheState};

/// Capacity of the diagnostics channel; newer reports are dropped when full
const DIAGNOSTICS_CAPACITY: usize = 64;

/// A failure that happened away from any caller
///
/// Cleanup runs without a caller to return errors to, so failures such as an
/// undeletable file during eviction or a failed journal compaction are logged
/// and published on [`DiskLruCache::diagnostics`](crate::DiskLruCache::diagnostics).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What the cache was doing
    pub operation: &'static str,
    /// Key involved, if any
    pub key: Option<String>,
    /// Rendered error
    pub message: String,
}

pub(crate) struct Diagnostics {
    sender: Sender<Diagnostic>,
    receiver: Receiver<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        let (sender, receiver) = channel::bounded(DIAGNOSTICS_CAPACITY);
        Self { sender, receiver }
    }

    pub fn report(&self, operation: &'static str, key: Option<&str>, message: impl ToString) {
        let diagnostic = Diagnostic {
            operation,
            key: key.map(str::to_string),
            message: message.to_string(),
        };

        match self.sender.try_send(diagnostic) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                tracing::trace!("Diagnostics channel full, dropping {:?}", dropped);
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    pub fn subscribe(&self) -> Receiver<Diagnostic> {
        self.receiver.clone()
    }
}

impl CacheInner {
    /// Arrange for cleanup after an operation left the cache over budget or
    /// the journal too redundant
    pub(crate) fn schedule_cleanup(&self, state: &mut CacheState) {
        match self.cleanup_mode {
            CleanupMode::Inline => self.cleanup_locked(state),
            CleanupMode::Background => {
                if let Some(worker) = self.cleanup.lock().as_ref() {
                    worker.request();
                }
            }
        }
    }

    /// Schedule cleanup if the current state calls for it
    pub(crate) fn maybe_schedule_cleanup(&self, state: &mut CacheState) {
        if state.over_budget() || state.rebuild_required(self.rebuild_threshold) {
            self.schedule_cleanup(state);
        }
    }

    /// Entry point for the background worker
    pub(crate) fn run_cleanup(&self) {
        let mut state = self.state.lock();
        self.cleanup_locked(&mut state);
    }

    pub(crate) fn cleanup_locked(&self, state: &mut CacheState) {
        if !state.is_open() {
            return;
        }

        self.trim_locked(state);

        if state.rebuild_required(self.rebuild_threshold) {
            match self.rebuild_journal_locked(state) {
                Ok(()) => {}
                Err(e) => {
                    tracing::warn!("Journal compaction failed: {}", e);
                    self.diagnostics.report("compact journal", None, &e);
                }
            }
        }
    }

    /// Replace the journal with one record per live entry
    pub(crate) fn rebuild_journal_locked(&self, state: &mut CacheState) -> Result<()> {
        let records = compacted_records(&state.index);
        let writer = journal::rewrite(&self.directory, &self.header, records)?;

        tracing::debug!(
            "Compacted journal for {} ({} redundant record(s) dropped)",
            self.directory.display(),
            state.op_count
        );

        state.journal = Some(writer);
        state.op_count = 0;
        Ok(())
    }
}

/// Records that rebuild the current index, least recently used first
///
/// A readable entry that is mid-edit gets its `CLEAN` record followed by a
/// `DIRTY` one, so a crash before the edit finishes keeps the committed value.
pub(super) fn compacted_records(index: &EntryIndex) -> Vec<JournalRecord> {
    let mut records = Vec::with_capacity(index.len());

    for (key, entry) in index.iter() {
        if entry.is_readable() {
            records.push(JournalRecord::Clean {
                key: key.to_string(),
                lengths: entry.lengths().to_vec(),
            });
        }
        if entry.is_being_edited() {
            records.push(JournalRecord::Dirty {
                key: key.to_string(),
            });
        }
    }

    records
}
