//! Remove operation for cache

use crate::errors::{CacheError, RecoveryHint, Result};
use crate::journal::JournalRecord;
use crate::keys::CacheKey;
use std::fs;
use std::io;

use super::super::paths::{clean_file, dirty_file};
use super::super::types::{CacheInner, CacheState, DiskLruCache};

impl DiskLruCache {
    /// Remove `key` and its files
    ///
    /// Returns `false` if the key is not in the cache. Fails with
    /// `EditInProgress` while an editor owns the key.
    pub fn remove(&self, key: &str) -> Result<bool> {
        key.validate()?;

        let mut state = self.inner.state.lock();
        state.ensure_open("remove")?;

        let removed = self.inner.remove_locked(&mut state, key)?;
        if removed && state.rebuild_required(self.inner.rebuild_threshold) {
            self.inner.schedule_cleanup(&mut state);
        }

        Ok(removed)
    }
}

impl CacheInner {
    /// Journal a `REMOVE`, delete the slot files and drop the entry
    ///
    /// File deletion failures are logged and reported; the entry is gone
    /// from the index either way.
    pub(crate) fn remove_locked(&self, state: &mut CacheState, key: &str) -> Result<bool> {
        match state.index.peek(key) {
            None => return Ok(false),
            Some(entry) if entry.is_being_edited() => {
                return Err(CacheError::EditInProgress {
                    key: key.to_string(),
                    recovery_hint: RecoveryHint::FinishEdit,
                });
            }
            Some(_) => {}
        }

        state.journal("remove")?.append(&JournalRecord::Remove {
            key: key.to_string(),
        })?;
        state.op_count += 1;

        self.delete_clean_files(key);
        state.index.remove(key);

        tracing::trace!("Removed {}", key);
        Ok(true)
    }

    /// Delete every committed slot file of `key`
    pub(crate) fn delete_clean_files(&self, key: &str) {
        for slot in 0..self.header.value_count {
            self.delete_file(&clean_file(&self.directory, key, slot), key);
        }
    }

    /// Delete every temporary slot file of `key`
    pub(crate) fn delete_dirty_files(&self, key: &str) {
        for slot in 0..self.header.value_count {
            self.delete_file(&dirty_file(&self.directory, key, slot), key);
        }
    }

    fn delete_file(&self, path: &std::path::Path, key: &str) {
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                let err = CacheError::io(path, "delete value file", e);
                tracing::warn!("{}", err);
                self.diagnostics.report("delete value file", Some(key), &err);
            }
        }
    }
}
