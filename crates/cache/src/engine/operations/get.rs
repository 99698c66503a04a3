//! Get operation for cache

use crate::errors::{CacheError, Result};
use crate::journal::JournalRecord;
use crate::keys::CacheKey;
use crate::snapshot::Snapshot;
use std::fs::File;
use std::io;
use std::sync::Arc;

use super::super::paths::clean_file;
use super::super::types::DiskLruCache;

impl DiskLruCache {
    /// Snapshot of the committed value of `key`
    ///
    /// Returns `None` if the key has never been committed, or if one of its
    /// files has gone missing from the directory; such an entry is removed
    /// unless it is being edited. A hit makes the entry most recently used.
    pub fn get(&self, key: &str) -> Result<Option<Snapshot>> {
        key.validate()?;

        let inner = &self.inner;
        let mut state = inner.state.lock();
        state.ensure_open("get")?;

        let (sequence_number, lengths) = match state.index.peek(key) {
            Some(entry) if entry.is_readable() => {
                (entry.sequence_number(), entry.lengths().to_vec())
            }
            _ => return Ok(None),
        };

        // Open every slot up front so later commits cannot change what the
        // snapshot reads.
        let mut files = Vec::with_capacity(inner.header.value_count);
        for slot in 0..inner.header.value_count {
            let path = clean_file(&inner.directory, key, slot);
            match File::open(&path) {
                Ok(file) => files.push(file),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    tracing::warn!("Value file {} disappeared", path.display());
                    if !state
                        .index
                        .peek(key)
                        .is_some_and(|entry| entry.is_being_edited())
                    {
                        inner.remove_locked(&mut state, key)?;
                    }
                    return Ok(None);
                }
                Err(e) => return Err(CacheError::io(&path, "open value file", e)),
            }
        }

        state.journal("get")?.append(&JournalRecord::Read {
            key: key.to_string(),
        })?;
        state.op_count += 1;
        state.index.touch(key);

        if state.rebuild_required(inner.rebuild_threshold) {
            inner.schedule_cleanup(&mut state);
        }

        Ok(Some(Snapshot::new(
            Arc::clone(inner),
            key.to_string(),
            sequence_number,
            files,
            lengths,
        )))
    }

    /// Whether `key` has a committed value, without touching recency
    pub fn contains(&self, key: &str) -> bool {
        self.inner
            .state
            .lock()
            .index
            .peek(key)
            .is_some_and(|entry| entry.is_readable())
    }
}
