//! Editing one cache entry
//!
//! An [`Editor`] writes new values into temporary files next to the
//! committed ones. Nothing becomes visible to readers until
//! [`Editor::commit`] moves them into place; [`Editor::abort`] or dropping
//! the editor throws them away.

use crate::engine::paths::{clean_file, dirty_file};
use crate::engine::CacheInner;
use crate::entry::EditorId;
use crate::errors::{CacheError, RecoveryHint, Result};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// First write failure seen by any of an editor's writers
type WriteFailure = Mutex<Option<(PathBuf, io::Error)>>;

/// Exclusive handle for changing the value of one key
///
/// Obtained from [`DiskLruCache::edit`](crate::DiskLruCache::edit) or
/// [`Snapshot::edit`](crate::Snapshot::edit). Must be finished with
/// [`commit`](Self::commit) or [`abort`](Self::abort); an editor dropped
/// unfinished is aborted.
pub struct Editor {
    cache: Arc<CacheInner>,
    key: String,
    id: EditorId,
    written: Vec<bool>,
    failure: WriteFailure,
    done: bool,
}

impl Editor {
    pub(crate) fn new(cache: Arc<CacheInner>, key: String, id: EditorId, value_count: usize) -> Self {
        Self {
            cache,
            key,
            id,
            written: vec![false; value_count],
            failure: Mutex::new(None),
            done: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Writer for the new value of `slot`
    ///
    /// Each call truncates the slot's temporary file, so only the bytes of
    /// the last writer opened for a slot are committed.
    pub fn new_stream(&mut self, slot: usize) -> Result<ValueWriter<'_>> {
        self.check_slot(slot)?;
        self.ensure_active()?;
        self.cache.state.lock().ensure_open("open value writer")?;

        let path = dirty_file(&self.cache.directory, &self.key, slot);
        let file = File::create(&path).map_err(|e| CacheError::io(&path, "create value file", e))?;
        self.written[slot] = true;

        Ok(ValueWriter {
            path,
            writer: Some(BufWriter::new(file)),
            failure: &self.failure,
        })
    }

    /// Replace the value of `slot` with `value`
    pub fn set(&mut self, slot: usize, value: impl AsRef<[u8]>) -> Result<()> {
        let mut writer = self.new_stream(slot)?;
        writer
            .write_all(value.as_ref())
            .map_err(|e| CacheError::io(&writer.path, "write value", e))?;
        writer.finish()
    }

    /// The committed value of `slot` as it was before this edit
    ///
    /// Returns `None` if the entry has never been committed.
    pub fn committed_reader(&self, slot: usize) -> Result<Option<File>> {
        self.check_slot(slot)?;
        self.ensure_active()?;

        let state = self.cache.state.lock();
        state.ensure_open("read committed value")?;

        match state.index.peek(&self.key) {
            Some(entry) if entry.current_editor() == Some(self.id) => {
                if !entry.is_readable() {
                    return Ok(None);
                }
            }
            _ => return Err(self.closed_error()),
        }

        let path = clean_file(&self.cache.directory, &self.key, slot);
        match File::open(&path) {
            Ok(file) => Ok(Some(file)),
            Err(e) => Err(CacheError::io(&path, "open value file", e)),
        }
    }

    /// Publish every slot written through this editor
    ///
    /// Slots that were not written keep their committed value. A brand-new
    /// entry needs every slot written, otherwise the edit is aborted and
    /// `IncompleteEdit` is returned. If a write failed, the edit is aborted,
    /// the previous value is removed and the write error is returned.
    pub fn commit(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.done = true;

        let failure = self.failure.lock().take();
        if let Some((path, source)) = failure {
            tracing::warn!("Discarding edit of {} after a failed write", self.key);
            self.cache.abort_edit(&self.key, self.id)?;
            self.remove_stale_value();
            return Err(CacheError::io(&path, "write value", source));
        }

        self.cache.commit_edit(&self.key, self.id, &self.written)
    }

    /// Discard everything written through this editor
    pub fn abort(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.done = true;
        self.cache.abort_edit(&self.key, self.id)
    }

    fn remove_stale_value(&self) {
        let mut state = self.cache.state.lock();
        if !state.is_open() {
            return;
        }
        match self.cache.remove_locked(&mut state, &self.key) {
            Ok(_) => {}
            Err(e) => tracing::warn!("Failed to remove stale value of {}: {}", self.key, e),
        }
    }

    fn check_slot(&self, slot: usize) -> Result<()> {
        if slot < self.written.len() {
            return Ok(());
        }

        Err(CacheError::InvalidSlot {
            key: self.key.clone(),
            slot,
            value_count: self.written.len(),
            recovery_hint: RecoveryHint::Manual {
                instructions: format!("Use a slot below {}", self.written.len()),
            },
        })
    }

    fn ensure_active(&self) -> Result<()> {
        if self.done {
            Err(self.closed_error())
        } else {
            Ok(())
        }
    }

    fn closed_error(&self) -> CacheError {
        CacheError::EditorClosed {
            key: self.key.clone(),
            recovery_hint: RecoveryHint::Ignore,
        }
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        if !self.done {
            tracing::warn!("Editor for {} dropped without commit or abort", self.key);
            if let Err(e) = self.abort() {
                tracing::warn!("Failed to abort edit of {}: {}", self.key, e);
            }
        }
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("key", &self.key)
            .field("written", &self.written)
            .field("done", &self.done)
            .finish()
    }
}

/// Buffered writer for one slot of an edit
///
/// Write failures are remembered by the owning [`Editor`], whose commit then
/// discards the edit. Dropping the writer flushes it.
pub struct ValueWriter<'a> {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    failure: &'a WriteFailure,
}

impl ValueWriter<'_> {
    /// Flush buffered bytes and close the file
    pub fn finish(mut self) -> Result<()> {
        self.flush_inner()
            .map_err(|e| CacheError::io(&self.path, "write value", e))
    }

    fn flush_inner(&mut self) -> io::Result<()> {
        let result = match self.writer.take() {
            Some(mut writer) => writer.flush(),
            None => Ok(()),
        };
        self.record(result)
    }

    fn record<T>(&self, result: io::Result<T>) -> io::Result<T> {
        if let Err(e) = &result {
            let mut failure = self.failure.lock();
            if failure.is_none() {
                *failure = Some((self.path.clone(), io::Error::new(e.kind(), e.to_string())));
            }
        }
        result
    }

    fn writer(&mut self) -> io::Result<&mut BufWriter<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "value writer finished"))
    }
}

impl Write for ValueWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let result = self.writer().and_then(|writer| writer.write(buf));
        self.record(result)
    }

    fn flush(&mut self) -> io::Result<()> {
        let result = self.writer().and_then(|writer| writer.flush());
        self.record(result)
    }
}

impl Drop for ValueWriter<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.flush_inner() {
            tracing::warn!("Failed to flush {}: {}", self.path.display(), e);
        }
    }
}
