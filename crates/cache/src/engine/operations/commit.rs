//! Commit and abort of edits

use crate::entry::EditorId;
use crate::errors::{CacheError, RecoveryHint, Result};
use crate::journal::JournalRecord;
use std::fs;

use super::super::paths::{clean_file, dirty_file};
use super::super::types::{CacheInner, CacheState};

impl CacheInner {
    /// Publish the slots written by `editor`
    ///
    /// `written[slot]` is true for every slot the editor produced a
    /// temporary file for; other slots keep their committed value.
    pub(crate) fn commit_edit(&self, key: &str, editor: EditorId, written: &[bool]) -> Result<()> {
        let mut state = self.state.lock();

        if !state.is_open() {
            self.release_after_close(&mut state, key, editor);
            return Err(CacheError::closed("commit"));
        }

        let (was_readable, mut lengths) = self.owned_entry(&state, key, editor)?;

        if !was_readable {
            if let Some(slot) = written.iter().position(|written| !written) {
                self.abort_locked(&mut state, key, was_readable)?;
                return Err(CacheError::IncompleteEdit {
                    key: key.to_string(),
                    slot,
                    recovery_hint: RecoveryHint::WriteAllSlots,
                });
            }
        }

        let mut replaced = false;
        for slot in (0..self.header.value_count).filter(|&slot| written[slot]) {
            match self.install_slot(key, slot) {
                Ok(length) => {
                    lengths[slot] = length;
                    replaced = true;
                }
                Err((err, slot_replaced)) => {
                    tracing::warn!("Commit of {} failed: {}", key, err);
                    if replaced || slot_replaced {
                        // Committed files no longer match the recorded
                        // lengths, so the entry cannot be kept.
                        self.delete_dirty_files(key);
                        state.index.set_editor(key, None);
                        self.remove_locked(&mut state, key)?;
                    } else {
                        self.abort_locked(&mut state, key, was_readable)?;
                    }
                    return Err(err);
                }
            }
        }

        let record = JournalRecord::Clean {
            key: key.to_string(),
            lengths: lengths.clone(),
        };
        if let Err(e) = state.journal("commit")?.append(&record) {
            // The files are in place but nothing on disk says so.
            tracing::warn!("Failed to journal commit of {}: {}", key, e);
            self.delete_clean_files(key);
            state.index.remove(key);
            return Err(e);
        }

        let sequence_number = state.next_sequence_number;
        state.next_sequence_number += 1;
        state.op_count += 1;

        state.index.set_editor(key, None);
        state.index.mark_clean(key, lengths, sequence_number);

        tracing::trace!("Committed {} (sequence {})", key, sequence_number);

        self.maybe_schedule_cleanup(&mut state);
        Ok(())
    }

    /// Discard the edit owned by `editor`
    pub(crate) fn abort_edit(&self, key: &str, editor: EditorId) -> Result<()> {
        let mut state = self.state.lock();

        if !state.is_open() {
            self.release_after_close(&mut state, key, editor);
            return Ok(());
        }

        let (was_readable, _) = self.owned_entry(&state, key, editor)?;
        self.abort_locked(&mut state, key, was_readable)
    }

    /// Release the entry and delete temporary files; an entry that was
    /// never committed is forgotten
    fn abort_locked(&self, state: &mut CacheState, key: &str, was_readable: bool) -> Result<()> {
        self.delete_dirty_files(key);
        state.index.set_editor(key, None);
        state.op_count += 1;

        if was_readable {
            return Ok(());
        }

        let journaled = state.journal("abort")?.append(&JournalRecord::Remove {
            key: key.to_string(),
        });
        state.index.remove(key);
        journaled
    }

    fn release_after_close(&self, state: &mut CacheState, key: &str, editor: EditorId) {
        self.delete_dirty_files(key);
        if state
            .index
            .peek(key)
            .is_some_and(|entry| entry.current_editor() == Some(editor))
        {
            state.index.set_editor(key, None);
        }
    }

    /// Readability and lengths of the entry, provided `editor` owns it
    fn owned_entry(&self, state: &CacheState, key: &str, editor: EditorId) -> Result<(bool, Vec<u64>)> {
        match state.index.peek(key) {
            Some(entry) if entry.current_editor() == Some(editor) => {
                Ok((entry.is_readable(), entry.lengths().to_vec()))
            }
            _ => Err(CacheError::EditorClosed {
                key: key.to_string(),
                recovery_hint: RecoveryHint::Ignore,
            }),
        }
    }

    /// Move one temporary file over its committed counterpart and return
    /// the new length; the flag tells whether the committed file changed
    fn install_slot(&self, key: &str, slot: usize) -> std::result::Result<u64, (CacheError, bool)> {
        let dirty = dirty_file(&self.directory, key, slot);
        let clean = clean_file(&self.directory, key, slot);

        fs::rename(&dirty, &clean)
            .map_err(|e| (CacheError::io(&dirty, "install value file", e), false))?;

        fs::metadata(&clean)
            .map(|metadata| metadata.len())
            .map_err(|e| (CacheError::io(&clean, "stat value file", e), true))
    }
}
