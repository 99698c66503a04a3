//! Edit operation for cache

use crate::editor::Editor;
use crate::errors::{CacheError, RecoveryHint, Result};
use crate::journal::JournalRecord;
use crate::keys::CacheKey;
use std::sync::Arc;

use super::super::types::{CacheInner, DiskLruCache};

impl DiskLruCache {
    /// Start an edit of `key`
    ///
    /// Fails with `EditInProgress` while another editor owns the key. The
    /// entry keeps serving its previous value until the edit commits.
    pub fn edit(&self, key: &str) -> Result<Editor> {
        // Only a pinned sequence number can produce `None`.
        CacheInner::begin_edit(&self.inner, key, None)?.ok_or_else(|| {
            CacheError::EditInProgress {
                key: key.to_string(),
                recovery_hint: RecoveryHint::FinishEdit,
            }
        })
    }
}

impl CacheInner {
    /// Claim `key` for a new editor
    ///
    /// With `expected_sequence` set, returns `None` unless the entry is still
    /// at that commit.
    pub(crate) fn begin_edit(
        inner: &Arc<CacheInner>,
        key: &str,
        expected_sequence: Option<u64>,
    ) -> Result<Option<Editor>> {
        key.validate()?;

        let mut state = inner.state.lock();
        state.ensure_open("edit")?;

        let entry = state.index.peek(key);

        if let Some(expected) = expected_sequence {
            match entry {
                Some(entry) if entry.is_readable() && entry.sequence_number() == expected => {}
                _ => {
                    tracing::debug!("Snapshot of {} is stale, not editing", key);
                    return Ok(None);
                }
            }
        }

        if entry.is_some_and(|entry| entry.is_being_edited()) {
            return Err(CacheError::EditInProgress {
                key: key.to_string(),
                recovery_hint: RecoveryHint::FinishEdit,
            });
        }

        let editor_id = state.next_editor_id;
        state.next_editor_id += 1;

        state.journal("edit")?.append(&JournalRecord::Dirty {
            key: key.to_string(),
        })?;
        state.index.get_or_insert(key).set_editor(Some(editor_id));

        tracing::trace!("Editing {} (editor {})", key, editor_id);

        Ok(Some(Editor::new(
            Arc::clone(inner),
            key.to_string(),
            editor_id,
            inner.header.value_count,
        )))
    }
}
