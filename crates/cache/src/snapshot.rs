//! Read-only view of one committed entry

use crate::editor::Editor;
use crate::engine::paths::clean_file;
use crate::engine::CacheInner;
use crate::errors::{CacheError, RecoveryHint, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::Arc;

/// Open files for every slot of an entry, as of one commit
///
/// The files were opened when the snapshot was taken, so later commits or
/// removals of the key do not change what a snapshot reads. Dropping the
/// snapshot closes them.
pub struct Snapshot {
    cache: Arc<CacheInner>,
    key: String,
    sequence_number: u64,
    files: Vec<File>,
    lengths: Vec<u64>,
}

impl Snapshot {
    pub(crate) fn new(
        cache: Arc<CacheInner>,
        key: String,
        sequence_number: u64,
        files: Vec<File>,
        lengths: Vec<u64>,
    ) -> Self {
        Self {
            cache,
            key,
            sequence_number,
            files,
            lengths,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Sequence number of the commit this snapshot reads
    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    /// Byte source for `slot`, positioned wherever the last read left it
    pub fn stream(&mut self, slot: usize) -> Result<&mut File> {
        self.check_slot(slot)?;
        Ok(&mut self.files[slot])
    }

    /// Length of `slot` as recorded at commit time
    pub fn length(&self, slot: usize) -> Result<u64> {
        self.check_slot(slot)?;
        Ok(self.lengths[slot])
    }

    /// Whole value of `slot`
    pub fn read_to_end(&mut self, slot: usize) -> Result<Vec<u8>> {
        let capacity = self.length(slot)? as usize;
        let path = self.path(slot);
        let file = self.rewound(slot)?;

        let mut buf = Vec::with_capacity(capacity);
        file.read_to_end(&mut buf)
            .map_err(|e| CacheError::io(&path, "read value", e))?;
        Ok(buf)
    }

    /// Whole value of `slot` as UTF-8 text
    pub fn read_to_string(&mut self, slot: usize) -> Result<String> {
        let path = self.path(slot);
        let file = self.rewound(slot)?;

        let mut buf = String::new();
        file.read_to_string(&mut buf)
            .map_err(|e| CacheError::io(&path, "read value", e))?;
        Ok(buf)
    }

    /// Editor for this key, provided nothing was committed or removed since
    /// the snapshot was taken
    ///
    /// Returns `None` for a stale snapshot and `EditInProgress` if another
    /// editor owns the key.
    pub fn edit(&self) -> Result<Option<Editor>> {
        CacheInner::begin_edit(&self.cache, &self.key, Some(self.sequence_number))
    }

    /// Close every slot file
    pub fn close(self) {}

    fn rewound(&mut self, slot: usize) -> Result<&mut File> {
        let path = self.path(slot);
        let file = self.stream(slot)?;
        file.seek(SeekFrom::Start(0))
            .map_err(|e| CacheError::io(&path, "seek value", e))?;
        Ok(file)
    }

    fn path(&self, slot: usize) -> PathBuf {
        clean_file(&self.cache.directory, &self.key, slot)
    }

    fn check_slot(&self, slot: usize) -> Result<()> {
        if slot < self.files.len() {
            return Ok(());
        }

        Err(CacheError::InvalidSlot {
            key: self.key.clone(),
            slot,
            value_count: self.files.len(),
            recovery_hint: RecoveryHint::Manual {
                instructions: format!("Use a slot below {}", self.files.len()),
            },
        })
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("key", &self.key)
            .field("sequence_number", &self.sequence_number)
            .field("lengths", &self.lengths)
            .finish()
    }
}
