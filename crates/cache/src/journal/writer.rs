//! Journal append writer

use super::record::JournalRecord;
use crate::errors::{CacheError, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends records to the live journal, flushing after each one
pub struct JournalWriter {
    path: PathBuf,
    file: BufWriter<File>,
}

impl JournalWriter {
    /// Open an existing journal for appending
    pub fn open_append(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|e| CacheError::io(path, "open journal for append", e))?;

        Ok(Self {
            path: path.to_path_buf(),
            file: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one record and flush it before returning
    pub fn append(&mut self, record: &JournalRecord) -> Result<()> {
        writeln!(self.file, "{record}")
            .map_err(|e| CacheError::io(&self.path, "append journal record", e))?;
        self.flush()
    }

    pub fn flush(&mut self) -> Result<()> {
        self.file
            .flush()
            .map_err(|e| CacheError::io(&self.path, "flush journal", e))
    }

    /// Flush and sync the journal to disk
    pub fn sync(&mut self) -> Result<()> {
        self.flush()?;
        self.file
            .get_ref()
            .sync_all()
            .map_err(|e| CacheError::io(&self.path, "sync journal", e))
    }
}
