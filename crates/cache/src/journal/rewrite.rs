//! Journal compaction
//!
//! The compacted journal is written to `journal.tmp`, the live journal is
//! moved aside to `journal.bkp`, the temporary file takes its place and the
//! backup is deleted. A crash at any point leaves at least one complete
//! journal on disk; [`recover_interrupted_rewrite`] picks it at open time.

use super::format::{JournalHeader, JOURNAL_FILE, JOURNAL_FILE_BACKUP, JOURNAL_FILE_TMP};
use super::record::JournalRecord;
use super::writer::JournalWriter;
use crate::errors::{CacheError, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Replace the journal in `directory` with `header` followed by `records`
pub fn rewrite<I>(directory: &Path, header: &JournalHeader, records: I) -> Result<JournalWriter>
where
    I: IntoIterator<Item = JournalRecord>,
{
    let journal = directory.join(JOURNAL_FILE);
    let tmp = directory.join(JOURNAL_FILE_TMP);
    let backup = directory.join(JOURNAL_FILE_BACKUP);

    let written = write_compacted(&tmp, header, records);
    let count = match written {
        Ok(count) => count,
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            return Err(CacheError::io(&tmp, "write compacted journal", e));
        }
    };

    if journal.exists() {
        rename(&journal, &backup)?;
    }
    rename(&tmp, &journal)?;

    // The new journal is live from here on; a leftover backup is discarded
    // at the next open.
    if let Err(e) = remove_if_exists(&backup) {
        tracing::warn!("Keeping stale journal backup: {}", e);
    }

    tracing::debug!(
        "Rewrote journal {} with {} record(s)",
        journal.display(),
        count
    );

    JournalWriter::open_append(&journal)
}

/// Resolve leftovers from a compaction that crashed half-way
pub fn recover_interrupted_rewrite(directory: &Path) -> Result<()> {
    let journal = directory.join(JOURNAL_FILE);
    let backup = directory.join(JOURNAL_FILE_BACKUP);

    if backup.exists() {
        if journal.exists() {
            tracing::info!("Discarding stale journal backup {}", backup.display());
            remove_if_exists(&backup)?;
        } else {
            tracing::info!("Restoring journal from backup {}", backup.display());
            rename(&backup, &journal)?;
        }
    }

    remove_if_exists(&directory.join(JOURNAL_FILE_TMP))
}

fn write_compacted<I>(path: &Path, header: &JournalHeader, records: I) -> io::Result<usize>
where
    I: IntoIterator<Item = JournalRecord>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    header.write_to(&mut writer)?;

    let mut count = 0;
    for record in records {
        writeln!(writer, "{record}")?;
        count += 1;
    }

    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(count)
}

fn rename(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to).map_err(|e| CacheError::io(to, "rename journal", e))
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CacheError::io(path, "remove journal file", e)),
    }
}
