//! Rebuilding the index from the journal at open time

use crate::errors::{CacheError, RecoveryHint, Result};
use crate::index::EntryIndex;
use crate::journal::{self, JournalHeader, JournalRecord, JournalWriter, JOURNAL_FILE};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use super::cleanup::compacted_records;
use super::paths::{clean_file, dirty_file};

/// Index, next sequence number and a freshly compacted journal
pub(super) struct Recovered {
    pub index: EntryIndex,
    pub next_sequence_number: u64,
    pub journal: JournalWriter,
}

/// Bring `directory` into a consistent state and load its index
///
/// A journal from another app version or value count, or one that cannot be
/// parsed, causes the whole directory to be discarded. The journal is always
/// rewritten before returning.
pub(super) fn recover(directory: &Path, header: &JournalHeader) -> Result<Recovered> {
    fs::create_dir_all(directory)
        .map_err(|e| CacheError::io(directory, "create cache directory", e))?;
    journal::recover_interrupted_rewrite(directory)?;

    let journal_path = directory.join(JOURNAL_FILE);
    let mut index = EntryIndex::new(header.value_count);
    let mut next_sequence_number = 1;

    if journal_path.exists() {
        match replay(directory, header, &mut index, &mut next_sequence_number) {
            Ok(()) => {
                tracing::debug!(
                    "Replayed journal for {}: {} entries, {} bytes",
                    directory.display(),
                    index.len(),
                    index.size()
                );
            }
            Err(e) if e.requires_wipe() => {
                tracing::warn!("Discarding cache at {}: {}", directory.display(), e);
                wipe(directory)?;
                index = EntryIndex::new(header.value_count);
                next_sequence_number = 1;
            }
            Err(e) => return Err(e),
        }
    } else {
        tracing::debug!("No journal in {}, starting empty", directory.display());
    }

    let records = compacted_records(&index);
    let journal = journal::rewrite(directory, header, records)?;

    Ok(Recovered {
        index,
        next_sequence_number,
        journal,
    })
}

fn replay(
    directory: &Path,
    expected: &JournalHeader,
    index: &mut EntryIndex,
    next_sequence_number: &mut u64,
) -> Result<()> {
    let path = directory.join(JOURNAL_FILE);
    let mut reader = journal::read_all(&path)?;
    reader.header().check_compatible(&path, expected)?;

    // Keys whose last edit has no matching CLEAN or REMOVE yet.
    let mut dirty: HashSet<String> = HashSet::new();

    while let Some(record) = reader.next() {
        match record? {
            JournalRecord::Dirty { key } => {
                index.get_or_insert(&key);
                dirty.insert(key);
            }
            JournalRecord::Clean { key, lengths } => {
                if !index.can_commit(&key, &lengths) {
                    return Err(CacheError::CorruptJournal {
                        path: path.clone(),
                        line: reader.lines_read(),
                        reason: format!("CLEAN '{key}' overflows the cache size"),
                        recovery_hint: RecoveryHint::ClearAndRetry,
                    });
                }
                dirty.remove(&key);
                index.mark_clean(&key, lengths, *next_sequence_number);
                *next_sequence_number += 1;
            }
            JournalRecord::Remove { key } => {
                dirty.remove(&key);
                index.remove(&key);
            }
            JournalRecord::Read { key } => index.touch(&key),
        }
    }

    if reader.was_truncated() {
        tracing::info!(
            "Journal {} ended mid-record after line {}",
            path.display(),
            reader.lines_read()
        );
    }

    for key in &dirty {
        for slot in 0..expected.value_count {
            remove_stray(&dirty_file(directory, key, slot));
        }
        if !index.peek(key).is_some_and(|entry| entry.is_readable()) {
            tracing::debug!("Dropping unfinished entry {}", key);
            index.remove(key);
        }
    }

    drop_entries_with_bad_files(directory, index);
    Ok(())
}

/// Remove readable entries whose files are missing or have the wrong length
fn drop_entries_with_bad_files(directory: &Path, index: &mut EntryIndex) {
    let damaged: Vec<String> = index
        .iter()
        .filter(|(_, entry)| entry.is_readable())
        .filter(|(key, entry)| {
            entry.lengths().iter().enumerate().any(|(slot, &expected)| {
                match fs::metadata(clean_file(directory, key, slot)) {
                    Ok(metadata) => metadata.len() != expected,
                    Err(_) => true,
                }
            })
        })
        .map(|(key, _)| key.to_string())
        .collect();

    for key in damaged {
        tracing::warn!("Dropping entry {}: value files do not match the journal", key);
        for slot in 0..index.value_count() {
            remove_stray(&clean_file(directory, &key, slot));
            remove_stray(&dirty_file(directory, &key, slot));
        }
        index.remove(&key);
    }
}

fn remove_stray(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to delete {}: {}", path.display(), e),
    }
}

/// Delete the directory and everything in it, then recreate it empty
fn wipe(directory: &Path) -> Result<()> {
    fs::remove_dir_all(directory)
        .map_err(|e| CacheError::io(directory, "discard cache directory", e))?;
    fs::create_dir_all(directory)
        .map_err(|e| CacheError::io(directory, "create cache directory", e))
}
