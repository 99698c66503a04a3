//! Journal file layout and header

use crate::errors::{CacheError, RecoveryHint, Result};
use std::io::{self, Write};
use std::path::Path;

/// Live journal file name
pub const JOURNAL_FILE: &str = "journal";

/// Journal being written during compaction
pub const JOURNAL_FILE_TMP: &str = "journal.tmp";

/// Previous journal kept until compaction completes
pub const JOURNAL_FILE_BACKUP: &str = "journal.bkp";

/// First header line
pub const MAGIC: &str = "disklru.journal";

/// Second header line
pub const FORMAT_VERSION: &str = "1";

/// Journal header: magic, format version, app version, value count, blank line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalHeader {
    pub app_version: u32,
    pub value_count: usize,
}

impl JournalHeader {
    pub fn new(app_version: u32, value_count: usize) -> Self {
        Self {
            app_version,
            value_count,
        }
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(
            writer,
            "{MAGIC}\n{FORMAT_VERSION}\n{}\n{}\n\n",
            self.app_version, self.value_count
        )
    }

    /// Parse the five header lines (without their line terminators)
    pub fn parse(path: &Path, lines: &[String]) -> Result<Self> {
        let corrupt = |line: usize, reason: String| CacheError::CorruptJournal {
            path: path.to_path_buf(),
            line,
            reason,
            recovery_hint: RecoveryHint::ClearAndRetry,
        };

        if lines.len() != 5 {
            return Err(corrupt(lines.len() + 1, "journal header is incomplete".to_string()));
        }

        if lines[0] != MAGIC {
            return Err(corrupt(1, format!("unexpected magic '{}'", lines[0])));
        }

        if lines[1] != FORMAT_VERSION {
            return Err(corrupt(2, format!("unsupported format version '{}'", lines[1])));
        }

        let app_version = lines[2]
            .parse::<u32>()
            .map_err(|_| corrupt(3, format!("invalid app version '{}'", lines[2])))?;

        let value_count = match lines[3].parse::<usize>() {
            Ok(count) if count > 0 => count,
            _ => return Err(corrupt(4, format!("invalid value count '{}'", lines[3]))),
        };

        if !lines[4].is_empty() {
            return Err(corrupt(5, "missing blank line after header".to_string()));
        }

        Ok(Self::new(app_version, value_count))
    }

    /// Check that the journal was written for the caller's configuration
    pub fn check_compatible(&self, path: &Path, expected: &JournalHeader) -> Result<()> {
        if self == expected {
            return Ok(());
        }

        Err(CacheError::VersionMismatch {
            path: path.to_path_buf(),
            expected_version: expected.app_version,
            actual_version: self.app_version,
            expected_value_count: expected.value_count,
            actual_value_count: self.value_count,
            recovery_hint: RecoveryHint::ClearAndRetry,
        })
    }
}
