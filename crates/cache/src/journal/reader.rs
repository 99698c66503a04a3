//! Journal replay
//!
//! Reads the header eagerly and then yields records lazily in file order.
//! A final line missing its newline is the tail of an append that was cut
//! short by a crash: it is skipped and reported through
//! [`JournalReader::was_truncated`] instead of failing the replay.

use super::format::JournalHeader;
use super::record::JournalRecord;
use crate::errors::{CacheError, RecoveryHint, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Outcome of reading one raw line
enum Line {
    Complete(String),
    Truncated,
    Eof,
}

/// Lazy, single-pass iterator over the records of a journal file
pub struct JournalReader {
    path: PathBuf,
    reader: BufReader<File>,
    header: JournalHeader,
    line: usize,
    truncated: bool,
    finished: bool,
}

impl JournalReader {
    /// Open a journal and validate its header
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| CacheError::io(path, "open journal", e))?;

        let mut reader = Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            header: JournalHeader::new(0, 0),
            line: 0,
            truncated: false,
            finished: false,
        };

        let mut header_lines = Vec::with_capacity(5);
        while header_lines.len() < 5 {
            match reader.read_line()? {
                Line::Complete(line) => header_lines.push(line),
                Line::Truncated | Line::Eof => break,
            }
        }

        reader.header = JournalHeader::parse(path, &header_lines)?;
        Ok(reader)
    }

    pub fn header(&self) -> &JournalHeader {
        &self.header
    }

    /// Whether the journal ended in a partially written record
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    /// Number of lines consumed so far, header included
    pub fn lines_read(&self) -> usize {
        self.line
    }

    fn read_line(&mut self) -> Result<Line> {
        let mut buf = Vec::new();
        let read = self
            .reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| CacheError::io(&self.path, "read journal", e))?;

        if read == 0 {
            return Ok(Line::Eof);
        }

        if buf.last() != Some(&b'\n') {
            self.truncated = true;
            return Ok(Line::Truncated);
        }

        self.line += 1;
        buf.pop();

        match String::from_utf8(buf) {
            Ok(line) => Ok(Line::Complete(line)),
            Err(_) => Err(self.corrupt("line is not valid UTF-8".to_string())),
        }
    }

    fn corrupt(&self, reason: String) -> CacheError {
        CacheError::CorruptJournal {
            path: self.path.clone(),
            line: self.line,
            reason,
            recovery_hint: RecoveryHint::ClearAndRetry,
        }
    }
}

impl Iterator for JournalReader {
    type Item = Result<JournalRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let line = match self.read_line() {
            Ok(Line::Complete(line)) => line,
            Ok(Line::Truncated) => {
                tracing::warn!(
                    "Ignoring truncated record at the end of {}",
                    self.path.display()
                );
                self.finished = true;
                return None;
            }
            Ok(Line::Eof) => {
                self.finished = true;
                return None;
            }
            Err(e) => {
                self.finished = true;
                return Some(Err(e));
            }
        };

        match JournalRecord::parse(&line, self.header.value_count) {
            Ok(record) => Some(Ok(record)),
            Err(reason) => {
                self.finished = true;
                Some(Err(self.corrupt(reason)))
            }
        }
    }
}
