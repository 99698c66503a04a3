//! Append-only journal for crash recovery
//!
//! Every entry lifecycle transition is appended to the journal before the
//! in-memory index changes, so replaying the journal at open time rebuilds
//! the index exactly as it was after the last completed operation.

mod format;
mod reader;
mod record;
mod rewrite;
mod writer;

pub use format::{
    JournalHeader, FORMAT_VERSION, JOURNAL_FILE, JOURNAL_FILE_BACKUP, JOURNAL_FILE_TMP, MAGIC,
};
pub use reader::JournalReader;
pub use record::JournalRecord;
pub use rewrite::{recover_interrupted_rewrite, rewrite};
pub use writer::JournalWriter;

use crate::errors::Result;
use std::path::Path;

/// Open `path` and return a lazy iterator over its records
pub fn read_all(path: &Path) -> Result<JournalReader> {
    JournalReader::open(path)
}
