//! Core error types for the disk cache

use std::path::PathBuf;
use std::time::Duration;

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Re-export CacheError as Error for convenience
pub use CacheError as Error;

/// Error type for cache operations
#[derive(Debug)]
pub enum CacheError {
    /// I/O errors while touching the cache directory
    Io {
        path: PathBuf,
        operation: &'static str,
        source: std::io::Error,
        recovery_hint: RecoveryHint,
    },

    /// The journal was written by an incompatible application version or
    /// with a different number of value slots
    VersionMismatch {
        path: PathBuf,
        expected_version: u32,
        actual_version: u32,
        expected_value_count: usize,
        actual_value_count: usize,
        recovery_hint: RecoveryHint,
    },

    /// The cache directory could not be opened
    CacheUnavailable {
        directory: PathBuf,
        reason: String,
        source: Option<Box<CacheError>>,
        recovery_hint: RecoveryHint,
    },

    /// The journal header or one of its records could not be parsed
    CorruptJournal {
        path: PathBuf,
        line: usize,
        reason: String,
        recovery_hint: RecoveryHint,
    },

    /// Another editor currently owns the key
    EditInProgress {
        key: String,
        recovery_hint: RecoveryHint,
    },

    /// Commit of a brand-new entry without a value for every slot
    IncompleteEdit {
        key: String,
        slot: usize,
        recovery_hint: RecoveryHint,
    },

    /// Commit or abort called on an editor that already finished
    EditorClosed {
        key: String,
        recovery_hint: RecoveryHint,
    },

    /// Key does not match the allowed pattern
    InvalidKey {
        key: String,
        reason: String,
        recovery_hint: RecoveryHint,
    },

    /// Slot index outside `0..value_count`
    InvalidSlot {
        key: String,
        slot: usize,
        value_count: usize,
        recovery_hint: RecoveryHint,
    },

    /// Operation attempted after the cache was closed
    Closed {
        operation: &'static str,
        recovery_hint: RecoveryHint,
    },

    /// Configuration error
    Configuration {
        message: String,
        recovery_hint: RecoveryHint,
    },

    /// Configuration file could not be decoded
    Serialization {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
        recovery_hint: RecoveryHint,
    },
}

/// Recovery hints for error handling
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryHint {
    /// Retry the operation
    Retry { after: Duration },

    /// Wipe the cache directory and start over
    ClearAndRetry,

    /// Check file permissions
    CheckPermissions { path: PathBuf },

    /// Check disk space and clean up if needed
    CheckDiskSpace,

    /// Finish (commit or abort) the live editor first
    FinishEdit,

    /// Write every slot before committing a new entry
    WriteAllSlots,

    /// Open the cache again
    Reopen,

    /// Use a default value
    UseDefault { value: String },

    /// No automated recovery possible
    Manual { instructions: String },

    /// Operation can be safely ignored
    Ignore,
}
