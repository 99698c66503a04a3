//! Display implementations for cache errors

use super::types::{CacheError, RecoveryHint};
use std::fmt;

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io {
                path,
                operation,
                source,
                ..
            } => write!(
                f,
                "I/O error during {} on '{}': {}",
                operation,
                path.display(),
                source
            ),
            Self::VersionMismatch {
                path,
                expected_version,
                actual_version,
                expected_value_count,
                actual_value_count,
                ..
            } => write!(
                f,
                "Journal '{}' is incompatible: expected app version {expected_version} with {expected_value_count} slot(s), found app version {actual_version} with {actual_value_count} slot(s)",
                path.display()
            ),
            Self::CacheUnavailable {
                directory, reason, ..
            } => write!(
                f,
                "Cache directory '{}' unavailable: {reason}",
                directory.display()
            ),
            Self::CorruptJournal {
                path, line, reason, ..
            } => write!(
                f,
                "Corrupt journal '{}' at line {line}: {reason}",
                path.display()
            ),
            Self::EditInProgress { key, .. } => {
                write!(f, "Entry '{key}' is already being edited")
            }
            Self::IncompleteEdit { key, slot, .. } => write!(
                f,
                "New entry '{key}' was committed without a value for slot {slot}"
            ),
            Self::EditorClosed { key, .. } => {
                write!(f, "Editor for '{key}' was already committed or aborted")
            }
            Self::InvalidKey { key, reason, .. } => {
                write!(f, "Invalid cache key '{key}': {reason}")
            }
            Self::InvalidSlot {
                key,
                slot,
                value_count,
                ..
            } => write!(
                f,
                "Slot {slot} out of range for '{key}' (cache has {value_count} slot(s))"
            ),
            Self::Closed { operation, .. } => {
                write!(f, "Cannot {operation}: cache is closed")
            }
            Self::Configuration { message, .. } => {
                write!(f, "Cache configuration error: {message}")
            }
            Self::Serialization { path, source, .. } => write!(
                f,
                "Failed to decode configuration '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::CacheUnavailable {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            Self::Serialization { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for RecoveryHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retry { after } => write!(f, "retry after {after:?}"),
            Self::ClearAndRetry => write!(f, "clear the cache directory and retry"),
            Self::CheckPermissions { path } => {
                write!(f, "check permissions on '{}'", path.display())
            }
            Self::CheckDiskSpace => write!(f, "check available disk space"),
            Self::FinishEdit => write!(f, "commit or abort the live editor first"),
            Self::WriteAllSlots => write!(f, "write every slot before committing"),
            Self::Reopen => write!(f, "open the cache again"),
            Self::UseDefault { value } => write!(f, "use the default value '{value}'"),
            Self::Manual { instructions } => write!(f, "{instructions}"),
            Self::Ignore => write!(f, "safe to ignore"),
        }
    }
}
