//! Recovery utilities for cache errors

use super::types::{CacheError, RecoveryHint};

impl CacheError {
    /// Get the recovery hint for this error
    #[must_use]
    pub const fn recovery_hint(&self) -> &RecoveryHint {
        match self {
            Self::Io { recovery_hint, .. }
            | Self::VersionMismatch { recovery_hint, .. }
            | Self::CacheUnavailable { recovery_hint, .. }
            | Self::CorruptJournal { recovery_hint, .. }
            | Self::EditInProgress { recovery_hint, .. }
            | Self::IncompleteEdit { recovery_hint, .. }
            | Self::EditorClosed { recovery_hint, .. }
            | Self::InvalidKey { recovery_hint, .. }
            | Self::InvalidSlot { recovery_hint, .. }
            | Self::Closed { recovery_hint, .. }
            | Self::Configuration { recovery_hint, .. }
            | Self::Serialization { recovery_hint, .. } => recovery_hint,
        }
    }

    /// Check if this error is transient and can be retried
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self.recovery_hint(),
            RecoveryHint::Retry { .. } | RecoveryHint::FinishEdit
        )
    }

    /// Check if this error indicates on-disk corruption
    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        matches!(self, Self::CorruptJournal { .. })
    }

    /// Errors after which the cache directory is discarded and rebuilt empty
    #[must_use]
    pub const fn requires_wipe(&self) -> bool {
        matches!(
            self,
            Self::VersionMismatch { .. } | Self::CorruptJournal { .. }
        )
    }
}
