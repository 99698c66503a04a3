//! Constructors for common error shapes

use super::types::{CacheError, RecoveryHint};
use std::path::Path;
use std::time::Duration;

impl CacheError {
    /// Build an I/O error with the path and operation it happened on
    pub(crate) fn io(path: &Path, operation: &'static str, source: std::io::Error) -> Self {
        let recovery_hint = match source.kind() {
            std::io::ErrorKind::PermissionDenied => RecoveryHint::CheckPermissions {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::Interrupted | std::io::ErrorKind::WouldBlock => {
                RecoveryHint::Retry {
                    after: Duration::from_millis(10),
                }
            }
            _ => RecoveryHint::CheckDiskSpace,
        };

        Self::Io {
            path: path.to_path_buf(),
            operation,
            source,
            recovery_hint,
        }
    }

    /// Error returned by every operation on a closed cache
    pub(crate) fn closed(operation: &'static str) -> Self {
        Self::Closed {
            operation,
            recovery_hint: RecoveryHint::Reopen,
        }
    }

    /// Wrap a failure during open as `CacheUnavailable`
    pub(crate) fn unavailable(directory: &Path, source: CacheError) -> Self {
        Self::CacheUnavailable {
            directory: directory.to_path_buf(),
            reason: source.to_string(),
            source: Some(Box::new(source)),
            recovery_hint: RecoveryHint::CheckPermissions {
                path: directory.to_path_buf(),
            },
        }
    }
}
