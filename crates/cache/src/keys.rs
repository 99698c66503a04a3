//! Cache key validation
//!
//! Keys double as file name stems inside the cache directory, so they are
//! restricted to a small, filesystem-safe alphabet.

use crate::errors::{CacheError, RecoveryHint, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum key length in bytes
pub const MAX_KEY_LENGTH: usize = 120;

static KEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9_-]{1,120}$").unwrap_or_else(|e| panic!("invalid key pattern: {e}"))
});

/// Validation for values used as cache keys
pub trait CacheKey {
    /// Check the key against `[a-z0-9_-]{1,120}`
    fn validate(&self) -> Result<()>;
}

impl CacheKey for str {
    fn validate(&self) -> Result<()> {
        if KEY_PATTERN.is_match(self) {
            return Ok(());
        }

        let reason = if self.is_empty() {
            "key must not be empty".to_string()
        } else if self.len() > MAX_KEY_LENGTH {
            format!("key is {} bytes, limit is {MAX_KEY_LENGTH}", self.len())
        } else {
            "keys may only contain a-z, 0-9, '_' and '-'".to_string()
        };

        Err(CacheError::InvalidKey {
            key: self.to_string(),
            reason,
            recovery_hint: RecoveryHint::Manual {
                instructions: "Hash or escape the key into [a-z0-9_-]".to_string(),
            },
        })
    }
}

impl CacheKey for String {
    fn validate(&self) -> Result<()> {
        self.as_str().validate()
    }
}
