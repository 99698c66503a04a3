//! Journal record types
//!
//! One record per line: `DIRTY key`, `CLEAN key len0 .. lenN-1`,
//! `REMOVE key` or `READ key`.

use crate::keys::CacheKey;
use std::fmt;

const DIRTY: &str = "DIRTY";
const CLEAN: &str = "CLEAN";
const REMOVE: &str = "REMOVE";
const READ: &str = "READ";

/// A single journaled state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalRecord {
    /// An edit started; the entry is not readable from this edit yet
    Dirty { key: String },
    /// An edit committed with these slot lengths
    Clean { key: String, lengths: Vec<u64> },
    /// The entry was removed or its first edit aborted
    Remove { key: String },
    /// The entry was read; affects recency only
    Read { key: String },
}

impl JournalRecord {
    pub fn key(&self) -> &str {
        match self {
            Self::Dirty { key }
            | Self::Clean { key, .. }
            | Self::Remove { key }
            | Self::Read { key } => key,
        }
    }

    /// Parse one line (without its terminator). The error is a human-readable
    /// reason; the reader attaches the path and line number.
    pub fn parse(line: &str, value_count: usize) -> std::result::Result<Self, String> {
        let mut parts = line.split(' ');
        let tag = parts.next().unwrap_or_default();
        let key = match parts.next() {
            Some(key) => key.to_string(),
            None => return Err(format!("record '{line}' has no key")),
        };

        if let Err(e) = key.validate() {
            return Err(e.to_string());
        }

        let record = match tag {
            CLEAN => {
                let lengths = parts
                    .map(|raw| {
                        raw.parse::<u64>()
                            .map_err(|_| format!("invalid length '{raw}' for '{key}'"))
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                if lengths.len() != value_count {
                    return Err(format!(
                        "CLEAN '{key}' has {} length(s), expected {value_count}",
                        lengths.len()
                    ));
                }

                if lengths
                    .iter()
                    .try_fold(0_u64, |total, length| total.checked_add(*length))
                    .is_none()
                {
                    return Err(format!("CLEAN '{key}' lengths overflow the entry size"));
                }

                return Ok(Self::Clean { key, lengths });
            }
            DIRTY => Self::Dirty { key },
            REMOVE => Self::Remove { key },
            READ => Self::Read { key },
            other => return Err(format!("unknown record type '{other}'")),
        };

        if parts.next().is_some() {
            return Err(format!("unexpected trailing data in '{line}'"));
        }

        Ok(record)
    }
}

impl fmt::Display for JournalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dirty { key } => write!(f, "{DIRTY} {key}"),
            Self::Clean { key, lengths } => {
                write!(f, "{CLEAN} {key}")?;
                for length in lengths {
                    write!(f, " {length}")?;
                }
                Ok(())
            }
            Self::Remove { key } => write!(f, "{REMOVE} {key}"),
            Self::Read { key } => write!(f, "{READ} {key}"),
        }
    }
}
