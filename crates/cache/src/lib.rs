//! Disk-backed LRU cache
//!
//! This crate provides a size-bounded cache of byte values stored as files in
//! a single directory, with features like:
//! - Fixed number of independently readable value slots per key
//! - Atomic multi-slot commits through an [`Editor`]
//! - Point-in-time reads through a [`Snapshot`]
//! - Least-recently-used eviction against a byte budget
//! - An append-only journal replayed on open for crash recovery
//!
//! ```no_run
//! use disklru_cache::DiskLruCache;
//!
//! # fn main() -> disklru_cache::Result<()> {
//! let cache = DiskLruCache::open("/tmp/thumbnails", 1, 2, 10 * 1024 * 1024)?;
//!
//! let mut editor = cache.edit("avatar-42")?;
//! editor.set(0, b"image bytes")?;
//! editor.set(1, "image/png")?;
//! editor.commit()?;
//!
//! if let Some(mut snapshot) = cache.get("avatar-42")? {
//!     assert_eq!(snapshot.read_to_string(1)?, "image/png");
//! }
//!
//! cache.close()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod editor;
pub mod engine;
pub mod entry;
pub mod errors;
pub mod index;
pub mod journal;
pub mod keys;
pub mod snapshot;

pub use config::{
    CacheConfig, CacheConfigBuilder, CacheConfigLoader, CleanupMode, DEFAULT_MAX_SIZE,
    DEFAULT_REBUILD_THRESHOLD,
};
pub use editor::{Editor, ValueWriter};
pub use engine::{Diagnostic, DiskLruCache};
pub use errors::{CacheError, Error, RecoveryHint, Result};
pub use journal::JournalRecord;
pub use keys::{CacheKey, MAX_KEY_LENGTH};
pub use snapshot::Snapshot;
