//! The cache engine
//!
//! Owns the entry index and the journal behind a single lock, hands out
//! [`Editor`](crate::Editor)s and [`Snapshot`](crate::Snapshot)s, and keeps
//! the directory under its size budget.
//!
//! Lifecycle: [`DiskLruCache::open`] replays the journal and compacts it,
//! operations run while open, [`DiskLruCache::close`] stops the cleanup
//! worker and releases the journal. Editors still alive at close are not
//! aborted for the caller; their `commit` fails with `Closed` afterwards and
//! their temporary files are removed.

mod builder;
mod cleanup;
mod eviction;
mod operations;
pub(crate) mod paths;
mod recovery;
mod types;

pub use cleanup::Diagnostic;
pub use types::DiskLruCache;
pub(crate) use types::CacheInner;

#[cfg(test)]
mod tests;
