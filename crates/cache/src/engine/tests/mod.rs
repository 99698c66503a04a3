//! Engine tests

mod recovery;

use crate::config::{CacheConfigBuilder, CleanupMode};
use crate::engine::DiskLruCache;
use crate::errors::Result;
use crate::journal::JOURNAL_FILE;
use std::path::Path;

pub(super) const APP_VERSION: u32 = 100;

/// Two-slot cache whose cleanup runs inside the triggering operation
pub(super) fn open_inline(dir: &Path, max_size: u64) -> Result<DiskLruCache> {
    open_with(dir, 2, max_size, CleanupMode::Inline)
}

pub(super) fn open_with(
    dir: &Path,
    value_count: usize,
    max_size: u64,
    cleanup_mode: CleanupMode,
) -> Result<DiskLruCache> {
    let config = CacheConfigBuilder::new()
        .with_directory(dir)
        .with_app_version(APP_VERSION)
        .with_value_count(value_count)
        .with_max_size(max_size)
        .with_cleanup_mode(cleanup_mode)
        .build()?;
    DiskLruCache::open_with_config(config)
}

/// Commit `values` as the full value of `key`
pub(super) fn put(cache: &DiskLruCache, key: &str, values: &[&str]) -> Result<()> {
    let mut editor = cache.edit(key)?;
    for (slot, value) in values.iter().enumerate() {
        editor.set(slot, value)?;
    }
    editor.commit()
}

/// Every slot of `key` as text, or `None` on a miss
pub(super) fn read(cache: &DiskLruCache, key: &str) -> Result<Option<Vec<String>>> {
    let Some(mut snapshot) = cache.get(key)? else {
        return Ok(None);
    };

    let mut values = Vec::new();
    for slot in 0..cache.value_count() {
        values.push(snapshot.read_to_string(slot)?);
    }
    Ok(Some(values))
}

/// Journal lines after the five header lines
pub(super) fn journal_body(dir: &Path) -> Vec<String> {
    let content = std::fs::read_to_string(dir.join(JOURNAL_FILE)).unwrap();
    content.lines().skip(5).map(str::to_string).collect()
}
