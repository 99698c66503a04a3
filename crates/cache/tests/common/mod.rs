//! Shared helpers for integration tests

#![allow(dead_code)]

use disklru_cache::{CacheConfigBuilder, CleanupMode, DiskLruCache, Result};
use std::path::Path;
use std::sync::Once;

pub const APP_VERSION: u32 = 7;

static TRACING: Once = Once::new();

/// Route cache logs through the test harness; `RUST_LOG` picks the level
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Cache with deterministic, in-thread cleanup
pub fn open_inline(dir: &Path, value_count: usize, max_size: u64) -> Result<DiskLruCache> {
    init_tracing();
    let config = CacheConfigBuilder::new()
        .with_directory(dir)
        .with_app_version(APP_VERSION)
        .with_value_count(value_count)
        .with_max_size(max_size)
        .with_cleanup_mode(CleanupMode::Inline)
        .build()?;
    DiskLruCache::open_with_config(config)
}

/// Commit one text value per slot
pub fn put(cache: &DiskLruCache, key: &str, values: &[&str]) -> Result<()> {
    let mut editor = cache.edit(key)?;
    for (slot, value) in values.iter().enumerate() {
        editor.set(slot, value)?;
    }
    editor.commit()
}

/// First slot of `key` as text
pub fn read_first(cache: &DiskLruCache, key: &str) -> Result<Option<String>> {
    match cache.get(key)? {
        Some(mut snapshot) => Ok(Some(snapshot.read_to_string(0)?)),
        None => Ok(None),
    }
}

/// Write a journal by hand: header for `value_count` slots, then `body`
pub fn write_journal(dir: &Path, app_version: u32, value_count: usize, body: &[&str]) {
    std::fs::create_dir_all(dir).unwrap();
    let mut content = format!("disklru.journal\n1\n{app_version}\n{value_count}\n\n");
    for line in body {
        content.push_str(line);
        content.push('\n');
    }
    std::fs::write(dir.join("journal"), content).unwrap();
}
