//! Cache builder and initialization

use crate::config::{CacheConfig, CacheConfigBuilder, CleanupMode};
use crate::errors::{CacheError, Result};
use crate::journal::JournalHeader;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

use super::cleanup::{CleanupWorker, Diagnostics};
use super::recovery::recover;
use super::types::{CacheInner, CacheState, DiskLruCache};

impl DiskLruCache {
    /// Open the cache in `directory`, creating it if needed
    ///
    /// An existing journal is replayed. If it was written with a different
    /// `app_version` or `value_count`, or cannot be parsed, the directory is
    /// discarded and the cache starts empty.
    pub fn open(
        directory: impl Into<PathBuf>,
        app_version: u32,
        value_count: usize,
        max_size: u64,
    ) -> Result<Self> {
        let config = CacheConfigBuilder::new()
            .with_directory(directory)
            .with_app_version(app_version)
            .with_value_count(value_count)
            .with_max_size(max_size)
            .build()?;

        Self::open_with_config(config)
    }

    /// Open the cache described by `config`
    pub fn open_with_config(config: CacheConfig) -> Result<Self> {
        config.validate()?;

        let directory = config.directory;
        let header = JournalHeader::new(config.app_version, config.value_count);

        let recovered = match recover(&directory, &header) {
            Ok(recovered) => recovered,
            Err(e) => {
                tracing::error!("Cannot open cache at {}: {}", directory.display(), e);
                return Err(CacheError::unavailable(&directory, e));
            }
        };

        tracing::info!(
            "Opened cache at {} ({} entries, {} of {} bytes)",
            directory.display(),
            recovered.index.len(),
            recovered.index.size(),
            config.max_size
        );

        let state = CacheState {
            journal: Some(recovered.journal),
            index: recovered.index,
            max_size: config.max_size,
            op_count: 0,
            next_sequence_number: recovered.next_sequence_number,
            next_editor_id: 1,
        };

        let inner = Arc::new(CacheInner {
            directory,
            header,
            rebuild_threshold: config.rebuild_threshold,
            cleanup_mode: config.cleanup_mode,
            state: Mutex::new(state),
            cleanup: Mutex::new(None),
            diagnostics: Diagnostics::new(),
        });

        if config.cleanup_mode == CleanupMode::Background {
            let worker = CleanupWorker::spawn(&inner.directory, Arc::downgrade(&inner))
                .map_err(|e| CacheError::unavailable(&inner.directory, e))?;
            *inner.cleanup.lock() = Some(worker);
        }

        let cache = Self { inner };

        // A smaller budget than last time takes effect right away.
        {
            let mut state = cache.inner.state.lock();
            cache.inner.maybe_schedule_cleanup(&mut state);
        }

        Ok(cache)
    }
}
