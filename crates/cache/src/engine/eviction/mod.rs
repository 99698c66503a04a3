//! Cache eviction logic

use super::types::{CacheInner, CacheState};

impl CacheInner {
    /// Evict least recently used entries until the cache fits its budget
    ///
    /// Entries with a live editor are skipped. If only such entries remain
    /// the cache is left over budget until a later cleanup.
    pub(crate) fn trim_locked(&self, state: &mut CacheState) {
        let mut evicted_count = 0;

        while state.over_budget() {
            let key = match state.index.eviction_candidate() {
                Some(key) => key.to_string(),
                None => {
                    tracing::debug!(
                        "Cache over budget ({} > {}) but every entry is being edited",
                        state.index.size(),
                        state.max_size
                    );
                    break;
                }
            };

            match self.remove_locked(state, &key) {
                Ok(_) => evicted_count += 1,
                Err(e) => {
                    tracing::warn!("Failed to evict {}: {}", key, e);
                    self.diagnostics.report("evict", Some(&key), &e);
                    break;
                }
            }
        }

        if evicted_count > 0 {
            tracing::debug!(
                "Evicted {} entries, cache size now {} of {}",
                evicted_count,
                state.index.size(),
                state.max_size
            );
        }
    }
}
