//! Recency-ordered entry index
//!
//! Wraps an unbounded [`LruCache`] so that iteration order is access order,
//! and keeps the total committed size in step with every mutation. The size
//! counter is never recomputed from disk.

use crate::entry::Entry;
use lru::LruCache;

/// Key → [`Entry`] map ordered from least to most recently used
pub struct EntryIndex {
    entries: LruCache<String, Entry>,
    value_count: usize,
    size: u64,
}

impl EntryIndex {
    pub fn new(value_count: usize) -> Self {
        Self {
            entries: LruCache::unbounded(),
            value_count,
            size: 0,
        }
    }

    /// Number of tracked entries, including ones not yet readable
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total committed bytes across readable entries
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn value_count(&self) -> usize {
        self.value_count
    }

    /// Look up an entry without changing recency
    pub fn peek(&self, key: &str) -> Option<&Entry> {
        self.entries.peek(key)
    }

    /// Look up or create an entry without changing the recency of an
    /// existing one; new entries start most recently used
    pub(crate) fn get_or_insert(&mut self, key: &str) -> &mut Entry {
        if !self.entries.contains(key) {
            self.entries.put(key.to_string(), Entry::new(self.value_count));
        }

        match self.entries.peek_mut(key) {
            Some(entry) => entry,
            None => unreachable!("entry inserted above"),
        }
    }

    pub(crate) fn set_editor(&mut self, key: &str, editor: Option<crate::entry::EditorId>) {
        if let Some(entry) = self.entries.peek_mut(key) {
            entry.set_editor(editor);
        }
    }

    /// Move `key` to the most recently used position
    pub fn touch(&mut self, key: &str) {
        let _ = self.entries.get(key);
    }

    /// Whether committing `lengths` for `key` keeps the size representable
    pub(crate) fn can_commit(&self, key: &str, lengths: &[u64]) -> bool {
        let old = self
            .entries
            .peek(key)
            .filter(|entry| entry.is_readable())
            .map_or(0, Entry::total_length);

        lengths
            .iter()
            .try_fold(self.size.saturating_sub(old), |total, length| {
                total.checked_add(*length)
            })
            .is_some()
    }

    /// Record a completed commit and make the entry most recently used
    pub(crate) fn mark_clean(&mut self, key: &str, lengths: Vec<u64>, sequence_number: u64) {
        let entry = self.get_or_insert(key);
        let old = if entry.is_readable() {
            entry.total_length()
        } else {
            0
        };
        entry.commit(lengths, sequence_number);
        let new = entry.total_length();

        self.size = self.size.saturating_sub(old).saturating_add(new);
        self.touch(key);
    }

    /// Drop an entry, releasing its committed bytes
    pub(crate) fn remove(&mut self, key: &str) -> Option<Entry> {
        let entry = self.entries.pop(key)?;
        if entry.is_readable() {
            self.size = self.size.saturating_sub(entry.total_length());
        }
        Some(entry)
    }

    /// Least recently used entry that trim is allowed to evict
    pub fn eviction_candidate(&self) -> Option<&str> {
        self.iter()
            .find(|(_, entry)| entry.is_evictable())
            .map(|(key, _)| key)
    }

    /// Entries from least to most recently used
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().rev().map(|(key, entry)| (key.as_str(), entry))
    }

    /// Sum of readable lengths, computed from scratch
    #[cfg(test)]
    pub(crate) fn sum_lengths(&self) -> u64 {
        self.iter()
            .filter(|(_, entry)| entry.is_readable())
            .map(|(_, entry)| entry.total_length())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(index: &EntryIndex) -> Vec<&str> {
        index.iter().map(|(key, _)| key).collect()
    }

    #[test]
    fn test_recency_order() {
        let mut index = EntryIndex::new(1);
        index.mark_clean("a", vec![1], 1);
        index.mark_clean("b", vec![2], 2);
        index.mark_clean("c", vec![3], 3);
        assert_eq!(keys(&index), vec!["a", "b", "c"]);

        index.touch("a");
        assert_eq!(keys(&index), vec!["b", "c", "a"]);
        assert_eq!(index.eviction_candidate(), Some("b"));
        assert_eq!(index.size(), 6);
    }

    #[test]
    fn test_get_or_insert_does_not_promote() {
        let mut index = EntryIndex::new(1);
        index.mark_clean("a", vec![1], 1);
        index.mark_clean("b", vec![1], 2);

        index.get_or_insert("a").set_editor(Some(9));
        assert_eq!(keys(&index), vec!["a", "b"]);

        index.get_or_insert("c");
        assert_eq!(keys(&index), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_size_tracks_commits_and_removals() {
        let mut index = EntryIndex::new(2);
        index.mark_clean("a", vec![10, 5], 1);
        index.mark_clean("b", vec![1, 1], 2);
        assert_eq!(index.size(), 17);

        index.mark_clean("a", vec![2, 2], 3);
        assert_eq!(index.size(), 6);

        let removed = index.remove("b").unwrap();
        assert_eq!(removed.lengths(), &[1, 1]);
        assert_eq!(index.size(), 4);
        assert_eq!(index.size(), index.sum_lengths());

        // Entries that were never committed do not count.
        index.get_or_insert("c");
        assert_eq!(index.size(), 4);
        index.remove("c");
        assert_eq!(index.size(), 4);
    }

    #[test]
    fn test_eviction_candidate_skips_pinned_and_unreadable() {
        let mut index = EntryIndex::new(1);
        index.get_or_insert("new");
        index.mark_clean("a", vec![1], 1);
        index.mark_clean("b", vec![1], 2);
        index.set_editor("a", Some(1));

        assert_eq!(index.eviction_candidate(), Some("b"));

        index.set_editor("b", Some(2));
        assert_eq!(index.eviction_candidate(), None);
    }
}
