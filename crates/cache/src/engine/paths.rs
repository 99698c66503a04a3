//! File names inside the cache directory

use std::path::{Path, PathBuf};

/// Committed value for `slot` of `key`
pub(crate) fn clean_file(directory: &Path, key: &str, slot: usize) -> PathBuf {
    directory.join(format!("{key}.{slot}"))
}

/// In-progress value for `slot` of `key`
pub(crate) fn dirty_file(directory: &Path, key: &str, slot: usize) -> PathBuf {
    directory.join(format!("{key}.{slot}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_generation() {
        let dir = Path::new("/tmp/cache");
        assert_eq!(clean_file(dir, "thumb-1", 0), dir.join("thumb-1.0"));
        assert_eq!(dirty_file(dir, "thumb-1", 2), dir.join("thumb-1.2.tmp"));
    }
}
