//! Reopen and replay tests

use super::{journal_body, open_inline, put, read};
use crate::errors::Result;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_reopen_restores_values_and_recency() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let cache = open_inline(temp_dir.path(), 1000)?;

    put(&cache, "a", &["1", "22"])?;
    put(&cache, "b", &["333", "4"])?;
    put(&cache, "c", &["5", "6"])?;
    cache.get("a")?;
    cache.remove("c")?;
    cache.close()?;

    let reopened = open_inline(temp_dir.path(), 1000)?;
    assert_eq!(reopened.keys(), vec!["b", "a"]);
    assert_eq!(reopened.size(), 7);
    assert_eq!(
        read(&reopened, "b")?,
        Some(vec!["333".to_string(), "4".to_string()])
    );
    assert!(reopened.get("c")?.is_none());

    // Open always leaves a compacted journal behind.
    reopened.close()?;
    let _ = open_inline(temp_dir.path(), 1000)?;
    assert_eq!(
        journal_body(temp_dir.path()),
        vec!["CLEAN a 1 2", "CLEAN b 3 1"]
    );
    Ok(())
}

#[test]
fn test_unfinished_edit_is_dropped_on_reopen() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let cache = open_inline(temp_dir.path(), 1000)?;

    let mut editor = cache.edit("k1")?;
    editor.set(0, "partial")?;
    // Simulate a crash: the editor never finishes and the cache is never
    // closed.
    std::mem::forget(editor);
    std::mem::forget(cache);

    assert!(temp_dir.path().join("k1.0.tmp").exists());

    let reopened = open_inline(temp_dir.path(), 1000)?;
    assert!(reopened.get("k1")?.is_none());
    assert!(!temp_dir.path().join("k1.0.tmp").exists());
    assert!(reopened.is_empty());

    let mut editor = reopened.edit("k1")?;
    editor.abort()?;
    reopened.close()
}

#[test]
fn test_committed_value_survives_unfinished_reedit() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let cache = open_inline(temp_dir.path(), 1000)?;

    put(&cache, "k1", &["kept", "v"])?;
    let mut editor = cache.edit("k1")?;
    editor.set(0, "lost")?;
    std::mem::forget(editor);
    std::mem::forget(cache);

    let reopened = open_inline(temp_dir.path(), 1000)?;
    assert_eq!(
        read(&reopened, "k1")?,
        Some(vec!["kept".to_string(), "v".to_string()])
    );
    assert!(!temp_dir.path().join("k1.0.tmp").exists());
    reopened.close()
}

#[test]
fn test_entry_with_missing_file_is_dropped() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let cache = open_inline(temp_dir.path(), 1000)?;

    put(&cache, "gone", &["a", "b"])?;
    put(&cache, "kept", &["c", "d"])?;
    cache.close()?;

    fs::remove_file(temp_dir.path().join("gone.1")).unwrap();

    let reopened = open_inline(temp_dir.path(), 1000)?;
    assert!(reopened.get("gone")?.is_none());
    assert!(!temp_dir.path().join("gone.0").exists());
    assert!(reopened.get("kept")?.is_some());
    assert_eq!(reopened.size(), 2);
    reopened.close()
}

#[test]
fn test_entry_with_wrong_length_is_dropped() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let cache = open_inline(temp_dir.path(), 1000)?;

    put(&cache, "k1", &["abc", "d"])?;
    cache.close()?;

    fs::write(temp_dir.path().join("k1.0"), "tampered").unwrap();

    let reopened = open_inline(temp_dir.path(), 1000)?;
    assert!(reopened.get("k1")?.is_none());
    assert_eq!(reopened.size(), 0);
    reopened.close()
}

#[test]
fn test_snapshot_edit_after_reopen() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let cache = open_inline(temp_dir.path(), 1000)?;
    put(&cache, "k1", &["a", "b"])?;
    cache.close()?;

    let reopened = open_inline(temp_dir.path(), 1000)?;
    let snapshot = reopened.get("k1")?.unwrap();
    let mut editor = match snapshot.edit()? {
        Some(editor) => editor,
        None => panic!("Snapshot of a replayed entry should be current"),
    };
    editor.set(1, "c")?;
    editor.commit()?;

    assert!(snapshot.edit()?.is_none());
    assert_eq!(read(&reopened, "k1")?, Some(vec!["a".to_string(), "c".to_string()]));
    reopened.close()
}
