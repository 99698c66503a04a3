//! Recovery from journals and directories left behind by crashes

mod common;

use common::{open_inline, put, read_first, write_journal, APP_VERSION};
use disklru_cache::{CacheError, Result};
use std::fs;
use std::io::Write;
use tempfile::TempDir;

#[test]
fn test_app_version_change_discards_cache() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();

    write_journal(dir, APP_VERSION + 1, 1, &["DIRTY k1", "CLEAN k1 3"]);
    fs::write(dir.join("k1.0"), "abc").unwrap();
    fs::write(dir.join("leftover"), "stray").unwrap();

    let cache = open_inline(dir, 1, 100)?;
    assert!(cache.is_empty());
    assert!(read_first(&cache, "k1")?.is_none());
    assert!(!dir.join("k1.0").exists());
    assert!(!dir.join("leftover").exists());

    let journal = fs::read_to_string(dir.join("journal")).unwrap();
    assert_eq!(journal, format!("disklru.journal\n1\n{APP_VERSION}\n1\n\n"));
    cache.close()
}

#[test]
fn test_value_count_change_discards_cache() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();

    let cache = open_inline(dir, 2, 100)?;
    put(&cache, "k1", &["a", "b"])?;
    cache.close()?;

    let cache = open_inline(dir, 1, 100)?;
    assert!(cache.is_empty());
    assert!(!dir.join("k1.0").exists());
    cache.close()
}

#[test]
fn test_unparseable_record_discards_cache() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();

    write_journal(dir, APP_VERSION, 1, &["DIRTY k1", "CLEAN k1 3", "BOGUS k1"]);
    fs::write(dir.join("k1.0"), "abc").unwrap();

    let cache = open_inline(dir, 1, 100)?;
    assert!(cache.is_empty());
    assert!(!dir.join("k1.0").exists());
    cache.close()
}

#[test]
fn test_wrong_length_count_discards_cache() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();

    write_journal(dir, APP_VERSION, 2, &["DIRTY k1", "CLEAN k1 3"]);

    let cache = open_inline(dir, 2, 100)?;
    assert!(cache.is_empty());
    cache.close()
}

#[test]
fn test_overflowing_lengths_discard_cache() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();

    write_journal(dir, APP_VERSION, 1, &["CLEAN a 18446744073709551615", "CLEAN b 2"]);
    fs::write(dir.join("b.0"), "22").unwrap();

    let cache = open_inline(dir, 1, 100)?;
    assert!(cache.is_empty());
    assert_eq!(cache.size(), 0);
    assert!(!dir.join("b.0").exists());
    cache.close()?;

    write_journal(dir, APP_VERSION, 2, &["CLEAN a 18446744073709551615 1"]);
    let cache = open_inline(dir, 2, 100)?;
    assert!(cache.is_empty());
    cache.close()
}

#[test]
fn test_bad_magic_discards_cache() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();

    fs::write(dir.join("journal"), "not.a.journal\n1\n7\n1\n\nCLEAN k1 3\n").unwrap();
    fs::write(dir.join("k1.0"), "abc").unwrap();

    let cache = open_inline(dir, 1, 100)?;
    assert!(cache.is_empty());
    cache.close()
}

#[test]
fn test_truncated_final_record_is_ignored() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();

    write_journal(dir, APP_VERSION, 1, &["DIRTY k1", "CLEAN k1 3", "DIRTY k2"]);
    fs::write(dir.join("k1.0"), "abc").unwrap();
    fs::write(dir.join("k2.0"), "half").unwrap();

    let mut journal = fs::OpenOptions::new()
        .append(true)
        .open(dir.join("journal"))
        .unwrap();
    journal.write_all(b"CLEAN k2 4").unwrap();
    drop(journal);

    let cache = open_inline(dir, 1, 100)?;
    assert_eq!(read_first(&cache, "k1")?, Some("abc".to_string()));
    assert!(read_first(&cache, "k2")?.is_none());
    assert_eq!(cache.size(), 3);
    cache.close()
}

#[test]
fn test_orphaned_temp_files_are_removed() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();

    write_journal(
        dir,
        APP_VERSION,
        1,
        &["DIRTY a", "CLEAN a 1", "DIRTY b", "CLEAN b 2", "READ a", "DIRTY c", "REMOVE zz"],
    );
    fs::write(dir.join("a.0"), "1").unwrap();
    fs::write(dir.join("b.0"), "22").unwrap();
    fs::write(dir.join("c.0.tmp"), "partial").unwrap();

    let cache = open_inline(dir, 1, 100)?;
    assert_eq!(cache.keys(), vec!["b", "a"]);
    assert!(!dir.join("c.0.tmp").exists());
    assert!(read_first(&cache, "c")?.is_none());
    cache.close()
}

#[test]
fn test_interrupted_compaction_restores_backup() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();

    let cache = open_inline(dir, 1, 100)?;
    put(&cache, "k1", &["value"])?;
    cache.close()?;

    // Crash after the live journal was moved aside, before the new one
    // took its place.
    fs::rename(dir.join("journal"), dir.join("journal.bkp")).unwrap();
    fs::write(dir.join("journal.tmp"), "disklru.journal\n1\n").unwrap();

    let cache = open_inline(dir, 1, 100)?;
    assert_eq!(read_first(&cache, "k1")?, Some("value".to_string()));
    assert!(!dir.join("journal.bkp").exists());
    assert!(!dir.join("journal.tmp").exists());
    cache.close()
}

#[test]
fn test_stale_backup_is_discarded() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();

    let cache = open_inline(dir, 1, 100)?;
    put(&cache, "k1", &["new"])?;
    cache.close()?;

    // Crash after the new journal was in place, before the backup was
    // deleted.
    write_journal(&dir.join("scratch"), APP_VERSION, 1, &[]);
    fs::rename(dir.join("scratch").join("journal"), dir.join("journal.bkp")).unwrap();

    let cache = open_inline(dir, 1, 100)?;
    assert_eq!(read_first(&cache, "k1")?, Some("new".to_string()));
    assert!(!dir.join("journal.bkp").exists());
    cache.close()
}

#[test]
fn test_unusable_directory_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("not-a-directory");
    fs::write(&path, "file in the way").unwrap();

    match open_inline(&path, 1, 100) {
        Err(CacheError::CacheUnavailable { directory, .. }) => assert_eq!(directory, path),
        other => panic!("Expected CacheUnavailable, got {other:?}"),
    }
}
