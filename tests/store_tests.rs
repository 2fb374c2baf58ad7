//! Tests for the TypeStore
//!
//! These tests verify:
//! - Lazy partition creation
//! - Whole-file reads split into lines with empty fragments dropped
//! - Append framing and atomic rewrites
//! - Type tag validation

use std::fs;

use tempfile::TempDir;

use flatstore::config::DEFAULT_DELIMITER;
use flatstore::error::FlatError;
use flatstore::store::{TypeStore, DATA_FILENAME};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, TypeStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = TypeStore::new(temp_dir.path(), DEFAULT_DELIMITER);
    (temp_dir, store)
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Partition Creation Tests
// =============================================================================

#[test]
fn test_ensure_file_creates_partition() {
    let (temp, store) = setup_temp_store();

    let path = store.ensure_file("Widget").unwrap();

    assert_eq!(path, temp.path().join("Widget").join(DATA_FILENAME));
    assert!(path.exists());
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
}

#[test]
fn test_ensure_file_is_idempotent() {
    let (_temp, store) = setup_temp_store();

    store.ensure_file("Widget").unwrap();
    store.append_line("Widget", r#"{"_id":"w1"}"#).unwrap();

    // a second ensure must not truncate existing data
    store.ensure_file("Widget").unwrap();
    assert_eq!(store.read_all("Widget").unwrap().len(), 1);
}

// =============================================================================
// Read / Append Tests
// =============================================================================

#[test]
fn test_read_all_on_fresh_partition_is_empty() {
    let (_temp, store) = setup_temp_store();
    assert!(store.read_all("Widget").unwrap().is_empty());
}

#[test]
fn test_append_then_read_all_preserves_order() {
    let (_temp, store) = setup_temp_store();

    store.append_line("Widget", r#"{"_id":"w1"}"#).unwrap();
    store.append_line("Widget", r#"{"_id":"w2"}"#).unwrap();

    assert_eq!(
        store.read_all("Widget").unwrap(),
        lines(&[r#"{"_id":"w1"}"#, r#"{"_id":"w2"}"#])
    );
}

#[test]
fn test_append_frames_with_delimiter_and_newline() {
    let (temp, store) = setup_temp_store();

    store.append_line("Widget", r#"{"_id":"w1"}"#).unwrap();

    let raw = fs::read_to_string(temp.path().join("Widget").join(DATA_FILENAME)).unwrap();
    assert_eq!(raw, format!(r#"{{"_id":"w1"}}{}{}"#, DEFAULT_DELIMITER, "\n"));
}

#[test]
fn test_trailing_fragment_is_discarded() {
    let (_temp, store) = setup_temp_store();

    store.append_line("Widget", r#"{"_id":"w1"}"#).unwrap();

    // the file ends in a terminator, so a naive split yields one empty
    // trailing fragment that must not surface as a line
    assert_eq!(store.read_all("Widget").unwrap().len(), 1);
}

// =============================================================================
// Rewrite Tests
// =============================================================================

#[test]
fn test_rewrite_all_replaces_contents() {
    let (_temp, store) = setup_temp_store();

    store.append_line("Widget", r#"{"_id":"w1"}"#).unwrap();
    store.append_line("Widget", r#"{"_id":"w2"}"#).unwrap();

    store
        .rewrite_all("Widget", &lines(&[r#"{"_id":"w3"}"#]))
        .unwrap();

    assert_eq!(store.read_all("Widget").unwrap(), lines(&[r#"{"_id":"w3"}"#]));
}

#[test]
fn test_rewrite_all_leaves_no_scratch_file() {
    let (temp, store) = setup_temp_store();

    store
        .rewrite_all("Widget", &lines(&[r#"{"_id":"w1"}"#]))
        .unwrap();

    let leftovers: Vec<_> = fs::read_dir(temp.path().join("Widget"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![DATA_FILENAME]);
}

#[test]
fn test_rewrite_all_with_no_lines_empties_the_file() {
    let (temp, store) = setup_temp_store();

    store.append_line("Widget", r#"{"_id":"w1"}"#).unwrap();
    store.rewrite_all("Widget", &[]).unwrap();

    let raw = fs::read_to_string(temp.path().join("Widget").join(DATA_FILENAME)).unwrap();
    assert_eq!(raw, "");
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_hostile_type_tags_rejected() {
    let (_temp, store) = setup_temp_store();

    for tag in ["", ".", "..", "a/b", "a\\b", "nul\0byte"] {
        let result = store.partition_path(tag);
        assert!(
            matches!(result, Err(FlatError::Validation(_))),
            "tag {:?} was not rejected",
            tag
        );
    }
}

#[test]
fn test_ordinary_type_tags_accepted() {
    let (_temp, store) = setup_temp_store();

    for tag in ["Widget", "user_profile", "Order2"] {
        assert!(store.partition_path(tag).is_ok(), "tag {:?} rejected", tag);
    }
}
