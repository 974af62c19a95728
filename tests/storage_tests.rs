//! Tests for the collection model and snapshot codec
//!
//! These tests verify:
//! - Upsert/remove ordering rules
//! - Decode of valid, legacy and corrupt snapshots
//! - Full truncate-and-rewrite persistence

use std::fs::{self, OpenOptions};
use std::io::Write;

use colldb::storage::{decode, encode, persist, try_decode, Collection, Element};
use colldb::CollError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn collection_with(name: &str, entries: &[(&str, &str)]) -> Collection {
    let mut collection = Collection::empty(name);
    for (key, value) in entries {
        collection.upsert(key, value);
    }
    collection
}

// =============================================================================
// Collection Tests
// =============================================================================

#[test]
fn test_upsert_appends_new_keys_in_order() {
    let collection = collection_with("orders", &[("a", "1"), ("b", "2"), ("c", "3")]);

    let keys: Vec<&str> = collection.keys().collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
}

#[test]
fn test_upsert_overwrites_in_place() {
    let mut collection = collection_with("orders", &[("a", "1"), ("b", "2"), ("c", "3")]);

    collection.upsert("a", "updated");

    assert_eq!(collection.len(), 3);
    assert_eq!(collection.elements[0], Element::new("a", "updated"));
    assert_eq!(collection.find("a"), Some("updated"));
}

#[test]
fn test_upsert_same_value_is_stable() {
    let mut collection = collection_with("orders", &[("a", "1"), ("b", "2")]);
    let before = collection.clone();

    collection.upsert("b", "2");

    assert_eq!(collection, before);
}

#[test]
fn test_remove_shifts_remaining_elements() {
    let mut collection = collection_with("orders", &[("a", "1"), ("b", "2"), ("c", "3")]);

    assert!(collection.remove("b"));

    let keys: Vec<&str> = collection.keys().collect();
    assert_eq!(keys, vec!["a", "c"]);
}

#[test]
fn test_remove_absent_key_is_noop() {
    let mut collection = collection_with("orders", &[("a", "1")]);
    let before = collection.clone();

    assert!(!collection.remove("zzz"));
    assert_eq!(collection, before);
}

#[test]
fn test_find_missing_key() {
    let collection = collection_with("orders", &[("a", "1")]);
    assert_eq!(collection.find("b"), None);
}

// =============================================================================
// Codec Tests
// =============================================================================

#[test]
fn test_decode_reproduces_elements() {
    let collection = collection_with(
        "orders",
        &[("id1", "shipped"), ("id2", "multi word value"), ("id3", "")],
    );

    let decoded = decode(&encode(&collection).unwrap());

    assert_eq!(decoded, collection);
}

#[test]
fn test_encode_uses_collection_and_element_fields() {
    let collection = collection_with("orders", &[("id1", "shipped")]);
    let text = String::from_utf8(encode(&collection).unwrap().to_vec()).unwrap();

    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["collection"], "orders");
    assert_eq!(json["element"][0]["key"], "id1");
    assert_eq!(json["element"][0]["value"], "shipped");
    assert!(text.ends_with('\n'));
}

#[test]
fn test_decode_accepts_null_element_list() {
    let decoded = try_decode(br#"{"collection":"example","element":null}"#).unwrap();

    assert_eq!(decoded.name, "example");
    assert!(decoded.is_empty());
}

#[test]
fn test_decode_garbage_yields_empty_collection() {
    assert_eq!(decode(b"{ not json"), Collection::default());
    assert_eq!(decode(b""), Collection::default());
}

#[test]
fn test_try_decode_reports_corruption() {
    let result = try_decode(br#"{"collection":"orders","element":[{"key":"a""#);
    assert!(matches!(result, Err(CollError::Decode(_))));
}

// =============================================================================
// Persist Tests
// =============================================================================

#[test]
fn test_persist_replaces_longer_contents() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("orders.json");
    fs::write(&path, "x".repeat(4096)).unwrap();

    let collection = collection_with("orders", &[("a", "1")]);
    let mut file = OpenOptions::new().read(true).write(true).open(&path).unwrap();
    persist(&collection, &mut file, true).unwrap();

    let on_disk = fs::read(&path).unwrap();
    assert_eq!(on_disk, encode(&collection).unwrap().to_vec());
}

#[test]
fn test_persist_twice_keeps_only_latest_snapshot() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("orders.json");

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(&path)
        .unwrap();

    let first = collection_with("orders", &[("a", "1"), ("b", "2")]);
    persist(&first, &mut file, false).unwrap();

    let second = collection_with("orders", &[("a", "1")]);
    persist(&second, &mut file, false).unwrap();
    file.flush().unwrap();

    let decoded = try_decode(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(decoded, second);
}
