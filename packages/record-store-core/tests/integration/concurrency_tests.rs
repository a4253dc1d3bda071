//! Handles sharing one backend key.
//!
//! Each operation is a full read-modify-write with no isolation, so an update
//! made between another handle's read and write is lost.

use record_store_core::{MemoryBackend, RecordStore, StoreConfig};
use serde_json::json;

use super::helpers::{record, InterleavingBackend};

#[test]
fn test_sequential_handles_see_each_other() {
    let shared = MemoryBackend::new();
    let config = StoreConfig::default();
    let a = RecordStore::open("app", json!({"users": []}), shared.clone(), &config).unwrap();
    let b = RecordStore::attach("app", shared, &config).unwrap();

    a.add("users", record(json!({"id": 1}))).unwrap();
    b.add("users", record(json!({"id": 2}))).unwrap();
    assert_eq!(a.records("users").unwrap().len(), 2);
    assert!(b.add("users", record(json!({"id": 1}))).is_err());
}

#[test]
fn test_interleaved_write_is_lost() {
    let shared = MemoryBackend::new();
    let config = StoreConfig::default();
    RecordStore::open("app", json!({"users": []}), shared.clone(), &config).unwrap();

    let other = RecordStore::attach("app", shared.clone(), &config).unwrap();
    let backend = InterleavingBackend::new(shared.clone(), move || {
        other
            .add("users", record(json!({"id": "other"})))
            .unwrap();
    });
    let racing = RecordStore::attach("app", backend, &config).unwrap();

    // Reads the empty table, the other handle writes, then this write wins.
    racing.add("users", record(json!({"id": "mine"}))).unwrap();

    let observer = RecordStore::attach("app", shared, &config).unwrap();
    let ids: Vec<_> = observer
        .records("users")
        .unwrap()
        .into_iter()
        .map(|r| r.id().cloned().unwrap())
        .collect();
    assert_eq!(ids, vec![json!("mine")]);
    assert!(observer.read("users", &json!("other")).is_err());
}
