//! File backend persistence across store handles.

use ntest::timeout;
use std::fs;
use tempfile::tempdir;

use record_store_core::{
    FileBackend, KvBackend, RecordStore, SnapshotCodec, StoreConfig, StoreError,
};
use serde_json::json;

use super::helpers::record;

#[timeout(5000)]
#[test]
fn test_reopen_from_disk() {
    let temp_dir = tempdir().unwrap();
    let config = StoreConfig {
        data_dir: temp_dir.path().to_path_buf(),
        ..Default::default()
    };

    {
        let store = RecordStore::open(
            "library",
            json!({"books": [{"id": 1, "title": "Dune"}], "authors": []}),
            FileBackend::new(&config.data_dir),
            &config,
        )
        .unwrap();
        store
            .add("books", record(json!({"id": 2, "title": "Emma"})))
            .unwrap();
        store
            .add("authors", record(json!({"id": "austen", "name": "Jane Austen"})))
            .unwrap();
    }

    let reopened = RecordStore::attach("library", FileBackend::new(&config.data_dir), &config)
        .unwrap();
    assert_eq!(
        reopened.read("books", &json!(2)).unwrap(),
        record(json!({"id": 2, "title": "Emma"}))
    );
    assert_eq!(
        reopened.table_names().unwrap(),
        vec!["books".to_string(), "authors".to_string()]
    );
}

#[timeout(5000)]
#[test]
fn test_on_disk_representation_per_codec() {
    let temp_dir = tempdir().unwrap();
    let backend = FileBackend::new(temp_dir.path());

    let json_config = StoreConfig::default().with_codec(SnapshotCodec::Json);
    RecordStore::open("plain", json!({"t": [{"id": 1}]}), backend.clone(), &json_config).unwrap();
    let plain = fs::read_to_string(temp_dir.path().join("plain.db")).unwrap();
    assert_eq!(plain, r#"{"t":[{"id":1}]}"#);

    let b64_config = StoreConfig::default().with_codec(SnapshotCodec::Base64Json);
    RecordStore::open("wrapped", json!({"t": [{"id": 1}]}), backend.clone(), &b64_config)
        .unwrap();
    let wrapped = fs::read_to_string(temp_dir.path().join("wrapped.db")).unwrap();
    assert_eq!(wrapped, "eyJ0IjpbeyJpZCI6MX1dfQ==");
}

#[timeout(5000)]
#[test]
fn test_corrupt_file_aborts_without_write() {
    let temp_dir = tempdir().unwrap();
    let backend = FileBackend::new(temp_dir.path());
    let config = StoreConfig::default();

    let store = RecordStore::open("app", json!({"users": []}), backend.clone(), &config).unwrap();
    backend.set("app", "not base64 at all!").unwrap();

    let err = store.add("users", record(json!({"id": 1}))).unwrap_err();
    assert!(matches!(err, StoreError::CorruptData(_)));
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("app.db")).unwrap(),
        "not base64 at all!"
    );
}

#[timeout(5000)]
#[test]
fn test_invalid_store_name_fails_construction() {
    let temp_dir = tempdir().unwrap();
    let result = RecordStore::open(
        "../escape",
        json!({"users": []}),
        FileBackend::new(temp_dir.path()),
        &StoreConfig::default(),
    );
    assert!(matches!(result, Err(StoreError::InvalidKey(_))));
}
