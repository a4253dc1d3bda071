//! Property tests: codec round-trips over generated snapshots, and id
//! uniqueness over generated add sequences.

use proptest::prelude::*;
use record_store_core::{MemoryBackend, Record, RecordStore, Snapshot, SnapshotCodec, StoreConfig};
use serde_json::{json, Map, Value};

use super::helpers::record;

/// Floats with short exact decimal forms, so text round-trips are lossless.
fn exact_float() -> impl Strategy<Value = f64> {
    (-1_000_000i32..1_000_000).prop_map(|n| f64::from(n) / 8.0)
}

fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        exact_float().prop_map(Value::from),
        "\\PC{0,12}".prop_map(Value::String),
    ]
}

fn json_value() -> impl Strategy<Value = Value> {
    json_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(("\\PC{0,8}", inner), 0..4)
                .prop_map(|fields| Value::Object(fields.into_iter().collect())),
        ]
    })
}

/// Id for the record at `index`. Kinds never collide with each other: floats
/// are never integral.
fn id_for(index: usize, kind: u8) -> Value {
    match kind {
        0 => json!(index),
        1 => json!(index as f64 + 0.5),
        _ => json!(format!("r-{}", index)),
    }
}

fn table() -> impl Strategy<Value = Value> {
    prop::collection::vec(
        (0u8..3, prop::collection::vec(("[a-z]{1,6}", json_value()), 0..4)),
        0..6,
    )
    .prop_map(|rows| {
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(index, (kind, fields))| {
                let mut record: Map<String, Value> = fields.into_iter().collect();
                record.insert("id".to_string(), id_for(index, kind));
                Value::Object(record)
            })
            .collect();
        Value::Array(records)
    })
}

fn snapshot() -> impl Strategy<Value = Snapshot> {
    prop::collection::vec(("\\PC{1,10}", table()), 0..4).prop_map(|tables| {
        let value = Value::Object(tables.into_iter().collect());
        Snapshot::from_value(value).expect("generated tables are arrays of objects")
    })
}

/// An id drawn from a small pool so sequences repeat. `1` and `1.0` are the
/// same id; `"1"` is a different one.
fn pooled_id() -> impl Strategy<Value = (Value, (u8, bool))> {
    (0u8..5, 0u8..3).prop_map(|(n, kind)| match kind {
        0 => (json!(n), (n, false)),
        1 => (json!(f64::from(n)), (n, false)),
        _ => (json!(n.to_string()), (n, true)),
    })
}

proptest! {
    #[test]
    fn prop_codecs_round_trip(snapshot in snapshot()) {
        prop_assert!(snapshot.validate().is_ok());
        for codec in [SnapshotCodec::Json, SnapshotCodec::Base64Json] {
            let encoded = codec.encode(&snapshot).unwrap();
            prop_assert_eq!(codec.decode(&encoded).unwrap(), snapshot.clone());
        }
    }

    #[test]
    fn prop_adds_keep_first_occurrence_only(ids in prop::collection::vec(pooled_id(), 0..24)) {
        let store = RecordStore::create(
            "app",
            Snapshot::new().with_table("items", Vec::new()),
            MemoryBackend::new(),
            &StoreConfig::default(),
        )
        .unwrap();

        let mut seen = Vec::new();
        let mut expected: Vec<Record> = Vec::new();
        for (seq, (id, identity)) in ids.into_iter().enumerate() {
            let candidate = record(json!({"id": id, "seq": seq}));
            let result = store.add("items", candidate.clone());
            if seen.contains(&identity) {
                prop_assert!(result.is_err());
            } else {
                prop_assert!(result.is_ok());
                seen.push(identity);
                expected.push(candidate);
            }
        }

        prop_assert_eq!(store.records("items").unwrap(), expected);
    }
}
