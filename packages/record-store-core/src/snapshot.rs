//! Snapshot model: tables of id-keyed records, plus table resolution and
//! record lookup.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;

/// Name of the identifier field every record carries.
pub const ID_FIELD: &str = "id";

/// Identifier value. See [`ids_match`] for how two ids compare.
pub type IdValue = Value;

/// A structured record. Only the `id` field is interpreted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Returns the `id` value, if present.
    pub fn id(&self) -> Option<&IdValue> {
        self.0.get(ID_FIELD)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl TryFrom<Value> for Record {
    type Error = StoreError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(StoreError::InvalidInit(format!(
                "record must be an object, got {}",
                other
            ))),
        }
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.0)
    }
}

/// Records of one table, in insertion order.
pub type Table = Vec<Record>;

/// Whole persisted state: table name to records, in insertion order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    tables: IndexMap<String, Table>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder helper: adds (or replaces) a table.
    pub fn with_table(mut self, name: impl Into<String>, records: Table) -> Self {
        self.tables.insert(name.into(), records);
        self
    }

    /// Table names in insertion order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Checks the shape required of a snapshot handed to the constructor:
    /// every record has an `id`, and ids are unique per table.
    pub fn validate(&self) -> Result<(), StoreError> {
        for (name, records) in &self.tables {
            let mut seen = HashSet::with_capacity(records.len());
            for (index, record) in records.iter().enumerate() {
                let id = record.id().ok_or_else(|| {
                    StoreError::InvalidInit(format!(
                        "record {} in table '{}' has no 'id' field",
                        index, name
                    ))
                })?;
                if !seen.insert(id_key(id)) {
                    return Err(StoreError::InvalidInit(format!(
                        "duplicate id {} in table '{}'",
                        id, name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Parses an untyped init value. Tables must be arrays of objects.
    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::InvalidInit(format!(
                    "snapshot must be an object, got {}",
                    other
                )))
            }
        };

        let mut tables = IndexMap::new();
        for (name, table) in map {
            let Value::Array(items) = table else {
                return Err(StoreError::InvalidInit(format!(
                    "table '{}' must be an array",
                    name
                )));
            };
            let records = items
                .into_iter()
                .map(Record::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            tables.insert(name, records);
        }
        Ok(Self { tables })
    }
}

/// Resolved table inside a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct TableRef<'a> {
    pub name: &'a str,
    pub records: &'a [Record],
}

/// Looks up a table by exact, case-sensitive name.
pub fn resolve_table<'a>(snapshot: &'a Snapshot, name: &str) -> Option<TableRef<'a>> {
    snapshot
        .tables
        .get_key_value(name)
        .map(|(name, records)| TableRef {
            name: name.as_str(),
            records: records.as_slice(),
        })
}

/// Mutable counterpart of [`resolve_table`].
pub fn resolve_table_mut<'a>(snapshot: &'a mut Snapshot, name: &str) -> Option<&'a mut Table> {
    snapshot.tables.get_mut(name)
}

/// Id equality. Numbers compare by numeric value, so `1` and `1.0` name the
/// same record; every other id compares as a JSON value, so `1` and `"1"`
/// differ.
pub fn ids_match(a: &IdValue, b: &IdValue) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Hashable form of an id, equal for ids that [`ids_match`].
fn id_key(id: &IdValue) -> String {
    match id.as_f64() {
        // -0.0 == 0.0 but they print differently
        Some(n) if n == 0.0 => "#0".to_string(),
        Some(n) => format!("#{}", n),
        None => id.to_string(),
    }
}

/// Position of the first record whose `id` matches `id`.
pub fn position_of(records: &[Record], id: &IdValue) -> Option<usize> {
    records
        .iter()
        .position(|record| record.id().is_some_and(|own| ids_match(own, id)))
}

/// Zero-based index of the record with `id` in `table_name`, or `None` when
/// the table or the record does not exist.
pub fn find_record_index(snapshot: &Snapshot, table_name: &str, id: &IdValue) -> Option<usize> {
    let table = resolve_table(snapshot, table_name)?;
    position_of(table.records, id)
}
