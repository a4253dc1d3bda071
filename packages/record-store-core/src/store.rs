//! Record store: table-scoped CRUD over a snapshot persisted under one
//! backend key.
//!
//! Every operation reads the full snapshot, works on that private copy and,
//! when it mutates, writes the full snapshot back. Nothing is cached between
//! calls.
//!
//! # Concurrency
//! There is no isolation between handles. Two stores sharing a backend key
//! can interleave their read-modify-write cycles, and the last write replaces
//! the whole snapshot, silently dropping the other caller's change.

use std::sync::Arc;

use serde_json::Value;

use crate::backend::KvBackend;
use crate::codec::{self, SnapshotCodec, StoredSnapshot};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::logging::{LogSink, StoreLogger};
use crate::snapshot::{position_of, resolve_table, resolve_table_mut, IdValue, Record, Snapshot};

/// How a store is initialized.
#[derive(Debug, Clone, PartialEq)]
pub enum Init {
    /// Persist this snapshot immediately, replacing any stored value
    Fresh(Snapshot),
    /// Use whatever is already stored under the store name
    Attach,
}

impl Init {
    /// Interprets an untyped init value: an object is a fresh snapshot,
    /// `false` is the attach marker, anything else is rejected.
    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        match value {
            Value::Bool(false) => Ok(Init::Attach),
            value @ Value::Object(_) => {
                let snapshot = Snapshot::from_value(value)?;
                Ok(Init::Fresh(snapshot))
            }
            other => Err(StoreError::InvalidInit(format!(
                "expected a snapshot object or false, got {}",
                other
            ))),
        }
    }
}

/// Table-oriented record store.
#[derive(Debug)]
pub struct RecordStore<B: KvBackend> {
    /// Backend key holding the snapshot
    name: String,
    backend: B,
    codec: SnapshotCodec,
    logger: StoreLogger,
}

impl<B: KvBackend> RecordStore<B> {
    /// Creates a store, logging through `tracing`.
    ///
    /// In fresh mode the snapshot is validated and written before this
    /// returns. In attach mode nothing is read or written.
    pub fn new(
        name: impl Into<String>,
        init: Init,
        backend: B,
        config: &StoreConfig,
    ) -> Result<Self, StoreError> {
        let logger = StoreLogger::tracing(config.log_level);
        Self::with_logger(name, init, backend, config.codec, logger)
    }

    /// Creates a store whose log output goes to `sink`.
    pub fn with_sink(
        name: impl Into<String>,
        init: Init,
        backend: B,
        config: &StoreConfig,
        sink: Arc<dyn LogSink>,
    ) -> Result<Self, StoreError> {
        let logger = StoreLogger::new(config.log_level, sink);
        Self::with_logger(name, init, backend, config.codec, logger)
    }

    /// Fresh mode shorthand.
    pub fn create(
        name: impl Into<String>,
        snapshot: Snapshot,
        backend: B,
        config: &StoreConfig,
    ) -> Result<Self, StoreError> {
        Self::new(name, Init::Fresh(snapshot), backend, config)
    }

    /// Attach mode shorthand.
    pub fn attach(
        name: impl Into<String>,
        backend: B,
        config: &StoreConfig,
    ) -> Result<Self, StoreError> {
        Self::new(name, Init::Attach, backend, config)
    }

    /// Creates a store from an untyped init value (see [`Init::from_value`]).
    pub fn open(
        name: impl Into<String>,
        init: Value,
        backend: B,
        config: &StoreConfig,
    ) -> Result<Self, StoreError> {
        let name = name.into();
        let init = Init::from_value(init).inspect_err(|e| {
            StoreLogger::tracing(config.log_level)
                .error(format!("constructor: store '{}' not created: {}", name, e));
        })?;
        Self::new(name, init, backend, config)
    }

    /// Creates a store with an explicit codec and logger.
    pub fn with_logger(
        name: impl Into<String>,
        init: Init,
        backend: B,
        codec: SnapshotCodec,
        logger: StoreLogger,
    ) -> Result<Self, StoreError> {
        let store = Self {
            name: name.into(),
            backend,
            codec,
            logger,
        };
        store
            .logger
            .info(format!("constructor: store created with name '{}'", store.name));

        match init {
            Init::Fresh(snapshot) => {
                if let Err(e) = snapshot.validate() {
                    store.logger.error(format!("constructor: {}", e));
                    return Err(e);
                }
                if let Err(e) = store.persist(&snapshot) {
                    store
                        .logger
                        .error(format!("constructor: initial snapshot not saved: {}", e));
                    return Err(e);
                }
                store.logger.info(format!(
                    "constructor: initialized with {} table(s)",
                    snapshot.table_count()
                ));
            }
            Init::Attach => {
                store
                    .logger
                    .info("constructor: attached to the stored snapshot");
            }
        }
        Ok(store)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn codec(&self) -> SnapshotCodec {
        self.codec
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Appends `record` to `table`.
    ///
    /// Fails when the table does not exist, the record has no `id`, or a
    /// record with the same `id` is already present. On failure nothing is
    /// written.
    pub fn add(&self, table: &str, record: Record) -> Result<(), StoreError> {
        let result = self.try_add(table, record);
        self.report("add", table, &result);
        result
    }

    /// Deletes the record with `id` from `table`. Later records shift down.
    pub fn remove(&self, table: &str, id: &IdValue) -> Result<(), StoreError> {
        let result = self.try_remove(table, id);
        self.report("remove", table, &result);
        result
    }

    /// Replaces the record whose `id` matches `record`'s, keeping its position.
    pub fn edit(&self, table: &str, record: Record) -> Result<(), StoreError> {
        let result = self.try_edit(table, record);
        self.report("edit", table, &result);
        result
    }

    /// Returns the record with `id` in `table`.
    pub fn read(&self, table: &str, id: &IdValue) -> Result<Record, StoreError> {
        let result = self.try_read(table, id);
        self.report("read", table, &result);
        result
    }

    /// Names of all tables, in insertion order. An absent snapshot has no tables.
    pub fn table_names(&self) -> Result<Vec<String>, StoreError> {
        let stored = codec::load(&self.backend, &self.name, self.codec)
            .inspect_err(|e| self.logger.error(format!("table_names: {}", e)))?;
        Ok(stored
            .into_option()
            .map(|snapshot| snapshot.table_names().map(str::to_string).collect())
            .unwrap_or_default())
    }

    /// All records of `table` in stored order.
    pub fn records(&self, table: &str) -> Result<Vec<Record>, StoreError> {
        let result = self.load(table).and_then(|snapshot| {
            resolve_table(&snapshot, table)
                .map(|t| t.records.to_vec())
                .ok_or_else(|| table_not_found(table))
        });
        self.report("records", table, &result);
        result
    }

    fn try_add(&self, table: &str, record: Record) -> Result<(), StoreError> {
        let mut snapshot = self.load(table)?;
        let records = resolve_table_mut(&mut snapshot, table).ok_or_else(|| table_not_found(table))?;

        let id = record.id().ok_or_else(|| StoreError::MissingId {
            table: table.to_string(),
        })?;
        if let Some(index) = position_of(records, id) {
            self.logger
                .info(format!("add: id {} already at index {}", id, index));
            return Err(StoreError::IdCollision {
                table: table.to_string(),
                id: id.to_string(),
            });
        }

        records.push(record);
        self.persist(&snapshot)
    }

    fn try_remove(&self, table: &str, id: &IdValue) -> Result<(), StoreError> {
        let mut snapshot = self.load(table)?;
        let records = resolve_table_mut(&mut snapshot, table).ok_or_else(|| table_not_found(table))?;

        let index = position_of(records, id).ok_or_else(|| record_not_found(table, id))?;
        records.remove(index);
        self.logger
            .info(format!("remove: record at index {} removed", index));
        self.persist(&snapshot)
    }

    fn try_edit(&self, table: &str, record: Record) -> Result<(), StoreError> {
        let mut snapshot = self.load(table)?;
        let records = resolve_table_mut(&mut snapshot, table).ok_or_else(|| table_not_found(table))?;

        let id = record.id().ok_or_else(|| StoreError::MissingId {
            table: table.to_string(),
        })?;
        let index = position_of(records, id).ok_or_else(|| record_not_found(table, id))?;
        records[index] = record;
        self.persist(&snapshot)
    }

    fn try_read(&self, table: &str, id: &IdValue) -> Result<Record, StoreError> {
        let snapshot = self.load(table)?;
        let resolved = resolve_table(&snapshot, table).ok_or_else(|| table_not_found(table))?;

        let index = position_of(resolved.records, id).ok_or_else(|| record_not_found(table, id))?;
        self.logger.info(format!(
            "read: found id {} at index {} in table '{}'",
            id, index, resolved.name
        ));
        Ok(resolved.records[index].clone())
    }

    /// Reads the stored snapshot. An absent snapshot means no table exists,
    /// so it surfaces as `TableNotFound` for the requested table.
    fn load(&self, table: &str) -> Result<Snapshot, StoreError> {
        match codec::load(&self.backend, &self.name, self.codec)? {
            StoredSnapshot::Loaded(snapshot) => {
                self.logger.info("load: snapshot loaded");
                Ok(snapshot)
            }
            StoredSnapshot::Absent => {
                self.logger
                    .error(format!("load: nothing stored under '{}'", self.name));
                Err(table_not_found(table))
            }
        }
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        codec::save(&self.backend, &self.name, self.codec, snapshot)?;
        self.logger.info("persist: snapshot saved");
        Ok(())
    }

    fn report<T>(&self, op: &str, table: &str, result: &Result<T, StoreError>) {
        match result {
            Ok(_) => self
                .logger
                .info(format!("{}: succeeded on table '{}'", op, table)),
            Err(e) => self.logger.error(format!("{}: {}", op, e)),
        }
    }
}

fn table_not_found(table: &str) -> StoreError {
    StoreError::TableNotFound {
        table: table.to_string(),
    }
}

fn record_not_found(table: &str, id: &IdValue) -> StoreError {
    StoreError::RecordNotFound {
        table: table.to_string(),
        id: id.to_string(),
    }
}
