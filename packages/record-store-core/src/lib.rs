//! Table-oriented record store layered on a string key-value backend.
//!
//! The whole database is one [`Snapshot`] (table name to ordered records)
//! stored as a single encoded value under the store's name. Operations are
//! read-modify-write cycles over that value.

pub mod backend;
pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod snapshot;
pub mod store;

pub use backend::{FileBackend, KvBackend, MemoryBackend};
pub use codec::{SnapshotCodec, StoredSnapshot};
pub use config::StoreConfig;
pub use error::StoreError;
pub use logging::{LogLevel, LogSink, MemorySink, Severity, StoreLogger, TracingSink};
pub use snapshot::{
    find_record_index, ids_match, resolve_table, IdValue, Record, Snapshot, TableRef,
};
pub use store::{Init, RecordStore};
