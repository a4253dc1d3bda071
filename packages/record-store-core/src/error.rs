//! Record store error types.

use thiserror::Error;

/// Record store operation errors.
///
/// Variants fall into two groups. Expected outcomes (unknown table, unknown
/// record, id collision, missing id) are reported to the caller and leave the
/// persisted snapshot untouched. Faults (corrupt data, backend I/O, poisoned
/// locks) abort the operation before any write happens.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Constructor received neither a well-formed snapshot nor the attach marker
    #[error("Invalid init data: {0}")]
    InvalidInit(String),

    /// Stored value could not be decoded into a snapshot
    #[error("Corrupt snapshot data: {0}")]
    CorruptData(String),

    /// Table not found
    #[error("Table '{table}' not found")]
    TableNotFound { table: String },

    /// Record not found
    #[error("Record with id {id} not found in table '{table}'")]
    RecordNotFound { table: String, id: String },

    /// A record with the same id already exists in the table
    #[error("Record with id {id} already exists in table '{table}'")]
    IdCollision { table: String, id: String },

    /// Record has no `id` field
    #[error("Record for table '{table}' has no 'id' field")]
    MissingId { table: String },

    /// Backing-store key cannot be used by the backend
    #[error("Invalid store key '{0}'")]
    InvalidKey(String),

    /// Lock poisoned (RwLock poisoned)
    #[error("Lock poisoned")]
    LockPoisoned,

    /// Disk full error during persistence
    #[error("Disk full: {0}")]
    DiskFull(String),

    /// I/O error during persistence
    #[error("I/O error: {0}")]
    IoError(String),

    /// Transient I/O error that may succeed on retry
    #[error("Transient I/O error: {0}")]
    TransientIoError(String),

    /// Configuration could not be read or holds an invalid value
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StoreError {
    /// Returns `true` for faults, `false` for expected outcomes such as a
    /// missing table or an id collision.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            StoreError::CorruptData(_)
                | StoreError::LockPoisoned
                | StoreError::DiskFull(_)
                | StoreError::IoError(_)
                | StoreError::TransientIoError(_)
        )
    }

    /// Returns `true` when the table or the record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::TableNotFound { .. } | StoreError::RecordNotFound { .. }
        )
    }
}
