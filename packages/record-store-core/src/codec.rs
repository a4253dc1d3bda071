//! Snapshot encoding to and from the single string stored in the backend.
//!
//! Structural serialization is JSON. [`SnapshotCodec::Base64Json`] adds a
//! standard-alphabet base64 layer on top, applied after serialization and
//! stripped before parsing.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::backend::KvBackend;
use crate::error::StoreError;
use crate::snapshot::Snapshot;

/// Serialized representation of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotCodec {
    /// Plain JSON text
    Json,
    /// JSON text wrapped in base64
    #[default]
    #[serde(alias = "base64")]
    Base64Json,
}

impl SnapshotCodec {
    /// Encodes the whole snapshot.
    pub fn encode(self, snapshot: &Snapshot) -> Result<String, StoreError> {
        let json = serde_json::to_string(snapshot)
            .map_err(|e| StoreError::CorruptData(format!("failed to serialize snapshot: {}", e)))?;
        Ok(match self {
            SnapshotCodec::Json => json,
            SnapshotCodec::Base64Json => STANDARD.encode(json.as_bytes()),
        })
    }

    /// Decodes a string produced by [`SnapshotCodec::encode`].
    pub fn decode(self, data: &str) -> Result<Snapshot, StoreError> {
        let json = match self {
            SnapshotCodec::Json => data.to_string(),
            SnapshotCodec::Base64Json => {
                let bytes = STANDARD
                    .decode(data.trim())
                    .map_err(|e| StoreError::CorruptData(format!("invalid base64: {}", e)))?;
                String::from_utf8(bytes)
                    .map_err(|e| StoreError::CorruptData(format!("invalid UTF-8: {}", e)))?
            }
        };
        serde_json::from_str(&json)
            .map_err(|e| StoreError::CorruptData(format!("invalid snapshot JSON: {}", e)))
    }

    pub fn name(self) -> &'static str {
        match self {
            SnapshotCodec::Json => "json",
            SnapshotCodec::Base64Json => "base64",
        }
    }
}

impl fmt::Display for SnapshotCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SnapshotCodec {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(SnapshotCodec::Json),
            "base64" | "base64_json" => Ok(SnapshotCodec::Base64Json),
            other => Err(StoreError::ConfigError(format!(
                "unsupported codec '{}'; expected json|base64",
                other
            ))),
        }
    }
}

/// Result of reading the snapshot key.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredSnapshot {
    Loaded(Snapshot),
    /// Nothing stored under the key
    Absent,
}

impl StoredSnapshot {
    pub fn into_option(self) -> Option<Snapshot> {
        match self {
            StoredSnapshot::Loaded(snapshot) => Some(snapshot),
            StoredSnapshot::Absent => None,
        }
    }
}

/// Reads and decodes the snapshot stored under `key`.
pub fn load<B: KvBackend + ?Sized>(
    backend: &B,
    key: &str,
    codec: SnapshotCodec,
) -> Result<StoredSnapshot, StoreError> {
    match backend.get(key)? {
        Some(data) => codec.decode(&data).map(StoredSnapshot::Loaded),
        None => Ok(StoredSnapshot::Absent),
    }
}

/// Encodes `snapshot` and replaces whatever is stored under `key`.
pub fn save<B: KvBackend + ?Sized>(
    backend: &B,
    key: &str,
    codec: SnapshotCodec,
    snapshot: &Snapshot,
) -> Result<(), StoreError> {
    let encoded = codec.encode(snapshot)?;
    backend.set(key, &encoded)
}
