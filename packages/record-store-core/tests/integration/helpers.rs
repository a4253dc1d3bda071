//! Shared fixtures for integration tests.

use std::cell::{Cell, RefCell};

use record_store_core::{KvBackend, MemoryBackend, Record, StoreError};
use serde_json::Value;

/// Builds a record from a JSON object literal.
pub fn record(value: Value) -> Record {
    Record::try_from(value).expect("test record must be an object")
}

/// Backend wrapper counting writes.
#[derive(Debug, Default)]
pub struct CountingBackend {
    pub inner: MemoryBackend,
    pub sets: Cell<usize>,
}

impl CountingBackend {
    pub fn new(inner: MemoryBackend) -> Self {
        Self {
            inner,
            sets: Cell::new(0),
        }
    }
}

impl KvBackend for CountingBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.sets.set(self.sets.get() + 1);
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)
    }
}

/// Backend that runs a hook once, right after the first successful read.
///
/// Models another caller writing between this caller's read and write.
pub struct InterleavingBackend<F: FnOnce()> {
    pub inner: MemoryBackend,
    hook: RefCell<Option<F>>,
}

impl<F: FnOnce()> InterleavingBackend<F> {
    pub fn new(inner: MemoryBackend, hook: F) -> Self {
        Self {
            inner,
            hook: RefCell::new(Some(hook)),
        }
    }
}

impl<F: FnOnce()> KvBackend for InterleavingBackend<F> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self.inner.get(key)?;
        if let Some(hook) = self.hook.borrow_mut().take() {
            hook();
        }
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)
    }
}

/// Backend whose every call fails with an I/O error.
#[derive(Debug, Default)]
pub struct FailingBackend;

impl KvBackend for FailingBackend {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::IoError("medium unavailable".into()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::IoError("medium unavailable".into()))
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::IoError("medium unavailable".into()))
    }
}
