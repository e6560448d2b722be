//! In-memory progress store.

use super::{ProgressError, ProgressRecord, ProgressStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Volatile store. Clones share the same records.
///
/// Counts successful writes, which makes it easy to assert how often the
/// session persisted.
#[derive(Clone, Debug, Default)]
pub struct MemoryProgressStore {
    records: Arc<Mutex<HashMap<String, ProgressRecord>>>,
    writes: Arc<AtomicUsize>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `record` under `key`.
    pub fn with_record(key: &str, record: ProgressRecord) -> Self {
        let store = Self::new();
        if let Ok(mut records) = store.records.lock() {
            records.insert(key.to_string(), record);
        }
        store
    }

    /// Number of successful `set` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl ProgressStore for MemoryProgressStore {
    fn get(&self, key: &str) -> Result<Option<ProgressRecord>, ProgressError> {
        let records = self
            .records
            .lock()
            .map_err(|_| ProgressError::Unavailable("memory store lock poisoned".into()))?;
        Ok(records.get(key).cloned())
    }

    fn set(&self, key: &str, record: &ProgressRecord) -> Result<(), ProgressError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| ProgressError::Unavailable("memory store lock poisoned".into()))?;
        records.insert(key.to_string(), record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
