use crate::storage::{KeyValueStore, StorageError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-process key/value store
///
/// Nothing survives the process. Writes to selected keys can be made to fail,
/// which is how partial-failure behavior of the managers is exercised.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    failing_keys: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set`/`remove` on `key` fail until cleared
    pub fn fail_writes_to(&self, key: &str) {
        self.failing_keys
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing_keys
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Current raw value, bypassing the async interface
    pub fn snapshot(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn check_writable(&self, key: &str) -> Result<(), StorageError> {
        let failing = self.failing_keys.lock().unwrap_or_else(|e| e.into_inner());
        if failing.contains(key) {
            return Err(StorageError::Unavailable {
                key: key.to_string(),
                reason: "write rejected".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.snapshot(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable(key)?;
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable(key)?;
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}
