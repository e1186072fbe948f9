//! In-memory cache store

use super::CacheStore;
use crate::error::{PulseError, Result};
use crate::types::{CacheEntry, ResponsePayload, Timestamp};
use hashbrown::HashMap;
use std::sync::RwLock;

/// Cache store kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .map(|e| e.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

impl CacheStore for InMemoryCacheStore {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| PulseError::StoreRead(format!("cache lock poisoned: {}", e)))?;
        Ok(entries.get(key).cloned())
    }

    fn upsert(&self, key: &str, payload: &ResponsePayload, updated_at: Timestamp) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| PulseError::StoreWrite(format!("cache lock poisoned: {}", e)))?;
        entries.insert(
            key.to_string(),
            CacheEntry {
                key: key.to_string(),
                payload: payload.clone(),
                updated_at,
            },
        );
        Ok(())
    }
}
