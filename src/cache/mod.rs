//! Persistent cache store
//!
//! One entry per cache key (`global-<timeframe>`), replaced wholesale on
//! every write. TTL is evaluated by the reader; nothing is ever evicted.
//!
//! # Components
//!
//! - **memory**: lock-guarded map, for tests and ephemeral runs
//! - **sqlite**: durable store backed by SQLite

pub mod memory;
#[cfg(feature = "rusqlite-support")]
pub mod sqlite;

pub use memory::InMemoryCacheStore;
#[cfg(feature = "rusqlite-support")]
pub use sqlite::SqliteCacheStore;

use crate::error::Result;
use crate::types::{CacheEntry, ResponsePayload, Timestamp};
use std::sync::Arc;

/// Key/value capability consumed by the request orchestrator.
///
/// Reads and writes are atomic per entry. There is no cross-request locking:
/// concurrent writers to the same key resolve as last write wins.
pub trait CacheStore: Send + Sync {
    /// Read the entry for `key`, regardless of its age
    fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Insert or wholly replace the entry for `key`
    fn upsert(&self, key: &str, payload: &ResponsePayload, updated_at: Timestamp) -> Result<()>;
}

impl<S: CacheStore + ?Sized> CacheStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        (**self).get(key)
    }

    fn upsert(&self, key: &str, payload: &ResponsePayload, updated_at: Timestamp) -> Result<()> {
        (**self).upsert(key, payload, updated_at)
    }
}
