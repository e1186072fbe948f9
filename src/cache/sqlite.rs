//! Cache store with SQLite backend

use super::CacheStore;
use crate::error::{PulseError, Result};
use crate::types::{CacheEntry, ResponsePayload, Timestamp};
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Durable cache store. Payloads are stored as JSON text.
pub struct SqliteCacheStore {
    conn: Mutex<Connection>,
}

impl SqliteCacheStore {
    /// Create or open database at path
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)
            .map_err(|e| PulseError::Config(format!("Failed to open cache database: {}", e)))?;
        Self::with_connection(conn)
    }

    /// Create in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| PulseError::Config(format!("Failed to create in-memory database: {}", e)))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS market_cache (
                key TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| PulseError::Config(format!("Failed to create market_cache table: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::result::Result<MutexGuard<'_, Connection>, String> {
        self.conn
            .lock()
            .map_err(|e| format!("connection lock poisoned: {}", e))
    }

    /// All stored entries, ordered by key
    pub fn entries(&self) -> Result<Vec<CacheEntry>> {
        let conn = self.lock().map_err(PulseError::StoreRead)?;
        let mut stmt = conn
            .prepare("SELECT key, payload, updated_at FROM market_cache ORDER BY key")
            .map_err(|e| PulseError::StoreRead(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Timestamp>(2)?,
                ))
            })
            .map_err(|e| PulseError::StoreRead(format!("Failed to query cache: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| PulseError::StoreRead(format!("Failed to collect cache rows: {}", e)))?;

        rows.into_iter()
            .map(|(key, payload, updated_at)| decode_entry(key, &payload, updated_at))
            .collect()
    }
}

fn decode_entry(key: String, payload: &str, updated_at: Timestamp) -> Result<CacheEntry> {
    let payload: ResponsePayload = serde_json::from_str(payload)
        .map_err(|e| PulseError::StoreRead(format!("Corrupt payload for {}: {}", key, e)))?;
    Ok(CacheEntry {
        key,
        payload,
        updated_at,
    })
}

impl CacheStore for SqliteCacheStore {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let conn = self.lock().map_err(PulseError::StoreRead)?;
        let row = conn
            .query_row(
                "SELECT payload, updated_at FROM market_cache WHERE key = ?1",
                params![key],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, Timestamp>(1)?)),
            )
            .optional()
            .map_err(|e| PulseError::StoreRead(format!("Failed to read {}: {}", key, e)))?;

        row.map(|(payload, updated_at)| decode_entry(key.to_string(), &payload, updated_at))
            .transpose()
    }

    fn upsert(&self, key: &str, payload: &ResponsePayload, updated_at: Timestamp) -> Result<()> {
        let json = serde_json::to_string(payload)
            .map_err(|e| PulseError::StoreWrite(format!("Failed to encode payload: {}", e)))?;
        let conn = self.lock().map_err(PulseError::StoreWrite)?;
        conn.execute(
            "INSERT INTO market_cache (key, payload, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at",
            params![key, json, updated_at],
        )
        .map_err(|e| PulseError::StoreWrite(format!("Failed to write {}: {}", key, e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate_seeded;
    use crate::types::CrossRateMatrix;
    use chrono::{Duration, TimeZone, Utc};

    fn payload(now: Timestamp) -> ResponsePayload {
        let quotes = generate_seeded(5, now);
        ResponsePayload {
            pairs: quotes.pairs,
            gold: quotes.gold,
            strength: Vec::new(),
            matrix: CrossRateMatrix::empty(),
            last_updated: now,
            timeframe: "1D".to_string(),
            from_cache: false,
            cache_age: None,
            next_refresh: None,
            is_demo: Some(true),
            error: None,
        }
    }

    #[test]
    fn test_roundtrip_in_memory() {
        let store = SqliteCacheStore::open_in_memory().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 14, 30, 0).unwrap();
        let p = payload(now);

        store.upsert("global-1D", &p, now).unwrap();
        let entry = store.get("global-1D").unwrap().unwrap();

        assert_eq!(entry.key, "global-1D");
        assert_eq!(entry.updated_at, now);
        assert_eq!(entry.payload.pairs.len(), 28);
        assert_eq!(entry.payload.gold, p.gold);
    }

    #[test]
    fn test_upsert_overwrites() {
        let store = SqliteCacheStore::open_in_memory().unwrap();
        let t0 = Utc.with_ymd_and_hms(2024, 6, 3, 14, 30, 0).unwrap();
        let t1 = t0 + Duration::minutes(6);

        store.upsert("global-1D", &payload(t0), t0).unwrap();
        store.upsert("global-1D", &payload(t1), t1).unwrap();

        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].updated_at, t1);
        assert_eq!(entries[0].payload.last_updated, t1);
    }

    #[test]
    fn test_missing_key() {
        let store = SqliteCacheStore::open_in_memory().unwrap();
        assert!(store.get("global-4H").unwrap().is_none());
    }
}
