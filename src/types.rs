//! Core data model

use crate::currency::Currency;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Timestamp type used throughout the library
pub type Timestamp = DateTime<Utc>;

/// Price type
pub type Price = f64;

/// Percent change (1.0 == one percent)
pub type PercentChange = f64;

/// A single instrument quote. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub price: Price,
    pub percent_change: PercentChange,
    pub timestamp: Timestamp,
}

impl Quote {
    /// Create a new quote
    pub fn new(
        symbol: impl Into<String>,
        price: Price,
        percent_change: PercentChange,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            percent_change,
            timestamp,
        }
    }
}

/// Quotes for one request: currency pairs plus the commodity slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteSet {
    pub pairs: Vec<Quote>,
    pub gold: Option<Quote>,
}

/// Relative strength of one currency across the fetched pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyStrength {
    pub currency: Currency,
    /// Net summed percent change
    pub strength: f64,
    /// `strength` rescaled into [-100, 100]
    pub normalized_strength: f64,
}

/// Rate and change for one directed (base, quote) cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatrixCell {
    pub price: Price,
    pub change: PercentChange,
}

/// Currency × currency matrix; `None` where neither direction was supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrossRateMatrix(BTreeMap<Currency, BTreeMap<Currency, Option<MatrixCell>>>);

impl CrossRateMatrix {
    /// Matrix with every cell, diagonal included, set to `None`
    pub fn empty() -> Self {
        let rows = Currency::ALL
            .iter()
            .map(|&base| {
                let row = Currency::ALL.iter().map(|&quote| (quote, None)).collect();
                (base, row)
            })
            .collect();
        Self(rows)
    }

    pub fn get(&self, base: Currency, quote: Currency) -> Option<MatrixCell> {
        self.0.get(&base).and_then(|row| row.get(&quote)).copied().flatten()
    }

    pub fn set(&mut self, base: Currency, quote: Currency, cell: MatrixCell) {
        self.0.entry(base).or_default().insert(quote, Some(cell));
    }

    pub fn is_set(&self, base: Currency, quote: Currency) -> bool {
        self.get(base, quote).is_some()
    }

    /// Number of populated cells
    pub fn populated(&self) -> usize {
        self.0
            .values()
            .flat_map(|row| row.values())
            .filter(|cell| cell.is_some())
            .count()
    }

    /// Iterate rows in currency order
    pub fn rows(&self) -> impl Iterator<Item = (&Currency, &BTreeMap<Currency, Option<MatrixCell>>)> {
        self.0.iter()
    }
}

impl Default for CrossRateMatrix {
    fn default() -> Self {
        Self::empty()
    }
}

/// Full response body. Also the unit stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePayload {
    pub pairs: Vec<Quote>,
    pub gold: Option<Quote>,
    pub strength: Vec<CurrencyStrength>,
    pub matrix: CrossRateMatrix,
    pub last_updated: Timestamp,
    pub timeframe: String,
    pub from_cache: bool,
    /// Seconds since the payload was computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_age: Option<u64>,
    /// Seconds until the cached payload expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_refresh: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_demo: Option<bool>,
    /// Advisory message on degraded-but-served responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponsePayload {
    /// Copy of a stored payload labelled as a fresh cache hit
    pub fn as_fresh_hit(&self, age_secs: u64, ttl_secs: u64) -> Self {
        Self {
            from_cache: true,
            cache_age: Some(age_secs),
            next_refresh: Some(ttl_secs.saturating_sub(age_secs)),
            error: None,
            ..self.clone()
        }
    }

    /// Copy of a stored payload served past its TTL because the live path failed
    pub fn as_stale_fallback(&self, age_secs: u64, advisory: impl Into<String>) -> Self {
        Self {
            from_cache: true,
            cache_age: Some(age_secs),
            next_refresh: None,
            error: Some(advisory.into()),
            ..self.clone()
        }
    }

    pub fn is_demo(&self) -> bool {
        self.is_demo.unwrap_or(false)
    }
}

/// One cached payload per timeframe
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub payload: ResponsePayload,
    pub updated_at: Timestamp,
}

impl CacheEntry {
    /// Whole seconds elapsed since the write; clock skew clamps to zero.
    pub fn age_secs(&self, now: Timestamp) -> u64 {
        (now - self.updated_at).num_seconds().max(0) as u64
    }

    /// Whether the entry is younger than `ttl_secs` at `now`
    pub fn is_fresh(&self, now: Timestamp, ttl_secs: u64) -> bool {
        let elapsed_ms = (now - self.updated_at).num_milliseconds();
        elapsed_ms < (ttl_secs as i64).saturating_mul(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample_payload(now: Timestamp) -> ResponsePayload {
        ResponsePayload {
            pairs: vec![Quote::new("EUR/USD", 1.1, 0.5, now)],
            gold: None,
            strength: Vec::new(),
            matrix: CrossRateMatrix::empty(),
            last_updated: now,
            timeframe: "1D".to_string(),
            from_cache: false,
            cache_age: None,
            next_refresh: None,
            is_demo: None,
            error: None,
        }
    }

    #[test]
    fn test_empty_matrix_shape() {
        let matrix = CrossRateMatrix::empty();
        assert_eq!(matrix.rows().count(), 8);
        assert!(matrix.rows().all(|(_, row)| row.len() == 8));
        assert_eq!(matrix.populated(), 0);
    }

    #[test]
    fn test_matrix_serializes_with_currency_keys() {
        let mut matrix = CrossRateMatrix::empty();
        matrix.set(Currency::EUR, Currency::USD, MatrixCell { price: 1.1, change: 0.5 });
        let json = serde_json::to_value(&matrix).unwrap();

        assert_eq!(json["EUR"]["USD"]["price"], 1.1);
        assert!(json["USD"]["EUR"].is_null());
        assert!(json["EUR"]["EUR"].is_null());
    }

    #[test]
    fn test_payload_camel_case_and_optional_fields() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let json = serde_json::to_value(sample_payload(now)).unwrap();

        assert_eq!(json["fromCache"], false);
        assert_eq!(json["pairs"][0]["percentChange"], 0.5);
        assert!(json.get("lastUpdated").is_some());
        assert!(json.get("cacheAge").is_none());
        assert!(json.get("isDemo").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_payload_json_roundtrip() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let payload = sample_payload(now);
        let text = serde_json::to_string(&payload).unwrap();
        let back: ResponsePayload = serde_json::from_str(&text).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_fresh_hit_annotation() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let hit = sample_payload(now).as_fresh_hit(120, 300);
        assert!(hit.from_cache);
        assert_eq!(hit.cache_age, Some(120));
        assert_eq!(hit.next_refresh, Some(180));
    }

    #[test]
    fn test_cache_entry_freshness() {
        let written = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let entry = CacheEntry {
            key: "global-1D".to_string(),
            payload: sample_payload(written),
            updated_at: written,
        };

        assert!(entry.is_fresh(written + Duration::seconds(299), 300));
        assert!(!entry.is_fresh(written + Duration::seconds(300), 300));
        assert_eq!(entry.age_secs(written + Duration::seconds(42)), 42);
        assert_eq!(entry.age_secs(written - Duration::seconds(5)), 0);
    }
}
