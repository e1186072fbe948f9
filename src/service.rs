//! Request orchestrator
//!
//! Tiers, tried in order until one serves:
//!
//! 1. fresh cache entry (younger than the TTL)
//! 2. synthetic data when no provider credential is configured
//! 3. live batched fetch; an empty answer falls through to synthetic data
//! 4. stale cache entry of any age when the live fetch failed
//!
//! Only when tier 3 fails and no entry of any age exists does the caller
//! see an error. Cache read failures count as misses and cache write
//! failures are logged; neither aborts a request.

use crate::analytics::{build_matrix, calculate_strength};
use crate::cache::CacheStore;
use crate::data::fetcher::fetch_quotes;
use crate::data::sources::{NoProvider, QuoteProvider};
use crate::data::synthetic::generate_quotes;
use crate::error::PulseError;
use crate::types::{CacheEntry, QuoteSet, ResponsePayload, Timestamp};
use crate::universe::{cache_key, DEFAULT_TIMEFRAME};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Advisory attached to stale payloads served after a live failure
pub const STALE_ADVISORY: &str = "Using cached data";

/// Orchestrator settings
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub ttl_secs: u64,
    pub default_timeframe: String,
    /// Seed for synthetic data; entropy per request when `None`
    pub demo_seed: Option<u64>,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            default_timeframe: DEFAULT_TIMEFRAME.to_string(),
            demo_seed: None,
        }
    }
}

/// Which tier produced a served payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSource {
    FreshCache,
    Demo,
    Live,
    /// Live call succeeded but yielded no usable pairs
    SyntheticFallback,
    StaleCache,
}

/// Outcome of one request
#[derive(Debug, Clone)]
pub enum ServiceResponse {
    Served {
        payload: ResponsePayload,
        source: PayloadSource,
    },
    /// Live path failed and nothing was ever cached for the timeframe
    Failed { error: String },
}

impl ServiceResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, ServiceResponse::Served { .. })
    }

    /// HTTP status for the response
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceResponse::Served { .. } => 200,
            ServiceResponse::Failed { .. } => 500,
        }
    }

    pub fn payload(&self) -> Option<&ResponsePayload> {
        match self {
            ServiceResponse::Served { payload, .. } => Some(payload),
            ServiceResponse::Failed { .. } => None,
        }
    }

    pub fn source(&self) -> Option<PayloadSource> {
        match self {
            ServiceResponse::Served { source, .. } => Some(*source),
            ServiceResponse::Failed { .. } => None,
        }
    }

    /// JSON body: the payload, or `{"error": ...}` on total failure
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            ServiceResponse::Served { payload, .. } => serde_json::to_value(payload),
            ServiceResponse::Failed { error } => Ok(serde_json::json!({ "error": error })),
        }
    }
}

/// Market data service: the single entry point for read requests.
///
/// Holds no per-request state; the store is the only shared resource.
pub struct MarketDataService<S, P> {
    store: S,
    provider: Option<P>,
    options: ServiceOptions,
}

impl<S: CacheStore> MarketDataService<S, NoProvider> {
    /// Service that always runs in demo mode
    pub fn demo(store: S, options: ServiceOptions) -> Self {
        Self {
            store,
            provider: None,
            options,
        }
    }
}

impl<S: CacheStore, P: QuoteProvider> MarketDataService<S, P> {
    /// `provider = None` selects demo mode.
    pub fn new(store: S, provider: Option<P>, options: ServiceOptions) -> Self {
        Self {
            store,
            provider,
            options,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    pub fn is_demo(&self) -> bool {
        self.provider.is_none()
    }

    /// Serve a request at the current time
    pub async fn respond(&self, timeframe: Option<&str>) -> ServiceResponse {
        self.respond_at(timeframe, Utc::now()).await
    }

    /// Serve a request as of `now`
    pub async fn respond_at(&self, timeframe: Option<&str>, now: Timestamp) -> ServiceResponse {
        let timeframe = timeframe
            .filter(|t| !t.is_empty())
            .unwrap_or(self.options.default_timeframe.as_str())
            .to_string();
        let key = cache_key(&timeframe);
        let ttl = self.options.ttl_secs;

        if let Some(entry) = self.read_entry(&key) {
            if entry.is_fresh(now, ttl) {
                let age = entry.age_secs(now);
                log::info!("Cache hit for {} ({}s old)", key, age);
                return ServiceResponse::Served {
                    payload: entry.payload.as_fresh_hit(age, ttl),
                    source: PayloadSource::FreshCache,
                };
            }
            log::debug!("Cache entry for {} expired", key);
        }

        let Some(provider) = &self.provider else {
            log::info!("No provider credential configured, serving demo data for {}", key);
            let payload = self.synthetic_payload(&key, &timeframe, now);
            return ServiceResponse::Served {
                payload,
                source: PayloadSource::Demo,
            };
        };

        match fetch_quotes(provider, now).await {
            Ok(parsed) if !parsed.quotes.pairs.is_empty() => {
                log::info!(
                    "Fetched {} pairs from {} ({} skipped)",
                    parsed.quotes.pairs.len(),
                    provider.name(),
                    parsed.skipped.len()
                );
                let payload = build_payload(parsed.quotes, &timeframe, now, false);
                self.write_entry(&key, &payload, now);
                ServiceResponse::Served {
                    payload,
                    source: PayloadSource::Live,
                }
            }
            Ok(_) | Err(PulseError::EmptyResult { .. }) => {
                log::warn!(
                    "{} returned no usable pairs, falling back to synthetic data",
                    provider.name()
                );
                let payload = self.synthetic_payload(&key, &timeframe, now);
                ServiceResponse::Served {
                    payload,
                    source: PayloadSource::SyntheticFallback,
                }
            }
            Err(e) => self.stale_or_fail(&key, e, now),
        }
    }

    fn stale_or_fail(&self, key: &str, cause: PulseError, now: Timestamp) -> ServiceResponse {
        match self.read_entry(key) {
            Some(entry) => {
                let age = entry.age_secs(now);
                log::warn!("Live fetch failed ({}), serving {} from cache ({}s old)", cause, key, age);
                ServiceResponse::Served {
                    payload: entry.payload.as_stale_fallback(age, STALE_ADVISORY),
                    source: PayloadSource::StaleCache,
                }
            }
            None => {
                log::error!("Live fetch failed and nothing cached for {}: {}", key, cause);
                ServiceResponse::Failed {
                    error: cause.to_string(),
                }
            }
        }
    }

    fn synthetic_payload(&self, key: &str, timeframe: &str, now: Timestamp) -> ResponsePayload {
        let mut rng = match self.options.demo_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let payload = build_payload(generate_quotes(&mut rng, now), timeframe, now, true);
        self.write_entry(key, &payload, now);
        payload
    }

    /// Read ignoring TTL; a failed read is a miss.
    fn read_entry(&self, key: &str) -> Option<CacheEntry> {
        match self.store.get(key) {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Cache read for {} failed, treating as miss: {}", key, e);
                None
            }
        }
    }

    fn write_entry(&self, key: &str, payload: &ResponsePayload, now: Timestamp) {
        if let Err(e) = self.store.upsert(key, payload, now) {
            log::warn!("Cache write for {} failed, serving uncached: {}", key, e);
        }
    }
}

/// Derive strength and matrix from the pairs and assemble an uncached payload.
pub fn build_payload(quotes: QuoteSet, timeframe: &str, now: Timestamp, is_demo: bool) -> ResponsePayload {
    let strength = calculate_strength(&quotes.pairs);
    let matrix = build_matrix(&quotes.pairs);

    ResponsePayload {
        pairs: quotes.pairs,
        gold: quotes.gold,
        strength,
        matrix,
        last_updated: now,
        timeframe: timeframe.to_string(),
        from_cache: false,
        cache_age: None,
        next_refresh: None,
        is_demo: is_demo.then_some(true),
        error: None,
    }
}
