//! # market-pulse
//!
//! Currency-pair quote aggregation with a time-bounded cache.
//!
//! One batched upstream call fetches the fixed universe of 28 currency
//! pairs plus gold. From the pairs the service derives a currency strength
//! index and a full cross-rate matrix, caches the resulting payload per
//! timeframe, and degrades through stale cache and synthetic data when the
//! provider or the store misbehaves.
//!
//! ## Example
//!
//! ```rust,no_run
//! use market_pulse::prelude::*;
//!
//! # async fn run() {
//! let service = MarketDataService::demo(InMemoryCacheStore::new(), ServiceOptions::default());
//! let response = service.respond(Some("1D")).await;
//! let payload = response.payload().unwrap();
//! println!("strongest: {}", payload.strength[0].currency);
//! # }
//! ```

pub mod analytics;
pub mod cache;
pub mod config;
pub mod currency;
pub mod data;
pub mod error;
#[cfg(feature = "server")]
pub mod server;
pub mod service;
pub mod types;
pub mod universe;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::cache::{CacheStore, InMemoryCacheStore};
    #[cfg(feature = "rusqlite-support")]
    pub use crate::cache::SqliteCacheStore;
    pub use crate::config::PulseConfig;
    pub use crate::currency::{Currency, CurrencyPair};
    pub use crate::data::{NoProvider, QuoteProvider, RawBatch, TwelveDataProvider};
    pub use crate::error::{PulseError, Result};
    pub use crate::service::{MarketDataService, PayloadSource, ServiceOptions, ServiceResponse};
    pub use crate::types::*;
}
