//! Quote acquisition
//!
//! - **sources**: upstream provider capability and its HTTP implementation
//! - **fetcher**: one batched fetch plus validation into typed quotes
//! - **synthetic**: reproducible demo data covering the full universe

pub mod fetcher;
pub mod sources;
pub mod synthetic;

pub use fetcher::{fetch_quotes, parse_batch, ParsedBatch};
pub use sources::{NoProvider, QuoteProvider, RawBatch, TwelveDataProvider};
pub use synthetic::{generate_quotes, generate_seeded};
