//! Quote fetcher: one batched provider call, then validation
//!
//! Provider entries arrive with unpredictable key presence. Each entry is
//! accepted when it exposes a positive, finite price under `close` or
//! `price`; anything else is skipped and counted, never an error on its own.

use super::sources::{QuoteProvider, RawBatch};
use crate::error::{PulseError, Result};
use crate::types::{Quote, QuoteSet, Timestamp};
use crate::universe::{batch_symbols, is_gold, PAIR_SYMBOLS};
use chrono::{TimeZone, Utc};
use serde_json::Value;

/// Accepted field names for the price, in lookup order
const PRICE_FIELDS: [&str; 2] = ["close", "price"];
const CHANGE_FIELD: &str = "percent_change";
const TIMESTAMP_FIELD: &str = "timestamp";

/// Validated provider answer
#[derive(Debug, Clone, Default)]
pub struct ParsedBatch {
    pub quotes: QuoteSet,
    /// Symbols whose entries carried no usable price
    pub skipped: Vec<String>,
}

impl ParsedBatch {
    /// Total usable quotes, gold included
    pub fn usable(&self) -> usize {
        self.quotes.pairs.len() + usize::from(self.quotes.gold.is_some())
    }
}

/// Fetch the full fixed universe in a single provider call.
///
/// Fails with [`PulseError::Provider`] when the call fails and with
/// [`PulseError::EmptyResult`] when no entry survives validation.
/// No retries happen here.
pub async fn fetch_quotes<P: QuoteProvider>(provider: &P, fetched_at: Timestamp) -> Result<ParsedBatch> {
    let symbols = batch_symbols();
    log::debug!(
        "Requesting {} symbols from {} in one batch",
        symbols.len(),
        provider.name()
    );

    let raw = provider.batch_quote(&symbols).await?;
    let parsed = parse_batch(raw, fetched_at);

    if !parsed.skipped.is_empty() {
        log::warn!(
            "Skipped {} malformed entries from {}: {}",
            parsed.skipped.len(),
            provider.name(),
            parsed.skipped.join(", ")
        );
    }

    if parsed.usable() == 0 {
        return Err(PulseError::EmptyResult {
            skipped: parsed.skipped.len(),
        });
    }

    Ok(parsed)
}

/// Validate a raw batch into typed quotes.
///
/// Pairs come back in universe order; symbols outside the batch follow,
/// sorted by name. The commodity symbol lands in the `gold` slot.
pub fn parse_batch(raw: RawBatch, fetched_at: Timestamp) -> ParsedBatch {
    let mut parsed = ParsedBatch::default();

    for (symbol, entry) in raw {
        match parse_entry(&symbol, &entry, fetched_at) {
            Some(quote) if is_gold(&quote.symbol) => parsed.quotes.gold = Some(quote),
            Some(quote) => parsed.quotes.pairs.push(quote),
            None => parsed.skipped.push(symbol),
        }
    }

    parsed.quotes.pairs.sort_by(|a, b| {
        batch_position(&a.symbol)
            .cmp(&batch_position(&b.symbol))
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    parsed.skipped.sort();
    parsed
}

fn batch_position(symbol: &str) -> usize {
    PAIR_SYMBOLS
        .iter()
        .position(|s| *s == symbol)
        .unwrap_or(PAIR_SYMBOLS.len())
}

fn parse_entry(symbol: &str, entry: &Value, fetched_at: Timestamp) -> Option<Quote> {
    let obj = entry.as_object()?;

    let price = PRICE_FIELDS
        .iter()
        .find_map(|field| obj.get(*field).and_then(as_number))
        .filter(|p| p.is_finite() && *p > 0.0)?;

    let percent_change = obj
        .get(CHANGE_FIELD)
        .and_then(as_number)
        .filter(|c| c.is_finite())
        .unwrap_or(0.0);

    let timestamp = obj
        .get(TIMESTAMP_FIELD)
        .and_then(as_number)
        .and_then(|secs| Utc.timestamp_opt(secs as i64, 0).single())
        .unwrap_or(fetched_at);

    Some(Quote::new(symbol, price, percent_change, timestamp))
}

/// Numbers may arrive as JSON numbers or numeric strings.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
