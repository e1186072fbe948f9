//! Currency strength index
//!
//! Every pair contributes `+change` to its base currency and `-change` to
//! its quote currency, so raw strengths over the universe sum to zero.

use crate::currency::{split_symbol, Currency};
use crate::types::{CurrencyStrength, Quote};

/// Accumulate raw strengths, indexed by [`Currency::index`].
///
/// A leg outside the universe is ignored; the other leg still counts.
pub fn raw_strengths(quotes: &[Quote]) -> [f64; 8] {
    let mut acc = [0.0_f64; 8];

    for quote in quotes {
        let Some((base, counter)) = split_symbol(&quote.symbol) else {
            log::debug!("Ignoring malformed symbol {} in strength", quote.symbol);
            continue;
        };
        if let Some(base) = Currency::from_code(base) {
            acc[base.index()] += quote.percent_change;
        }
        if let Some(counter) = Currency::from_code(counter) {
            acc[counter.index()] -= quote.percent_change;
        }
    }

    acc
}

/// Compute the strength table, sorted by raw strength, strongest first.
pub fn calculate_strength(quotes: &[Quote]) -> Vec<CurrencyStrength> {
    let raw = raw_strengths(quotes);

    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    let mut table: Vec<CurrencyStrength> = Currency::ALL
        .iter()
        .map(|&currency| {
            let strength = raw[currency.index()];
            let normalized_strength = if range > 0.0 {
                (strength - min) / range * 200.0 - 100.0
            } else {
                0.0
            };
            CurrencyStrength {
                currency,
                strength,
                normalized_strength,
            }
        })
        .collect();

    table.sort_by(|a, b| b.strength.total_cmp(&a.strength));
    table
}
