//! Synthetic quote generator for demo and offline operation
//!
//! Every currency gets a jittered USD reference value and a drift. Pair
//! prices and changes are derived from those, so the generated universe is
//! triangularly consistent (EUR/JPY ≈ EUR/USD × USD/JPY).

use crate::currency::{Currency, CurrencyPair};
use crate::types::{Quote, QuoteSet, Timestamp};
use crate::universe::{GOLD_SYMBOL, PAIR_SYMBOLS};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Approximate USD value of one unit of each currency
fn usd_reference(currency: Currency) -> f64 {
    match currency {
        Currency::USD => 1.0,
        Currency::EUR => 1.085,
        Currency::GBP => 1.27,
        Currency::JPY => 1.0 / 150.0,
        Currency::CHF => 1.12,
        Currency::AUD => 0.66,
        Currency::CAD => 0.735,
        Currency::NZD => 0.605,
    }
}

const GOLD_REFERENCE: f64 = 2350.0;
const PRICE_JITTER: f64 = 0.005;
const MAX_DRIFT_PCT: f64 = 0.8;
const MAX_GOLD_CHANGE_PCT: f64 = 1.5;

/// Generate a complete universe (28 pairs plus gold) from `rng`.
pub fn generate_quotes<R: Rng + ?Sized>(rng: &mut R, now: Timestamp) -> QuoteSet {
    let mut value = [0.0_f64; 8];
    let mut drift = [0.0_f64; 8];
    for currency in Currency::ALL {
        let jitter = 1.0 + rng.gen_range(-PRICE_JITTER..PRICE_JITTER);
        value[currency.index()] = usd_reference(currency) * jitter;
        drift[currency.index()] = rng.gen_range(-MAX_DRIFT_PCT..MAX_DRIFT_PCT);
    }

    let pairs = PAIR_SYMBOLS
        .iter()
        .filter_map(|symbol| CurrencyPair::parse(symbol))
        .map(|pair| {
            let (b, q) = (pair.base.index(), pair.quote.index());
            let decimals = if pair.quote == Currency::JPY { 3 } else { 5 };
            let price = round_to(value[b] / value[q], decimals);
            let change = round_to(drift[b] - drift[q], 2);
            Quote::new(pair.symbol(), price, change, now)
        })
        .collect();

    let gold_price = GOLD_REFERENCE * (1.0 + rng.gen_range(-0.01..0.01));
    let gold_change = rng.gen_range(-MAX_GOLD_CHANGE_PCT..MAX_GOLD_CHANGE_PCT);
    let gold = Quote::new(GOLD_SYMBOL, round_to(gold_price, 2), round_to(gold_change, 2), now);

    QuoteSet {
        pairs,
        gold: Some(gold),
    }
}

/// Reproducible variant of [`generate_quotes`]
pub fn generate_seeded(seed: u64, now: Timestamp) -> QuoteSet {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_quotes(&mut rng, now)
}

fn round_to(x: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (x * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_complete_universe() {
        let set = generate_seeded(7, Utc::now());
        assert_eq!(set.pairs.len(), 28);
        assert!(set.gold.is_some());
        for (quote, symbol) in set.pairs.iter().zip(PAIR_SYMBOLS) {
            assert_eq!(quote.symbol, symbol);
            assert!(quote.price > 0.0);
            assert!(quote.percent_change.abs() <= 2.0 * MAX_DRIFT_PCT + 0.01);
        }
    }

    #[test]
    fn test_plausible_price_ranges() {
        let set = generate_seeded(11, Utc::now());
        for quote in &set.pairs {
            if quote.symbol.ends_with("/JPY") {
                assert!(quote.price > 50.0 && quote.price < 250.0, "{:?}", quote);
            } else {
                assert!(quote.price > 0.3 && quote.price < 3.0, "{:?}", quote);
            }
        }
        let gold = set.gold.unwrap();
        assert!(gold.price > 2300.0 && gold.price < 2400.0);
    }

    #[test]
    fn test_same_seed_same_data() {
        let now = Utc::now();
        assert_eq!(generate_seeded(42, now), generate_seeded(42, now));
        assert_ne!(generate_seeded(42, now), generate_seeded(43, now));
    }

    #[test]
    fn test_triangular_consistency() {
        let set = generate_seeded(3, Utc::now());
        let price = |s: &str| set.pairs.iter().find(|q| q.symbol == s).unwrap().price;
        let implied = price("EUR/USD") * price("USD/JPY");
        assert!((implied - price("EUR/JPY")).abs() / price("EUR/JPY") < 1e-3);
    }
}
