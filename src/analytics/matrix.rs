//! Cross-rate matrix synthesis
//!
//! Directly quoted cells always win. A reverse cell that was not quoted
//! itself is derived as `(1/price, -change)`.

use crate::currency::CurrencyPair;
use crate::types::{CrossRateMatrix, MatrixCell, Quote};

/// Build the full matrix from a list of pair quotes.
pub fn build_matrix(quotes: &[Quote]) -> CrossRateMatrix {
    let mut matrix = CrossRateMatrix::empty();

    for quote in quotes {
        let Some(pair) = CurrencyPair::parse(&quote.symbol) else {
            continue;
        };
        if pair.base == pair.quote {
            continue;
        }

        matrix.set(
            pair.base,
            pair.quote,
            MatrixCell {
                price: quote.price,
                change: quote.percent_change,
            },
        );

        // Only fill the reverse if nothing is there yet. A later direct
        // quote for the reverse pair overwrites this derived cell.
        if !matrix.is_set(pair.quote, pair.base) {
            matrix.set(
                pair.quote,
                pair.base,
                MatrixCell {
                    price: CurrencyPair::invert_rate(quote.price),
                    change: -quote.percent_change,
                },
            );
        }
    }

    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use crate::universe::PAIR_SYMBOLS;
    use approx::assert_relative_eq;
    use chrono::Utc;
    use proptest::prelude::*;

    fn q(symbol: &str, price: f64, change: f64) -> Quote {
        Quote::new(symbol, price, change, Utc::now())
    }

    #[test]
    fn test_direct_and_inverse_cells() {
        let matrix = build_matrix(&[q("EUR/USD", 1.1, 0.5), q("GBP/USD", 1.25, -0.3)]);

        let eur_usd = matrix.get(Currency::EUR, Currency::USD).unwrap();
        assert_relative_eq!(eur_usd.price, 1.1);
        assert_relative_eq!(eur_usd.change, 0.5);

        let usd_eur = matrix.get(Currency::USD, Currency::EUR).unwrap();
        assert_relative_eq!(usd_eur.price, 0.9091, epsilon = 1e-4);
        assert_relative_eq!(usd_eur.change, -0.5);

        let usd_gbp = matrix.get(Currency::USD, Currency::GBP).unwrap();
        assert_relative_eq!(usd_gbp.price, 0.8, epsilon = 1e-12);
        assert_relative_eq!(usd_gbp.change, 0.3);

        assert!(matrix.get(Currency::EUR, Currency::GBP).is_none());
        assert_eq!(matrix.populated(), 4);
    }

    #[test]
    fn test_zero_price_inverts_to_zero() {
        let matrix = build_matrix(&[q("USD/JPY", 0.0, 0.2)]);
        let cell = matrix.get(Currency::JPY, Currency::USD).unwrap();
        assert_eq!(cell.price, 0.0);
        assert_relative_eq!(cell.change, -0.2);
    }

    #[test]
    fn test_direct_quote_beats_derived_inverse() {
        let matrix = build_matrix(&[q("EUR/USD", 1.1, 0.5), q("USD/EUR", 0.95, -0.4)]);
        let cell = matrix.get(Currency::USD, Currency::EUR).unwrap();
        assert_relative_eq!(cell.price, 0.95);
        assert_relative_eq!(cell.change, -0.4);
        // The first direct quote is not replaced by the second's inverse.
        assert_relative_eq!(matrix.get(Currency::EUR, Currency::USD).unwrap().price, 1.1);
    }

    #[test]
    fn test_full_universe_fills_all_off_diagonal_cells() {
        let quotes: Vec<Quote> = PAIR_SYMBOLS.iter().map(|s| q(s, 1.5, 0.1)).collect();
        let matrix = build_matrix(&quotes);

        assert_eq!(matrix.populated(), 56);
        for c in Currency::ALL {
            assert!(matrix.get(c, c).is_none());
        }
    }

    #[test]
    fn test_non_currency_symbols_skipped() {
        let matrix = build_matrix(&[q("XAU/USD", 2350.0, 0.4), q("EUR/EUR", 1.0, 0.0)]);
        assert_eq!(matrix.populated(), 0);
    }

    proptest! {
        #[test]
        fn prop_inverse_consistency(
            idx in 0usize..PAIR_SYMBOLS.len(),
            price in 0.0f64..500.0,
            change in -5.0f64..5.0,
        ) {
            let symbol = PAIR_SYMBOLS[idx];
            let pair = CurrencyPair::parse(symbol).unwrap();
            let matrix = build_matrix(&[q(symbol, price, change)]);

            let inverse = matrix.get(pair.quote, pair.base).unwrap();
            let expected = if price > 0.0 { 1.0 / price } else { 0.0 };
            prop_assert!((inverse.price - expected).abs() <= 1e-9 * expected.max(1.0));
            prop_assert_eq!(inverse.change, -change);
        }
    }
}
