//! Currency universe and currency pairs

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed eight-currency universe (ISO 4217 codes).
///
/// Declaration order is the display order of the cross-rate matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
    /// US Dollar
    USD,
    /// Euro
    EUR,
    /// British Pound Sterling
    GBP,
    /// Japanese Yen
    JPY,
    /// Swiss Franc
    CHF,
    /// Australian Dollar
    AUD,
    /// Canadian Dollar
    CAD,
    /// New Zealand Dollar
    NZD,
}

impl Currency {
    /// All currencies of the universe, in matrix order
    pub const ALL: [Currency; 8] = [
        Currency::USD,
        Currency::EUR,
        Currency::GBP,
        Currency::JPY,
        Currency::CHF,
        Currency::AUD,
        Currency::CAD,
        Currency::NZD,
    ];

    /// Get ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CHF => "CHF",
            Currency::AUD => "AUD",
            Currency::CAD => "CAD",
            Currency::NZD => "NZD",
        }
    }

    /// Parse from ISO code. Codes outside the universe yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "JPY" => Some(Currency::JPY),
            "CHF" => Some(Currency::CHF),
            "AUD" => Some(Currency::AUD),
            "CAD" => Some(Currency::CAD),
            "NZD" => Some(Currency::NZD),
            _ => None,
        }
    }

    /// Position in [`Currency::ALL`], used for dense accumulators
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Currency pair quoted as `BASE/QUOTE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurrencyPair {
    pub base: Currency,
    pub quote: Currency,
}

impl CurrencyPair {
    /// Create new currency pair
    pub fn new(base: Currency, quote: Currency) -> Self {
        Self { base, quote }
    }

    /// Parse a `BASE/QUOTE` symbol. Returns `None` when either side is
    /// outside the universe or the symbol is not slash-separated.
    pub fn parse(symbol: &str) -> Option<Self> {
        let (base, quote) = split_symbol(symbol)?;
        Some(Self::new(Currency::from_code(base)?, Currency::from_code(quote)?))
    }

    /// Get the inverse pair
    pub fn inverse(&self) -> Self {
        Self {
            base: self.quote,
            quote: self.base,
        }
    }

    /// Convert rate to inverse rate; a zero or negative rate maps to 0
    pub fn invert_rate(rate: f64) -> f64 {
        if rate > 0.0 {
            1.0 / rate
        } else {
            0.0
        }
    }

    /// Symbol in provider notation
    pub fn symbol(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// Split `BASE/QUOTE` into its two legs without interpreting them.
pub fn split_symbol(symbol: &str) -> Option<(&str, &str)> {
    let (base, quote) = symbol.split_once('/')?;
    if base.is_empty() || quote.is_empty() || quote.contains('/') {
        return None;
    }
    Some((base, quote))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_code() {
        assert_eq!(Currency::USD.code(), "USD");
        assert_eq!(Currency::NZD.code(), "NZD");
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("EUR"), Some(Currency::EUR));
        assert_eq!(Currency::from_code("jpy"), Some(Currency::JPY));
        assert_eq!(Currency::from_code("XAU"), None);
        assert_eq!(Currency::from_code("SGD"), None);
    }

    #[test]
    fn test_index_matches_all() {
        for (i, c) in Currency::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }

    #[test]
    fn test_currency_pair_parse() {
        let pair = CurrencyPair::parse("EUR/USD").unwrap();
        assert_eq!(pair.base, Currency::EUR);
        assert_eq!(pair.quote, Currency::USD);
        assert_eq!(format!("{}", pair), "EUR/USD");

        assert!(CurrencyPair::parse("XAU/USD").is_none());
        assert!(CurrencyPair::parse("EURUSD").is_none());
        assert!(CurrencyPair::parse("EUR/").is_none());
    }

    #[test]
    fn test_currency_pair_inverse() {
        let pair = CurrencyPair::new(Currency::EUR, Currency::USD);
        let inverse = pair.inverse();

        assert_eq!(inverse.base, Currency::USD);
        assert_eq!(inverse.quote, Currency::EUR);
    }

    #[test]
    fn test_invert_rate() {
        assert!((CurrencyPair::invert_rate(1.25) - 0.8).abs() < 1e-12);
        assert_eq!(CurrencyPair::invert_rate(0.0), 0.0);
    }

    #[test]
    fn test_split_symbol() {
        assert_eq!(split_symbol("XAU/USD"), Some(("XAU", "USD")));
        assert_eq!(split_symbol("A/B/C"), None);
    }
}
