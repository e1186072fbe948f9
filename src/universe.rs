//! Fixed instrument universe fetched on every live request

/// The 28 cross pairs of the eight-currency universe, in provider notation.
pub const PAIR_SYMBOLS: [&str; 28] = [
    "EUR/USD", "GBP/USD", "USD/JPY", "USD/CHF", "AUD/USD", "USD/CAD", "NZD/USD",
    "EUR/GBP", "EUR/JPY", "EUR/CHF", "EUR/AUD", "EUR/CAD", "EUR/NZD",
    "GBP/JPY", "GBP/CHF", "GBP/AUD", "GBP/CAD", "GBP/NZD",
    "AUD/JPY", "AUD/CHF", "AUD/CAD", "AUD/NZD",
    "NZD/JPY", "NZD/CHF", "NZD/CAD",
    "CAD/JPY", "CAD/CHF",
    "CHF/JPY",
];

/// The single commodity instrument, carried outside the pair list.
pub const GOLD_SYMBOL: &str = "XAU/USD";

/// Timeframe used when a request does not name one
pub const DEFAULT_TIMEFRAME: &str = "1D";

const CACHE_KEY_PREFIX: &str = "global-";

/// Full batch sent upstream: every pair followed by gold.
pub fn batch_symbols() -> Vec<&'static str> {
    PAIR_SYMBOLS
        .iter()
        .copied()
        .chain(std::iter::once(GOLD_SYMBOL))
        .collect()
}

/// Whether `symbol` is the commodity slot rather than a currency pair
pub fn is_gold(symbol: &str) -> bool {
    symbol.eq_ignore_ascii_case(GOLD_SYMBOL)
}

/// Cache partition key for a timeframe label
pub fn cache_key(timeframe: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, timeframe)
}
