//! Upstream quote providers
//!
//! A provider answers one batched request with a map from symbol to a raw,
//! loosely shaped quote object. Validation happens in the fetcher.

pub mod twelve_data;

pub use twelve_data::TwelveDataProvider;

use crate::error::{PulseError, Result};
use hashbrown::HashMap;
use serde_json::Value;
use std::future::Future;

/// Raw provider answer: symbol -> untyped quote object
pub type RawBatch = HashMap<String, Value>;

/// Trait for batched quote providers
pub trait QuoteProvider: Send + Sync {
    /// Fetch every symbol in a single request
    fn batch_quote(&self, symbols: &[&str]) -> impl Future<Output = Result<RawBatch>> + Send;

    /// Get the provider name
    fn name(&self) -> &str;
}

/// Provider type for services that run without a credential.
///
/// Uninhabited: a `MarketDataService<_, NoProvider>` can only be built with
/// `provider = None`, i.e. permanently in demo mode.
#[derive(Debug, Clone, Copy)]
pub enum NoProvider {}

impl QuoteProvider for NoProvider {
    async fn batch_quote(&self, _symbols: &[&str]) -> Result<RawBatch> {
        match *self {}
    }

    fn name(&self) -> &str {
        match *self {}
    }
}

/// Extract the message of an error envelope, if `body` is one.
///
/// An envelope is an object with `"status": "error"`, or a numeric top-level
/// `code` alongside a `message`.
pub fn error_envelope(body: &Value) -> Option<String> {
    let obj = body.as_object()?;
    let message = obj.get("message").and_then(Value::as_str);
    let status_error = obj
        .get("status")
        .and_then(Value::as_str)
        .map_or(false, |s| s.eq_ignore_ascii_case("error"));
    let coded = obj.get("code").map_or(false, Value::is_number) && message.is_some();

    if !status_error && !coded {
        return None;
    }

    let code = obj.get("code").and_then(Value::as_i64);
    Some(match (code, message) {
        (Some(code), Some(msg)) => format!("{} (code {})", msg, code),
        (None, Some(msg)) => msg.to_string(),
        (Some(code), None) => format!("provider error code {}", code),
        (None, None) => "provider reported an error".to_string(),
    })
}

/// Turn a decoded response body into a [`RawBatch`].
///
/// Error envelopes become [`PulseError::Provider`]. A flat single-quote object
/// (one with a top-level `symbol`) is accepted as a one-entry batch.
pub fn decode_batch_body(body: Value) -> Result<RawBatch> {
    if let Some(message) = error_envelope(&body) {
        return Err(PulseError::Provider(message));
    }

    let Value::Object(map) = body else {
        return Err(PulseError::Provider(
            "unexpected response shape: expected an object".to_string(),
        ));
    };

    if let Some(symbol) = map.get("symbol").and_then(Value::as_str) {
        let mut batch = RawBatch::new();
        batch.insert(symbol.to_string(), Value::Object(map));
        return Ok(batch);
    }

    Ok(map.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_error_envelope() {
        let body = json!({"code": 401, "message": "Invalid API key", "status": "error"});
        assert_eq!(
            error_envelope(&body).as_deref(),
            Some("Invalid API key (code 401)")
        );
    }

    #[test]
    fn test_code_and_message_envelope_without_status() {
        let body = json!({"code": 429, "message": "Rate limit"});
        assert!(error_envelope(&body).is_some());
    }

    #[test]
    fn test_batch_is_not_an_envelope() {
        let body = json!({"EUR/USD": {"close": "1.1"}, "GBP/USD": {"code": 400, "status": "error"}});
        assert!(error_envelope(&body).is_none());
        let batch = decode_batch_body(body).unwrap();
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_decode_rejects_envelope() {
        let body = json!({"status": "error", "message": "down for maintenance"});
        match decode_batch_body(body) {
            Err(PulseError::Provider(msg)) => assert_eq!(msg, "down for maintenance"),
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_flat_single_quote() {
        let body = json!({"symbol": "EUR/USD", "close": "1.1", "percent_change": "0.2"});
        let batch = decode_batch_body(body).unwrap();
        assert!(batch.contains_key("EUR/USD"));
    }

    #[test]
    fn test_decode_rejects_array() {
        assert!(matches!(
            decode_batch_body(json!([1, 2, 3])),
            Err(PulseError::Provider(_))
        ));
    }
}
