//! Twelve Data quote provider
//!
//! Fetches the whole symbol batch through one `/quote` call.

use super::{decode_batch_body, error_envelope, QuoteProvider, RawBatch};
use crate::config::PulseConfig;
use crate::error::{PulseError, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

pub const TWELVE_DATA_BASE_URL: &str = "https://api.twelvedata.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Twelve Data provider (API key required)
pub struct TwelveDataProvider {
    api_key: String,
    base_url: String,
    client: Client,
}

impl TwelveDataProvider {
    /// Create a provider against the public endpoint
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_options(
            api_key,
            TWELVE_DATA_BASE_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a provider with an explicit base URL and transport timeout
    pub fn with_options(api_key: String, base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PulseError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Build from configuration. `None` when no credential is configured.
    pub fn from_config(config: &PulseConfig) -> Result<Option<Self>> {
        match config.credential() {
            Some(key) => Self::with_options(
                key.to_string(),
                &config.provider_base_url,
                Duration::from_secs(config.request_timeout_secs),
            )
            .map(Some),
            None => Ok(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl QuoteProvider for TwelveDataProvider {
    async fn batch_quote(&self, symbols: &[&str]) -> Result<RawBatch> {
        let url = format!("{}/quote", self.base_url);
        let joined = symbols.join(",");

        let response = self
            .client
            .get(&url)
            .query(&[("symbol", joined.as_str()), ("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| PulseError::Provider(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            // Surface the provider's own message when the body carries one.
            let detail = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| error_envelope(&body));
            return Err(PulseError::Provider(match detail {
                Some(msg) => format!("Twelve Data returned {}: {}", status, msg),
                None => format!("Twelve Data returned error: {}", status),
            }));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| PulseError::Provider(format!("JSON parse error: {}", e)))?;

        decode_batch_body(body)
    }

    fn name(&self) -> &str {
        "twelve_data"
    }
}
