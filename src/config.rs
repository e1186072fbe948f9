//! Service configuration
//!
//! Loaded from a TOML file, then overridden by `MARKET_PULSE_*` environment
//! variables. The currency universe and symbol batch are not configurable;
//! see [`crate::universe`].

use crate::error::{PulseError, Result};
use crate::service::ServiceOptions;
use crate::universe::DEFAULT_TIMEFRAME;
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const ENV_API_KEY: &str = "MARKET_PULSE_API_KEY";
pub const ENV_BASE_URL: &str = "MARKET_PULSE_BASE_URL";
pub const ENV_CACHE_TTL: &str = "MARKET_PULSE_CACHE_TTL";
pub const ENV_TIMEOUT: &str = "MARKET_PULSE_TIMEOUT";
pub const ENV_CACHE_PATH: &str = "MARKET_PULSE_CACHE_PATH";
pub const ENV_BIND: &str = "MARKET_PULSE_BIND";
pub const ENV_PORT: &str = "MARKET_PULSE_PORT";
pub const ENV_DEMO_SEED: &str = "MARKET_PULSE_DEMO_SEED";

/// Configuration file structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Upstream API key. Absent (or blank) means demo mode.
    pub provider_credential: Option<String>,
    pub provider_base_url: String,
    /// Transport timeout for the upstream call
    pub request_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub default_timeframe: String,
    pub cache_path: PathBuf,
    pub bind: String,
    pub port: u16,
    /// Fixed seed for synthetic data; random per request when unset
    pub demo_seed: Option<u64>,
}

fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".market-pulse")
}

fn default_cache_path() -> PathBuf {
    app_dir().join("cache.db")
}

/// Default config file location (`~/.market-pulse/config.toml`)
pub fn default_config_path() -> PathBuf {
    app_dir().join("config.toml")
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            provider_credential: None,
            provider_base_url: crate::data::sources::twelve_data::TWELVE_DATA_BASE_URL.to_string(),
            request_timeout_secs: 30,
            cache_ttl_secs: 300,
            default_timeframe: DEFAULT_TIMEFRAME.to_string(),
            cache_path: default_cache_path(),
            bind: "127.0.0.1".to_string(),
            port: 8080,
            demo_seed: None,
        }
    }
}

impl PulseConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist and parse. Without one, the default
    /// location is tried and silently skipped when absent. Environment
    /// overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = default_config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
            .map_err(|e| PulseError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| PulseError::Config(format!("invalid TOML: {}", e)))
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production). Unparseable numeric values are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(key) = get(ENV_API_KEY) {
            self.provider_credential = Some(key);
        }
        if let Some(url) = get(ENV_BASE_URL) {
            self.provider_base_url = url;
        }
        if let Some(path) = get(ENV_CACHE_PATH) {
            self.cache_path = PathBuf::from(path);
        }
        if let Some(bind) = get(ENV_BIND) {
            self.bind = bind;
        }
        override_parsed(&get, ENV_CACHE_TTL, &mut self.cache_ttl_secs);
        override_parsed(&get, ENV_TIMEOUT, &mut self.request_timeout_secs);
        override_parsed(&get, ENV_PORT, &mut self.port);
        if let Some(raw) = get(ENV_DEMO_SEED) {
            match raw.parse() {
                Ok(seed) => self.demo_seed = Some(seed),
                Err(_) => log::warn!("Ignoring {}={:?}: not an integer", ENV_DEMO_SEED, raw),
            }
        }
    }

    /// The credential, if one is configured and non-blank
    pub fn credential(&self) -> Option<&str> {
        self.provider_credential
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn is_demo(&self) -> bool {
        self.credential().is_none()
    }

    pub fn service_options(&self) -> ServiceOptions {
        ServiceOptions {
            ttl_secs: self.cache_ttl_secs,
            default_timeframe: self.default_timeframe.clone(),
            demo_seed: self.demo_seed,
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind, self.port)
            .parse()
            .map_err(|e| PulseError::Config(format!("invalid bind address: {}", e)))
    }
}

fn override_parsed<T, G>(get: &G, name: &str, slot: &mut T)
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    if let Some(raw) = get(name) {
        match raw.parse() {
            Ok(value) => *slot = value,
            Err(_) => log::warn!("Ignoring {}={:?}: not a valid number", name, raw),
        }
    }
}
