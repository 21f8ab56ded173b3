//! Exchange and runtime configuration, read from the environment.

use std::env;
use std::time::Duration;

use anyhow::{Result, anyhow};

pub const DEFAULT_API_URL: &str = "https://api.delta.exchange";
pub const DEFAULT_UNDERLYING: &str = "BTC";

#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    /// Base URL of the exchange REST API, without trailing slash.
    pub api_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub underlying: String,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        ExchangeConfig {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(10),
            user_agent: "chain-board/0.1".to_string(),
            underlying: DEFAULT_UNDERLYING.to_string(),
        }
    }
}

impl ExchangeConfig {
    /// Load from process environment. Call `dotenv().ok()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let api_url = lookup("DELTA_API_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.api_url);
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(anyhow!("DELTA_API_URL must be an http(s) URL, got '{api_url}'"));
        }

        let timeout_secs = parse_u64(&lookup, "DELTA_TIMEOUT_SECS", 10)?;
        if timeout_secs == 0 {
            return Err(anyhow!("DELTA_TIMEOUT_SECS must be > 0"));
        }

        let underlying = lookup("CHAIN_UNDERLYING")
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.underlying);

        Ok(ExchangeConfig {
            api_url,
            timeout: Duration::from_secs(timeout_secs),
            user_agent: lookup("CHAIN_USER_AGENT").unwrap_or(defaults.user_agent),
            underlying,
        })
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<u64> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| anyhow!("{key} must be a non-negative integer, got '{raw}'")),
        None => Ok(default),
    }
}
