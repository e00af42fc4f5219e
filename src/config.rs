/// Runtime configuration for the price cache.
///
/// Every knob the two original deployments disagreed on (retry count,
/// backoff unit, timeout) lives here instead of being hard-coded, so the
/// dominant 3-attempt / linear-backoff behavior is a default, not an
/// invariant.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Cache entry lifetime: 3 minutes.
pub const DEFAULT_TTL_MS: u64 = 3 * 60 * 1000;

/// Direct lookup attempts before falling through to the search strategy.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Backoff unit; attempt N sleeps N * base before the next try.
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1000;

/// Per-request timeout - the quote API can be slow under rate limiting.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 15_000;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuoteCacheConfig {
    /// Time-to-live for cached entries, in milliseconds
    pub ttl_ms: u64,

    /// Attempts per direct lookup before giving up on the strategy
    pub max_attempts: u32,

    /// Backoff unit in milliseconds (linear: attempt * base)
    pub backoff_base_ms: u64,

    /// Timeout for a single upstream request, in milliseconds
    pub request_timeout_ms: u64,

    /// Keys the background refresher keeps warm. Each entry is either an
    /// asset symbol ("solana", refreshed against usd) or an explicit
    /// "asset/fiat" pair ("sol/eur").
    pub hot_keys: Vec<String>,
}

impl Default for QuoteCacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: DEFAULT_TTL_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            hot_keys: vec![
                "solana".to_string(),
                "usd-coin".to_string(),
                "tether".to_string(),
                "euro-coin".to_string(),
            ],
        }
    }
}

impl QuoteCacheConfig {
    /// Load configuration from a JSON file, falling back to defaults for
    /// any missing field.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        Ok(config)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
