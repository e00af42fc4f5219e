//! Quote source strategies
//!
//! Each fallback step is a [`PriceSource`] trait object. The chain tries
//! them in a fixed priority order and takes the first valid positive
//! value; the coordinator never branches on concrete strategies, so new
//! sources slot in without touching it.

mod coingecko;
mod direct;
mod search;
mod stale;
pub mod symbols;

pub use coingecko::CoinGeckoClient;
pub use direct::DirectSource;
pub use search::SearchSource;
pub use stale::StaleSource;

use crate::cache::{PriceKey, PriceStore};
use crate::config::QuoteCacheConfig;
use crate::errors::PriceError;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use std::sync::Arc;

/// Upstream quote API surface consumed by the lookup strategies.
///
/// [`CoinGeckoClient`] is the production implementation; strategy tests
/// script their own.
#[async_trait]
pub trait QuoteApi: Send + Sync {
    /// Quote for `(id, fiat)` via the price endpoint.
    async fn simple_price(&self, id: &str, fiat: &str) -> Result<f64, PriceError>;

    /// First candidate identifier for `query` via the search endpoint.
    async fn search(&self, query: &str) -> Result<Option<String>, PriceError>;
}

/// One fallback strategy: attempt a quote for a key, or fail.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Tag recorded on cache entries produced by this source.
    fn name(&self) -> &'static str;

    /// Whether a value from this source should re-arm the cache TTL.
    /// False for sources that replay already-cached data.
    fn cacheable(&self) -> bool {
        true
    }

    async fn fetch(&self, key: &PriceKey) -> Result<f64, PriceError>;
}

/// A value produced by the chain, tagged with the strategy that won.
#[derive(Debug, Clone)]
pub struct ChainQuote {
    pub price: f64,
    pub source: &'static str,
    pub cacheable: bool,
}

/// Ordered list of strategies tried until one yields a valid value.
pub struct SourceChain {
    sources: Vec<Arc<dyn PriceSource>>,
}

impl SourceChain {
    pub fn new(sources: Vec<Arc<dyn PriceSource>>) -> Self {
        Self { sources }
    }

    /// The production chain: direct lookup, search-assisted lookup, then
    /// the stale fallback over `store`.
    pub fn standard(config: &QuoteCacheConfig, store: Arc<PriceStore>) -> Result<Self, PriceError> {
        let client: Arc<dyn QuoteApi> = Arc::new(CoinGeckoClient::new(config.request_timeout())?);
        Ok(Self::new(vec![
            Arc::new(DirectSource::new(
                client.clone(),
                config.max_attempts,
                config.backoff_base(),
            )),
            Arc::new(SearchSource::new(client)),
            Arc::new(StaleSource::new(store)),
        ]))
    }

    /// Try each strategy in priority order. A non-positive or non-finite
    /// value never satisfies a strategy.
    pub async fn resolve(&self, key: &PriceKey) -> Result<ChainQuote, PriceError> {
        for source in &self.sources {
            match source.fetch(key).await {
                Ok(price) if price.is_finite() && price > 0.0 => {
                    logger::debug(
                        LogTag::Sources,
                        &format!("{} produced {} for {}", source.name(), price, key),
                    );
                    return Ok(ChainQuote {
                        price,
                        source: source.name(),
                        cacheable: source.cacheable(),
                    });
                }
                Ok(price) => {
                    logger::warning(
                        LogTag::Sources,
                        &format!("{} returned invalid value {} for {}", source.name(), price, key),
                    );
                }
                Err(err) => {
                    logger::warning(
                        LogTag::Sources,
                        &format!("{} failed for {}: {}", source.name(), key, err),
                    );
                }
            }
        }

        Err(PriceError::Exhausted {
            key: key.to_string(),
        })
    }
}
