//! Single-flight price coordinator
//!
//! One shared fetch per key: the first caller to miss the cache leads the
//! upstream round trip, every concurrent caller for the same key joins it
//! and receives the same outcome through a one-shot channel. Upstream
//! quote APIs enforce per-IP rate limits, so a burst of N misses for one
//! key must never produce N outbound calls.

use crate::cache::{CacheEntryInfo, PriceKey, PriceStore};
use crate::config::QuoteCacheConfig;
use crate::errors::PriceError;
use crate::logger::{self, LogTag};
use crate::sources::SourceChain;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::oneshot;

type FetchOutcome = Result<f64, PriceError>;
type InFlightMap = Mutex<HashMap<PriceKey, Vec<oneshot::Sender<FetchOutcome>>>>;

pub struct PriceCoordinator {
    store: Arc<PriceStore>,
    chain: SourceChain,
    in_flight: InFlightMap,
}

impl PriceCoordinator {
    /// Coordinator with the production source chain (direct lookup,
    /// search-assisted lookup, stale fallback).
    pub fn new(config: &QuoteCacheConfig) -> Result<Self, PriceError> {
        let store = Arc::new(PriceStore::new(config.ttl()));
        let chain = SourceChain::standard(config, store.clone())?;
        Ok(Self::with_chain(store, chain))
    }

    /// Assemble a coordinator from parts. The store must be the same one
    /// any stale-fallback source in the chain reads from.
    pub fn with_chain(store: Arc<PriceStore>, chain: SourceChain) -> Self {
        Self {
            store,
            chain,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<PriceStore> {
        &self.store
    }

    /// Get the quote for `(asset, fiat)`.
    ///
    /// Serves a fresh cache hit without touching upstream; otherwise joins
    /// the in-flight fetch for the key if one exists, or leads a new one.
    /// All callers joined to one fetch observe the identical outcome.
    pub async fn get_price(
        &self,
        asset: &str,
        fiat: &str,
        force_refresh: bool,
    ) -> Result<f64, PriceError> {
        let key = PriceKey::new(asset, fiat);

        if !force_refresh {
            if let Some(entry) = self.store.get(&key) {
                if entry.is_fresh() {
                    logger::debug(
                        LogTag::Cache,
                        &format!("cache hit for {}: {} ({})", key, entry.price, entry.source),
                    );
                    return Ok(entry.price);
                }
            }
        }

        // Join an existing fetch, or register this key and lead one.
        let waiter = {
            let mut in_flight = self.in_flight.lock();
            match in_flight.get_mut(&key) {
                Some(waiters) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Some(rx)
                }
                None => {
                    in_flight.insert(key.clone(), Vec::new());
                    None
                }
            }
        };

        if let Some(rx) = waiter {
            logger::debug(
                LogTag::Coordinator,
                &format!("joining in-flight fetch for {}", key),
            );
            return match rx.await {
                Ok(outcome) => outcome,
                Err(_) => Err(PriceError::transient(
                    "in-flight fetch dropped before completion",
                )),
            };
        }

        // If this task is cancelled mid-fetch, dropping the guard releases
        // the registration and its senders, which wakes the waiters.
        let guard = FlightGuard::new(&self.in_flight, key.clone());

        let outcome = match self.chain.resolve(&key).await {
            Ok(quote) => {
                if quote.cacheable {
                    self.store.insert(key.clone(), quote.price, quote.source);
                }
                Ok(quote.price)
            }
            Err(err) => {
                logger::warning(LogTag::Coordinator, &format!("fetch for {} failed: {}", key, err));
                Err(err)
            }
        };

        // Release the registration exactly once, then deliver the shared
        // outcome to every waiter in join order.
        let waiters = guard.finish();
        for tx in waiters {
            let _ = tx.send(outcome.clone());
        }

        outcome
    }

    /// Diagnostics snapshot of every cached entry.
    pub fn cache_info(&self) -> HashMap<String, CacheEntryInfo> {
        self.store.info()
    }
}

/// Owns the in-flight registration for one key.
///
/// [`FlightGuard::finish`] releases the registration and hands back the
/// waiters; dropping an unfinished guard (leader cancelled mid-fetch)
/// releases it and drops the senders, which wakes the waiters with an
/// error. Exactly one of the two paths runs, so a guard can never clear a
/// registration made by a later leader for the same key.
struct FlightGuard<'a> {
    in_flight: &'a InFlightMap,
    key: PriceKey,
    finished: bool,
}

impl<'a> FlightGuard<'a> {
    fn new(in_flight: &'a InFlightMap, key: PriceKey) -> Self {
        Self {
            in_flight,
            key,
            finished: false,
        }
    }

    /// Clear the registration and take the waiters joined so far, in join
    /// order.
    fn finish(mut self) -> Vec<oneshot::Sender<FetchOutcome>> {
        self.finished = true;
        self.in_flight.lock().remove(&self.key).unwrap_or_default()
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.in_flight.lock().remove(&self.key);
        }
    }
}
