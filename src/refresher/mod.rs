//! Background hot-key refresher
//!
//! Re-primes a configured set of keys on a fixed timer (one TTL period) so
//! the request path almost always hits warm cache. Each key refreshes
//! independently: one broken key logs a warning and never stalls the rest
//! of the batch or the next cycle.

use crate::cache::PriceKey;
use crate::config::QuoteCacheConfig;
use crate::coordinator::PriceCoordinator;
use crate::logger::{self, LogTag};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

pub struct PriceRefresher {
    coordinator: Arc<PriceCoordinator>,
    interval: Duration,
    hot_keys: Vec<PriceKey>,
}

impl PriceRefresher {
    pub fn new(coordinator: Arc<PriceCoordinator>, config: &QuoteCacheConfig) -> Self {
        let hot_keys = config
            .hot_keys
            .iter()
            .map(|spec| PriceKey::parse(spec))
            .collect();
        Self {
            coordinator,
            interval: config.ttl(),
            hot_keys,
        }
    }

    pub fn hot_keys(&self) -> &[PriceKey] {
        &self.hot_keys
    }

    /// Spawn the refresh loop: prime the hot keys immediately, then force a
    /// refresh every interval until `shutdown` is notified.
    pub fn start(self, shutdown: Arc<Notify>) -> JoinHandle<()> {
        tokio::spawn(async move {
            logger::info(
                LogTag::Refresher,
                &format!(
                    "starting auto-refresh every {}s for {} hot keys",
                    self.interval.as_secs(),
                    self.hot_keys.len()
                ),
            );

            self.refresh_all().await;

            let mut ticker = tokio::time::interval(self.interval);
            ticker.tick().await; // consume the immediate first tick

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.refresh_all().await;
                    }
                    _ = shutdown.notified() => {
                        logger::info(LogTag::Refresher, "auto-refresh stopped");
                        break;
                    }
                }
            }
        })
    }

    /// Force-refresh every hot key, swallowing per-key failures so one bad
    /// key cannot abort the batch.
    pub async fn refresh_all(&self) {
        logger::debug(
            LogTag::Refresher,
            &format!("refreshing {} hot keys", self.hot_keys.len()),
        );

        let refreshes = self.hot_keys.iter().map(|key| {
            let coordinator = self.coordinator.clone();
            async move {
                if let Err(err) = coordinator.get_price(&key.asset, &key.fiat, true).await {
                    logger::warning(
                        LogTag::Refresher,
                        &format!("failed to refresh {}: {}", key, err),
                    );
                }
            }
        });

        join_all(refreshes).await;
        logger::debug(LogTag::Refresher, "refresh cycle complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PriceStore;
    use crate::errors::PriceError;
    use crate::sources::{PriceSource, SourceChain};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Succeeds for every asset except "broken".
    struct SelectiveSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceSource for SelectiveSource {
        fn name(&self) -> &'static str {
            "selective"
        }

        async fn fetch(&self, key: &PriceKey) -> Result<f64, PriceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if key.asset == "broken" {
                Err(PriceError::transient("upstream down"))
            } else {
                Ok(1.0)
            }
        }
    }

    #[tokio::test]
    async fn test_one_failing_key_does_not_abort_the_batch() {
        let source = Arc::new(SelectiveSource {
            calls: AtomicUsize::new(0),
        });
        let store = Arc::new(PriceStore::new(Duration::from_secs(180)));
        let coordinator = Arc::new(PriceCoordinator::with_chain(
            store.clone(),
            SourceChain::new(vec![source.clone()]),
        ));

        let config = QuoteCacheConfig {
            hot_keys: vec!["broken".into(), "solana".into(), "tether/eur".into()],
            ..Default::default()
        };
        let refresher = PriceRefresher::new(coordinator, &config);
        assert_eq!(refresher.hot_keys().len(), 3);

        refresher.refresh_all().await;

        // The two healthy keys landed despite the broken one.
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert_eq!(store.len(), 2);
        assert!(store.get(&PriceKey::new("solana", "usd")).is_some());
        assert!(store.get(&PriceKey::new("tether", "eur")).is_some());
        assert!(store.get(&PriceKey::new("broken", "usd")).is_none());
    }

    #[tokio::test]
    async fn test_shutdown_stops_the_loop() {
        let source = Arc::new(SelectiveSource {
            calls: AtomicUsize::new(0),
        });
        let store = Arc::new(PriceStore::new(Duration::from_secs(180)));
        let coordinator = Arc::new(PriceCoordinator::with_chain(
            store,
            SourceChain::new(vec![source]),
        ));

        let config = QuoteCacheConfig {
            hot_keys: vec!["solana".into()],
            ..Default::default()
        };
        let shutdown = Arc::new(Notify::new());
        let handle = PriceRefresher::new(coordinator, &config).start(shutdown.clone());

        // Let the initial prime run, then stop.
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.notify_one();
        handle.await.unwrap();
    }
}
