/// Direct quote lookup with bounded retries
///
/// Maps the asset symbol through the synonym table and calls the quote
/// endpoint. Transient failures are retried with linear backoff
/// (attempt * base); unresolved symbols and invalid values fail the
/// strategy immediately so the chain can move on.
use super::{symbols, PriceSource, QuoteApi};
use crate::cache::PriceKey;
use crate::errors::PriceError;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub struct DirectSource {
    client: Arc<dyn QuoteApi>,
    max_attempts: u32,
    backoff_base: Duration,
}

impl DirectSource {
    pub fn new(client: Arc<dyn QuoteApi>, max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            client,
            max_attempts,
            backoff_base,
        }
    }
}

#[async_trait]
impl PriceSource for DirectSource {
    fn name(&self) -> &'static str {
        "coingecko-direct"
    }

    async fn fetch(&self, key: &PriceKey) -> Result<f64, PriceError> {
        let id = symbols::canonical_id(&key.asset);

        // Explicit bounded loop with an attempt counter; only transient
        // failures consume attempts.
        for attempt in 1..=self.max_attempts {
            match self.client.simple_price(&id, &key.fiat).await {
                Ok(price) => return Ok(price),
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    let backoff = self.backoff_base * attempt;
                    logger::debug(
                        LogTag::Sources,
                        &format!(
                            "direct lookup attempt {}/{} for {} failed ({}), backing off {}ms",
                            attempt,
                            self.max_attempts,
                            key,
                            err,
                            backoff.as_millis()
                        ),
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => return Err(err),
            }
        }

        Err(PriceError::transient(format!(
            "direct lookup for {} had no attempts configured",
            key
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    /// Plays back a fixed sequence of quote responses.
    struct ScriptedApi {
        responses: Mutex<VecDeque<Result<f64, PriceError>>>,
        calls: AtomicUsize,
        last_id: Mutex<Option<String>>,
    }

    impl ScriptedApi {
        fn new(responses: Vec<Result<f64, PriceError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
                last_id: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuoteApi for ScriptedApi {
        async fn simple_price(&self, id: &str, _fiat: &str) -> Result<f64, PriceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_id.lock() = Some(id.to_string());
            self.responses.lock().pop_front().unwrap_or(Ok(1.0))
        }

        async fn search(&self, _query: &str) -> Result<Option<String>, PriceError> {
            Ok(None)
        }
    }

    fn source(api: Arc<ScriptedApi>, max_attempts: u32, base_ms: u64) -> DirectSource {
        DirectSource::new(api, max_attempts, Duration::from_millis(base_ms))
    }

    #[tokio::test]
    async fn test_transient_failures_consume_all_attempts() {
        let api = ScriptedApi::new(vec![
            Err(PriceError::transient("HTTP 500")),
            Err(PriceError::transient("request timed out")),
            Err(PriceError::transient("HTTP 429")),
        ]);
        let err = source(api.clone(), 3, 1)
            .fetch(&PriceKey::new("sol", "usd"))
            .await
            .unwrap_err();
        assert!(err.is_transient());
        assert_eq!(api.calls(), 3);
    }

    #[tokio::test]
    async fn test_retry_recovers_within_budget() {
        let api = ScriptedApi::new(vec![Err(PriceError::transient("HTTP 500")), Ok(142.5)]);
        let price = source(api.clone(), 3, 1)
            .fetch(&PriceKey::new("sol", "usd"))
            .await
            .unwrap();
        assert_eq!(price, 142.5);
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test]
    async fn test_backoff_scales_linearly_with_attempt() {
        // Two transient failures sleep 1*base then 2*base before the third
        // attempt succeeds.
        let api = ScriptedApi::new(vec![
            Err(PriceError::transient("HTTP 500")),
            Err(PriceError::transient("HTTP 500")),
            Ok(142.5),
        ]);
        let start = Instant::now();
        source(api, 3, 20)
            .fetch(&PriceKey::new("sol", "usd"))
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_unresolved_symbol_exits_immediately() {
        let api = ScriptedApi::new(vec![Err(PriceError::UnresolvedSymbol {
            symbol: "solana".into(),
        })]);
        let err = source(api.clone(), 3, 1)
            .fetch(&PriceKey::new("sol", "usd"))
            .await
            .unwrap_err();
        assert!(matches!(err, PriceError::UnresolvedSymbol { .. }));
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_value_exits_immediately() {
        let api = ScriptedApi::new(vec![Err(PriceError::InvalidValue { value: 0.0 })]);
        let err = source(api.clone(), 3, 1)
            .fetch(&PriceKey::new("sol", "usd"))
            .await
            .unwrap_err();
        assert!(matches!(err, PriceError::InvalidValue { .. }));
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn test_symbol_mapped_through_synonym_table() {
        let api = ScriptedApi::new(vec![Ok(142.5)]);
        source(api.clone(), 3, 1)
            .fetch(&PriceKey::new("sol", "usd"))
            .await
            .unwrap();
        assert_eq!(api.last_id.lock().as_deref(), Some("solana"));
    }
}
