/// Stale fallback
///
/// Last resort before exhaustion: serve any prior entry for the key, no
/// matter how far past expiry. Marked non-cacheable so a stale serve never
/// re-arms the TTL - the key stays due for refresh.
use super::PriceSource;
use crate::cache::{PriceKey, PriceStore};
use crate::errors::PriceError;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use std::sync::Arc;

pub struct StaleSource {
    store: Arc<PriceStore>,
}

impl StaleSource {
    pub fn new(store: Arc<PriceStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PriceSource for StaleSource {
    fn name(&self) -> &'static str {
        "stale-cache"
    }

    fn cacheable(&self) -> bool {
        false
    }

    async fn fetch(&self, key: &PriceKey) -> Result<f64, PriceError> {
        match self.store.get(key) {
            Some(entry) => {
                logger::warning(
                    LogTag::Cache,
                    &format!(
                        "serving stale price for {}: {} ({}s old)",
                        key,
                        entry.price,
                        entry.age().as_secs()
                    ),
                );
                Ok(entry.price)
            }
            None => Err(PriceError::transient(format!("no prior entry for {}", key))),
        }
    }
}
