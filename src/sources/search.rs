/// Search-assisted quote lookup
///
/// Second-stage strategy for symbols the quote endpoint does not
/// recognize directly: query the search endpoint, take the first
/// candidate, and fetch its quote. No retries at this stage.
use super::{symbols, PriceSource, QuoteApi};
use crate::cache::PriceKey;
use crate::errors::PriceError;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use std::sync::Arc;

pub struct SearchSource {
    client: Arc<dyn QuoteApi>,
}

impl SearchSource {
    pub fn new(client: Arc<dyn QuoteApi>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PriceSource for SearchSource {
    fn name(&self) -> &'static str {
        "coingecko-search"
    }

    async fn fetch(&self, key: &PriceKey) -> Result<f64, PriceError> {
        let query = symbols::canonical_id(&key.asset);

        let found_id = self
            .client
            .search(&query)
            .await?
            .ok_or_else(|| PriceError::UnresolvedSymbol {
                symbol: key.asset.clone(),
            })?;

        logger::debug(
            LogTag::Sources,
            &format!("search resolved {} -> {}", key.asset, found_id),
        );

        self.client.simple_price(&found_id, &key.fiat).await
    }
}
