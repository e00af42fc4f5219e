/// CoinGecko API client
///
/// API Documentation: https://docs.coingecko.com/reference/introduction
///
/// Endpoints implemented:
/// 1. /api/v3/simple/price?ids=<id>&vs_currencies=<fiat> - Quote lookup
/// 2. /api/v3/search?query=<symbol> - Symbol search (first candidate used)
use super::QuoteApi;
use crate::errors::PriceError;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(timeout: Duration) -> Result<Self, PriceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PriceError::transient(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: COINGECKO_BASE_URL.to_string(),
        })
    }

    async fn get_json(&self, url: &str) -> Result<Value, PriceError> {
        logger::debug(LogTag::Sources, &format!("GET {}", url));

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PriceError::transient(format!("request timed out: {}", url))
                } else {
                    PriceError::transient(format!("request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            return Err(PriceError::transient(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| PriceError::transient(format!("invalid JSON body: {}", e)))
    }
}

#[async_trait]
impl QuoteApi for CoinGeckoClient {
    /// Fetch the quote for `(id, fiat)` via /simple/price.
    async fn simple_price(&self, id: &str, fiat: &str) -> Result<f64, PriceError> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies={}",
            self.base_url, id, fiat
        );
        let body = self.get_json(&url).await?;
        parse_simple_price(&body, id, fiat)
    }

    /// Search for a symbol via /search; returns the first candidate's id.
    async fn search(&self, query: &str) -> Result<Option<String>, PriceError> {
        let url = format!("{}/search?query={}", self.base_url, query);
        let body = self.get_json(&url).await?;
        Ok(parse_first_coin_id(&body))
    }
}

/// Extract the quote from a /simple/price body: `{ <id>: { <fiat>: <n> } }`.
///
/// A missing id means the upstream does not recognize the identifier
/// (unresolved, not retryable); a non-positive number is an invalid value.
pub(crate) fn parse_simple_price(body: &Value, id: &str, fiat: &str) -> Result<f64, PriceError> {
    let price = body
        .get(id)
        .and_then(|coin| coin.get(fiat))
        .and_then(Value::as_f64);

    match price {
        Some(value) if value.is_finite() && value > 0.0 => Ok(value),
        Some(value) => Err(PriceError::InvalidValue { value }),
        None => Err(PriceError::UnresolvedSymbol {
            symbol: id.to_string(),
        }),
    }
}

/// Extract the first candidate id from a /search body: `{ "coins": [...] }`.
pub(crate) fn parse_first_coin_id(body: &Value) -> Option<String> {
    body.get("coins")?
        .as_array()?
        .first()?
        .get("id")?
        .as_str()
        .map(String::from)
}
