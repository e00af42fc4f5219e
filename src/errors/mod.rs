/// Error taxonomy for the price fetch pipeline.
///
/// Errors are `Clone` because a single fetch outcome is fanned out to every
/// caller that joined the in-flight operation.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PriceError {
    /// Non-2xx response, timeout, or network failure on a single attempt.
    /// Retried within the direct strategy's attempt budget.
    #[error("transient upstream failure: {reason}")]
    TransientUpstream { reason: String },

    /// The symbol could not be mapped to an upstream identifier by either
    /// the direct or the search strategy. Never retried.
    #[error("unresolved symbol: {symbol}")]
    UnresolvedSymbol { symbol: String },

    /// Upstream returned a non-positive or non-finite number. Fails the
    /// current strategy immediately; the chain moves on.
    #[error("invalid upstream value: {value}")]
    InvalidValue { value: f64 },

    /// Every strategy, including the stale fallback, failed to produce a
    /// value. The only error surfaced to callers of `get_price`.
    #[error("no price available for {key} after exhausting all sources")]
    Exhausted { key: String },
}

impl PriceError {
    pub fn transient(reason: impl Into<String>) -> Self {
        PriceError::TransientUpstream {
            reason: reason.into(),
        }
    }

    /// True if a retry within the same strategy could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, PriceError::TransientUpstream { .. })
    }
}
