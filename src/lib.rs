//! quotecache - single-flight, TTL-based, multi-source-fallback price cache
//!
//! Serves frequently requested external quotes while respecting upstream
//! rate limits: concurrent requests for the same key coalesce into one
//! upstream call, entries live for a fixed TTL, and a chain of fallback
//! strategies (direct lookup, search-assisted lookup, stale cache) keeps
//! degraded answers flowing when the upstream flakes.

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod errors;
pub mod logger;
pub mod refresher;
pub mod sources;

pub use cache::{CacheEntryInfo, PriceEntry, PriceKey, PriceStore};
pub use config::QuoteCacheConfig;
pub use coordinator::PriceCoordinator;
pub use errors::PriceError;
pub use refresher::PriceRefresher;
