/// In-memory price store with TTL tracking
///
/// Thread-safe map of quote keys to price entries. Entries are replaced
/// whole on every successful fetch and are never removed on failure: an
/// expired entry stays around as the stale fallback of last resort until a
/// newer fetch overwrites it.
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Composite cache key: asset symbol + quote currency, both lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PriceKey {
    pub asset: String,
    pub fiat: String,
}

impl PriceKey {
    pub fn new(asset: &str, fiat: &str) -> Self {
        Self {
            asset: asset.trim().to_lowercase(),
            fiat: fiat.trim().to_lowercase(),
        }
    }

    /// Parse a hot-key spec: either "asset" (quoted in usd) or "asset/fiat".
    pub fn parse(spec: &str) -> Self {
        match spec.split_once('/') {
            Some((asset, fiat)) => Self::new(asset, fiat),
            None => Self::new(spec, "usd"),
        }
    }
}

impl std::fmt::Display for PriceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.asset, self.fiat)
    }
}

/// A cached quote with expiry metadata.
#[derive(Debug, Clone)]
pub struct PriceEntry {
    pub price: f64,
    pub fetched_at: Instant,
    pub expires_at: Instant,
    /// Which strategy produced the value. Observability only.
    pub source: &'static str,
}

impl PriceEntry {
    pub fn is_fresh(&self) -> bool {
        Instant::now() < self.expires_at
    }

    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }
}

/// Diagnostics snapshot of one cache entry.
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntryInfo {
    pub price: f64,
    pub age_secs: u64,
    /// Negative once the entry has expired.
    pub expires_in_secs: i64,
    pub source: &'static str,
}

/// Key -> entry map shared by the coordinator and diagnostics.
///
/// All mutation goes through [`PriceStore::insert`], which replaces the
/// entry atomically; readers never observe a partially updated entry.
pub struct PriceStore {
    entries: RwLock<HashMap<PriceKey, PriceEntry>>,
    ttl: Duration,
}

impl PriceStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Pure lookup. Returns the entry whether fresh or stale; callers
    /// decide with [`PriceEntry::is_fresh`].
    pub fn get(&self, key: &PriceKey) -> Option<PriceEntry> {
        self.entries.read().get(key).cloned()
    }

    /// Create or overwrite the entry for `key` with a freshly computed
    /// expiry. Only successful fetches go through here, so `expires_at`
    /// always reflects TTL from the last success.
    pub fn insert(&self, key: PriceKey, price: f64, source: &'static str) {
        let now = Instant::now();
        let entry = PriceEntry {
            price,
            fetched_at: now,
            expires_at: now + self.ttl,
            source,
        };
        self.entries.write().insert(key, entry);
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every entry for diagnostics.
    pub fn info(&self) -> HashMap<String, CacheEntryInfo> {
        let now = Instant::now();
        self.entries
            .read()
            .iter()
            .map(|(key, entry)| {
                let expires_in_secs = if now < entry.expires_at {
                    (entry.expires_at - now).as_secs() as i64
                } else {
                    -((now - entry.expires_at).as_secs() as i64)
                };
                let info = CacheEntryInfo {
                    price: entry.price,
                    age_secs: (now - entry.fetched_at).as_secs(),
                    expires_in_secs,
                    source: entry.source,
                };
                (key.to_string(), info)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_key_normalization() {
        assert_eq!(PriceKey::new("SOL", "Usd"), PriceKey::new("sol", "usd"));
        assert_eq!(PriceKey::new(" sol ", "usd").asset, "sol");
        assert_eq!(PriceKey::new("sol", "usd").to_string(), "sol_usd");
    }

    #[test]
    fn test_key_parse() {
        assert_eq!(PriceKey::parse("solana"), PriceKey::new("solana", "usd"));
        assert_eq!(PriceKey::parse("SOL/EUR"), PriceKey::new("sol", "eur"));
    }

    #[test]
    fn test_insert_and_get() {
        let store = PriceStore::new(Duration::from_secs(60));
        let key = PriceKey::new("sol", "usd");

        assert!(store.get(&key).is_none());

        store.insert(key.clone(), 142.5, "coingecko-direct");
        let entry = store.get(&key).unwrap();
        assert_eq!(entry.price, 142.5);
        assert_eq!(entry.source, "coingecko-direct");
        assert!(entry.is_fresh());
    }

    #[test]
    fn test_expiry_reflects_ttl() {
        let store = PriceStore::new(Duration::from_millis(50));
        let key = PriceKey::new("sol", "usd");

        store.insert(key.clone(), 142.5, "coingecko-direct");
        let entry = store.get(&key).unwrap();
        assert_eq!(entry.expires_at, entry.fetched_at + store.ttl());

        thread::sleep(Duration::from_millis(70));

        // Expired but still present - stale entries are never deleted
        let entry = store.get(&key).unwrap();
        assert!(!entry.is_fresh());
        assert_eq!(entry.price, 142.5);
    }

    #[test]
    fn test_insert_replaces_whole_entry() {
        let store = PriceStore::new(Duration::from_secs(60));
        let key = PriceKey::new("sol", "usd");

        store.insert(key.clone(), 140.0, "coingecko-direct");
        let first = store.get(&key).unwrap();

        store.insert(key.clone(), 142.5, "coingecko-search");
        let second = store.get(&key).unwrap();

        assert_eq!(second.price, 142.5);
        assert_eq!(second.source, "coingecko-search");
        assert!(second.fetched_at >= first.fetched_at);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_info_snapshot() {
        let store = PriceStore::new(Duration::from_secs(60));
        store.insert(PriceKey::new("sol", "usd"), 142.5, "coingecko-direct");

        let info = store.info();
        let entry = info.get("sol_usd").unwrap();
        assert_eq!(entry.price, 142.5);
        assert!(entry.expires_in_secs > 0 && entry.expires_in_secs <= 60);
        assert_eq!(entry.source, "coingecko-direct");
    }
}
