/// Static symbol synonym table
///
/// Maps common ticker symbols to canonical upstream identifiers. Unknown
/// symbols pass through lowercased, the search strategy picks them up if
/// the quote endpoint does not recognize them.
use once_cell::sync::Lazy;
use std::collections::HashMap;

static COIN_ID_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("sol", "solana"),
        ("solana", "solana"),
        ("usdc", "usd-coin"),
        ("usdt", "tether"),
        ("eurc", "euro-coin"),
        ("btc", "bitcoin"),
        ("bitcoin", "bitcoin"),
        ("eth", "ethereum"),
        ("ethereum", "ethereum"),
    ])
});

/// Resolve a user-facing symbol to the canonical upstream identifier.
pub fn canonical_id(symbol: &str) -> String {
    let normalized = symbol.trim().to_lowercase();
    match COIN_ID_MAP.get(normalized.as_str()) {
        Some(id) => (*id).to_string(),
        None => normalized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_synonyms() {
        assert_eq!(canonical_id("sol"), "solana");
        assert_eq!(canonical_id("SOL"), "solana");
        assert_eq!(canonical_id("usdc"), "usd-coin");
        assert_eq!(canonical_id("eth"), "ethereum");
    }

    #[test]
    fn test_unknown_symbols_pass_through_lowercased() {
        assert_eq!(canonical_id("DogWifHat"), "dogwifhat");
        assert_eq!(canonical_id(" pepe "), "pepe");
    }
}
