mod store;

pub use store::{CacheEntryInfo, PriceEntry, PriceKey, PriceStore};
