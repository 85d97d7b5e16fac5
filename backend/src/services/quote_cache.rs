use std::sync::Arc;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc, Duration};
use dashmap::DashMap;

/// Outcome of the last provider lookup for a symbol.
#[derive(Debug, Clone)]
pub struct CachedQuote {
    pub fetched_at: DateTime<Utc>,
    /// `None` records a failed lookup.
    pub price: Option<BigDecimal>,
}

/// Short-lived, thread-safe cache of latest prices keyed by provider symbol.
///
/// Misses are kept for a shorter time than hits so a flaky symbol is retried soon.
/// A TTL of zero disables caching entirely.
#[derive(Clone)]
pub struct QuoteCache {
    cache: Arc<DashMap<String, CachedQuote>>,
    enabled: bool,
    hit_ttl: Duration,
    miss_ttl: Duration,
}

impl QuoteCache {
    pub fn new(ttl_secs: u64) -> Self {
        let hit_ttl = Duration::seconds(ttl_secs as i64);
        Self {
            cache: Arc::new(DashMap::new()),
            enabled: ttl_secs > 0,
            hit_ttl,
            miss_ttl: hit_ttl / 2,
        }
    }

    pub fn disabled() -> Self {
        Self::new(0)
    }

    fn ttl_for(&self, quote: &CachedQuote) -> Duration {
        if quote.price.is_some() { self.hit_ttl } else { self.miss_ttl }
    }

    /// `Some(outcome)` while a previous lookup is still fresh.
    pub fn get(&self, symbol: &str) -> Option<Option<BigDecimal>> {
        if !self.enabled {
            return None;
        }
        if let Some(entry) = self.cache.get(symbol) {
            let quote = entry.value().clone();
            drop(entry); // Release the read lock before a possible remove

            if Utc::now() < quote.fetched_at + self.ttl_for(&quote) {
                return Some(quote.price);
            }
            self.cache.remove(symbol);
        }
        None
    }

    pub fn record(&self, symbol: &str, price: Option<BigDecimal>) {
        if !self.enabled {
            return;
        }
        self.cache.insert(symbol.to_string(), CachedQuote {
            fetched_at: Utc::now(),
            price,
        });
    }

    pub fn cleanup_expired(&self) {
        let now = Utc::now();
        let (hit_ttl, miss_ttl) = (self.hit_ttl, self.miss_ttl);
        self.cache.retain(|_, quote| {
            let ttl = if quote.price.is_some() { hit_ttl } else { miss_ttl };
            now < quote.fetched_at + ttl
        });
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
