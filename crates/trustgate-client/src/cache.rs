//! TTL memoization of tier results.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;

use trustgate_core::{Address, Clock, Tier};
use trustgate_scoring::TierInfo;

/// Default time-to-live for cached tier results.
pub const DEFAULT_TIER_CACHE_TTL_SECS: i64 = 5 * 60;

#[derive(Debug, Clone)]
struct CacheEntry {
    info: TierInfo,
    cached_at: DateTime<Utc>,
}

/// Summary of one cache entry, for debugging.
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntrySummary {
    pub key: String,
    pub tier: Tier,
    pub age_secs: i64,
}

/// Cache statistics, for debugging.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub entries: Vec<CacheEntrySummary>,
}

/// Read-through cache for tier results, keyed by `(identity, network)` with
/// a fixed TTL.
///
/// The cache owns its map and clock; there is no ambient state. Reads and
/// writes to a key are individually atomic, but two concurrent misses on the
/// same key may both run the expensive recompute. Callers wanting
/// single-flight must layer it on top.
pub struct TierCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TierCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    fn key(address: &Address, network: &str) -> String {
        format!("{}:{}", address.to_lowercase_hex(), network)
    }

    /// Fetch a cached result if it is still within TTL.
    pub fn get(&self, address: &Address, network: &str) -> Option<TierInfo> {
        let now = self.clock.now();
        self.entries
            .get(&Self::key(address, network))
            .filter(|entry| now - entry.cached_at < self.ttl)
            .map(|entry| entry.info.clone())
    }

    /// Store a freshly computed result, stamped with the current clock.
    pub fn insert(&self, address: &Address, network: &str, info: TierInfo) {
        self.entries.insert(
            Self::key(address, network),
            CacheEntry {
                info,
                cached_at: self.clock.now(),
            },
        );
    }

    /// Drop every entry; the next lookup per key refetches.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Entry count plus per-entry key, tier, and age.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let entries = self
            .entries
            .iter()
            .map(|entry| CacheEntrySummary {
                key: entry.key().clone(),
                tier: entry.value().info.tier,
                age_secs: (now - entry.value().cached_at).num_seconds(),
            })
            .collect::<Vec<_>>();

        CacheStats {
            size: entries.len(),
            entries,
        }
    }
}
