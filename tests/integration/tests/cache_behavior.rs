//! Cache behavior and degradation when the attestation source misbehaves.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use trustgate_client::{AttestationSource, ClaimBundle, ClientError, InMemorySource, TrustClient};
use trustgate_core::{Address, ManualClock, Tier, TierPolicy, Verification};

fn addr(n: u8) -> Address {
    Address::from_bytes([n; 20])
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
}

/// Wraps another source and counts how often it is actually hit.
struct CountingSource {
    inner: InMemorySource,
    fetches: AtomicUsize,
}

impl CountingSource {
    fn new(inner: InMemorySource) -> Self {
        Self {
            inner,
            fetches: AtomicUsize::new(0),
        }
    }

    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AttestationSource for CountingSource {
    async fn fetch_claims(
        &self,
        subject: &Address,
        network: &str,
    ) -> Result<ClaimBundle, ClientError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_claims(subject, network).await
    }
}

/// Always fails, as if the attestation index is offline.
struct OfflineSource;

#[async_trait]
impl AttestationSource for OfflineSource {
    async fn fetch_claims(
        &self,
        _subject: &Address,
        _network: &str,
    ) -> Result<ClaimBundle, ClientError> {
        Err(ClientError::Upstream("connection refused".into()))
    }
}

#[tokio::test]
async fn test_tier_lookups_hit_source_once_per_ttl() {
    let inner = InMemorySource::new();
    inner.add_verification(
        "base",
        Verification::new(addr(10), addr(1), t0() - Duration::days(10), "github", "a"),
    );
    let source = Arc::new(CountingSource::new(inner));
    let clock = Arc::new(ManualClock::new(t0()));
    let client = TrustClient::with_options(
        source.clone(),
        TierPolicy::default(),
        clock.clone(),
        Duration::minutes(5),
    )
    .unwrap();

    client.tier_info(&addr(1), "base").await;
    let after_first = source.fetch_count();
    assert!(after_first >= 1);

    // Second and third lookups inside the TTL are served from cache.
    client.tier_info(&addr(1), "base").await;
    client.tier(&addr(1), "base").await;
    assert_eq!(source.fetch_count(), after_first);

    // Past the TTL the source is consulted again.
    clock.advance(Duration::minutes(6));
    client.tier_info(&addr(1), "base").await;
    assert!(source.fetch_count() > after_first);
}

#[tokio::test]
async fn test_clear_caches_refetches_immediately() {
    let source = Arc::new(CountingSource::new(InMemorySource::new()));
    let clock = Arc::new(ManualClock::new(t0()));
    let client = TrustClient::with_options(
        source.clone(),
        TierPolicy::default(),
        clock,
        Duration::minutes(5),
    )
    .unwrap();

    client.tier_info(&addr(1), "base").await;
    client.tier_info(&addr(1), "base").await;
    assert_eq!(source.fetch_count(), 1);
    assert_eq!(client.tier_cache_stats().size, 1);

    client.clear_caches();
    assert_eq!(client.tier_cache_stats().size, 0);

    client.tier_info(&addr(1), "base").await;
    assert_eq!(source.fetch_count(), 2);
}

#[tokio::test]
async fn test_cache_stats_track_entries() {
    let source = Arc::new(CountingSource::new(InMemorySource::new()));
    let clock = Arc::new(ManualClock::new(t0()));
    let client = TrustClient::with_options(
        source,
        TierPolicy::default(),
        clock.clone(),
        Duration::minutes(5),
    )
    .unwrap();

    client.tier_info(&addr(1), "base").await;
    client.tier_info(&addr(2), "base").await;
    clock.advance(Duration::seconds(30));

    let stats = client.tier_cache_stats();
    assert_eq!(stats.size, 2);
    assert!(stats.entries.iter().all(|e| e.age_secs == 30));
    assert!(stats.entries.iter().all(|e| e.tier == Tier::New));
}

#[tokio::test]
async fn test_offline_source_fails_closed_everywhere() {
    let clock = Arc::new(ManualClock::new(t0()));
    let client = TrustClient::with_options(
        Arc::new(OfflineSource),
        TierPolicy::default(),
        clock,
        Duration::minutes(5),
    )
    .unwrap();

    let score = client.trust_score(&addr(1), "base").await;
    assert_eq!(score.score, 0.0);
    assert_eq!(score.confidence, 0.0);

    assert_eq!(client.tier(&addr(1), "base").await, Tier::New);
    assert!(!client.meets_tier(&addr(1), "base", Tier::Contributor).await);

    // Argument validation still errors; only upstream failures degrade.
    assert!(client.meets_tier_level(&addr(1), "base", 7).await.is_err());
}
