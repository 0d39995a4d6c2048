//! Tier progression, gating, and inactivity decay against a live client.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use trustgate_client::{ClientError, InMemorySource, SnapshotSource, TrustClient};
use trustgate_core::{
    Address, Clock, ManualClock, Tier, TierPolicy, TrustError, Verification, Vouch,
};

fn addr(n: u8) -> Address {
    Address::from_bytes([n; 20])
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
}

fn client_over(source: Arc<InMemorySource>) -> (Arc<ManualClock>, TrustClient) {
    let clock = Arc::new(ManualClock::new(t0()));
    let client = TrustClient::with_options(
        source,
        TierPolicy::default(),
        clock.clone(),
        Duration::minutes(5),
    )
    .unwrap();
    (clock, client)
}

/// 8 verifications plus 2 strong vouches from well-attested vouchers, all
/// aged past the tier-2 tenure requirement.
fn seed_trusted(source: &InMemorySource, subject: Address, now: DateTime<Utc>) {
    for i in 0..8 {
        source.add_verification(
            "base",
            Verification::new(
                addr(100 + i),
                subject,
                now - Duration::days(40),
                "github",
                "subject-agent",
            ),
        );
    }
    for i in 0..2 {
        let voucher = addr(50 + i);
        for j in 0..12 {
            source.add_verification(
                "base",
                Verification::new(
                    addr(150 + j),
                    voucher,
                    now - Duration::days(60),
                    "github",
                    "voucher-agent",
                ),
            );
        }
        source.add_vouch(
            "base",
            Vouch::new(voucher, subject, now - Duration::days(35), 5),
        );
    }
}

#[tokio::test]
async fn test_fresh_identity_is_tier_zero() {
    let (_, client) = client_over(Arc::new(InMemorySource::new()));

    let info = client.tier_info(&addr(1), "base").await;
    assert_eq!(info.tier, Tier::New);
    assert_eq!(info.next_tier, Some(Tier::Contributor));
    assert!(client.meets_tier(&addr(1), "base", Tier::New).await);
    assert!(!client.meets_tier(&addr(1), "base", Tier::Contributor).await);
}

#[tokio::test]
async fn test_contributor_then_trusted() {
    let source = Arc::new(InMemorySource::new());
    let (clock, client) = client_over(source.clone());
    let subject = addr(1);

    // 3 verifications, 10 days old: contributor.
    for i in 0..3 {
        source.add_verification(
            "base",
            Verification::new(
                addr(100 + i),
                subject,
                t0() - Duration::days(10),
                "github",
                "subject-agent",
            ),
        );
    }
    assert_eq!(client.tier(&subject, "base").await, Tier::Contributor);

    // More history lands; the cached result holds until the TTL lapses.
    seed_trusted(&source, subject, t0());
    assert_eq!(client.tier(&subject, "base").await, Tier::Contributor);

    clock.advance(Duration::minutes(6));
    assert_eq!(client.tier(&subject, "base").await, Tier::Trusted);
    assert!(client.meets_tier(&subject, "base", Tier::Trusted).await);
    assert!(!client.meets_tier(&subject, "base", Tier::Verified).await);
}

#[tokio::test]
async fn test_tier_decays_after_inactivity() {
    let source = Arc::new(InMemorySource::new());
    let (clock, client) = client_over(source.clone());
    let subject = addr(1);

    seed_trusted(&source, subject, t0());
    assert_eq!(client.tier(&subject, "base").await, Tier::Trusted);

    // 200 days of silence: past the 90 day grace plus one 90 day decay
    // period, so one level is lost.
    clock.advance(Duration::days(200));
    client.clear_caches();
    assert_eq!(client.tier(&subject, "base").await, Tier::Contributor);
    assert!(!client.meets_tier(&subject, "base", Tier::Trusted).await);

    // Fresh positive activity restores the full classification.
    source.add_vouch(
        "base",
        Vouch::new(addr(50), subject, clock.now() - Duration::days(1), 5),
    );
    client.clear_caches();
    assert_eq!(client.tier(&subject, "base").await, Tier::Trusted);
}

#[tokio::test]
async fn test_gate_by_numeric_level() {
    let source = Arc::new(InMemorySource::new());
    let (_, client) = client_over(source.clone());
    seed_trusted(&source, addr(1), t0());

    assert!(client.meets_tier_level(&addr(1), "base", 2).await.unwrap());
    assert!(!client.meets_tier_level(&addr(1), "base", 3).await.unwrap());
    assert!(matches!(
        client.meets_tier_level(&addr(1), "base", 9).await,
        Err(ClientError::Core(TrustError::InvalidTier { tier: 9, .. }))
    ));
}

#[tokio::test]
async fn test_snapshot_backed_gating() {
    let subject = addr(1);
    let issued = t0() - Duration::days(10);
    let verifications: Vec<_> = (0..3)
        .map(|i| Verification::new(addr(100 + i), subject, issued, "github", "subject-agent"))
        .collect();

    let snapshot = serde_json::json!({
        "network": "base",
        "agents": {
            subject.to_checksum(): { "verifications": verifications }
        }
    });

    let source = SnapshotSource::from_json(&snapshot.to_string()).unwrap();
    assert_eq!(source.network(), "base");

    let client = TrustClient::with_options(
        Arc::new(source),
        TierPolicy::default(),
        Arc::new(ManualClock::new(t0())),
        Duration::minutes(5),
    )
    .unwrap();

    assert_eq!(client.tier(&subject, "base").await, Tier::Contributor);
    let score = client.trust_score(&subject, "base").await;
    assert!(score.verified);
    assert_eq!(score.score, 50.0);
}
