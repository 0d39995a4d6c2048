//! End-to-end scoring: an identity accumulates claims and its trust score
//! moves the way the weighting rules say it should.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use trustgate_client::{InMemorySource, TrustClient};
use trustgate_core::{Address, Flag, ManualClock, TierPolicy, Verification, Vouch};

fn addr(n: u8) -> Address {
    Address::from_bytes([n; 20])
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
}

fn client_over(source: Arc<InMemorySource>) -> TrustClient {
    TrustClient::with_options(
        source,
        TierPolicy::default(),
        Arc::new(ManualClock::new(t0())),
        Duration::minutes(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_score_lifecycle() {
    let source = Arc::new(InMemorySource::new());
    let client = client_over(source.clone());
    let subject = addr(1);
    let issued = t0() - Duration::days(1);

    // Unknown identity: nothing to go on.
    let score = client.trust_score(&subject, "base").await;
    assert_eq!(score.score, 0.0);
    assert_eq!(score.confidence, 0.0);
    assert_eq!(score.attestation_count, 0);

    // One platform verification: base score, decent confidence.
    source.add_verification(
        "base",
        Verification::new(addr(10), subject, issued, "github", "subject-agent"),
    );
    let verified = client.trust_score(&subject, "base").await;
    assert!(verified.verified);
    assert_eq!(verified.score, 50.0);
    // 0.4 verified + 0.2 all-recent + 0.01 for one issuer.
    assert_eq!(verified.confidence, 0.61);
    assert_eq!(verified.linked_platforms, vec!["github".to_string()]);

    // A maximal vouch from an unknown attester adds its full value of 8.
    source.add_vouch("base", Vouch::new(addr(11), subject, issued, 5));
    let vouched = client.trust_score(&subject, "base").await;
    assert_eq!(vouched.score, 58.0);
    assert!(vouched.confidence > verified.confidence);

    // A maximal flag from an unknown attester subtracts 10.
    source.add_flag("base", Flag::new(addr(12), subject, issued, 5));
    let flagged = client.trust_score(&subject, "base").await;
    assert_eq!(flagged.score, 48.0);
    assert_eq!(flagged.attestation_count, 3);
}

#[tokio::test]
async fn test_revoked_claims_do_not_count() {
    let source = Arc::new(InMemorySource::new());
    let client = client_over(source.clone());
    let subject = addr(1);
    let issued = t0() - Duration::days(1);

    source.add_verification(
        "base",
        Verification::new(addr(10), subject, issued, "github", "subject-agent"),
    );

    let mut withdrawn = Flag::new(addr(12), subject, issued, 5);
    withdrawn.revoked = true;
    source.add_flag("base", withdrawn);

    let score = client.trust_score(&subject, "base").await;
    assert_eq!(score.score, 50.0);
    assert_eq!(score.attestation_count, 1);
}

#[tokio::test]
async fn test_many_vouches_hit_the_bonus_cap() {
    let source = Arc::new(InMemorySource::new());
    let client = client_over(source.clone());
    let subject = addr(1);
    let issued = t0() - Duration::days(1);

    source.add_verification(
        "base",
        Verification::new(addr(10), subject, issued, "github", "subject-agent"),
    );
    for i in 0..60 {
        source.add_vouch("base", Vouch::new(addr(100 + i), subject, issued, 5));
    }

    let score = client.trust_score(&subject, "base").await;
    // Base 50 plus the vouch bonus, which saturates at 40.
    assert_eq!(score.score, 90.0);
}

#[tokio::test]
async fn test_flags_cannot_push_score_below_zero() {
    let source = Arc::new(InMemorySource::new());
    let client = client_over(source.clone());
    let subject = addr(1);
    let issued = t0() - Duration::days(1);

    for i in 0..8 {
        source.add_flag("base", Flag::new(addr(100 + i), subject, issued, 5));
    }

    let score = client.trust_score(&subject, "base").await;
    assert_eq!(score.score, 0.0);
    assert!(!score.verified);
}
