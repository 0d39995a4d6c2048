//! High-level trust client: fetch, score, classify, gate.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use futures::future::{join_all, BoxFuture, FutureExt};
use tracing::warn;

use trustgate_core::{Address, Clock, SystemClock, Tier, TierPolicy, TrustError};
use trustgate_scoring::{
    aggregate_stats, calculate_trust_score, progress_toward, tier_info, AgentStats, TierInfo,
    TierProgress, TrustScore, DEFAULT_ATTESTER_SCORE,
};

use crate::cache::{CacheStats, TierCache, DEFAULT_TIER_CACHE_TTL_SECS};
use crate::error::ClientError;
use crate::source::{AttestationSource, ClaimBundle};

/// How deep to follow vouch issuers when weighting their vouches.
const MAX_ATTESTER_DEPTH: u8 = 2;

/// Client over an [`AttestationSource`], combining the pure scoring and tier
/// functions with caching and attester resolution.
///
/// Read paths fail closed: if the source errors, the identity scores 0 and
/// classifies as tier 0 rather than surfacing the error to gating callers.
/// Methods that exist to validate input (like [`TrustClient::meets_tier_level`])
/// still return `Err` for bad arguments.
pub struct TrustClient {
    source: Arc<dyn AttestationSource>,
    policy: TierPolicy,
    clock: Arc<dyn Clock>,
    tier_cache: TierCache,
    attester_scores: DashMap<String, (f64, DateTime<Utc>)>,
    cache_ttl: Duration,
}

impl TrustClient {
    /// Client with the default policy, system clock, and 5 minute cache TTL.
    pub fn new(source: Arc<dyn AttestationSource>) -> Self {
        // The default policy is known-valid.
        Self::build(
            source,
            TierPolicy::default(),
            Arc::new(SystemClock),
            Duration::seconds(DEFAULT_TIER_CACHE_TTL_SECS),
        )
    }

    /// Client with a custom policy, clock, and cache TTL. Rejects policies
    /// whose requirements are not monotone across tiers.
    pub fn with_options(
        source: Arc<dyn AttestationSource>,
        policy: TierPolicy,
        clock: Arc<dyn Clock>,
        cache_ttl: Duration,
    ) -> Result<Self, ClientError> {
        policy.validate()?;
        Ok(Self::build(source, policy, clock, cache_ttl))
    }

    fn build(
        source: Arc<dyn AttestationSource>,
        policy: TierPolicy,
        clock: Arc<dyn Clock>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            source,
            policy,
            tier_cache: TierCache::new(cache_ttl, clock.clone()),
            attester_scores: DashMap::new(),
            cache_ttl,
            clock,
        }
    }

    pub fn policy(&self) -> &TierPolicy {
        &self.policy
    }

    /// Trust score for an identity.
    ///
    /// Vouch and flag issuers are scored recursively up to two hops so a
    /// vouch from a well-attested identity carries more weight; unresolvable
    /// issuers weigh in at the neutral 50.
    pub async fn trust_score(&self, subject: &Address, network: &str) -> TrustScore {
        let now = self.clock.now();
        let bundle = match self.source.fetch_claims(subject, network).await {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!(subject = %subject, network, error = %e, "claim fetch failed, scoring as unknown");
                return TrustScore::unknown(now);
            }
        };

        let attester_scores = self.resolve_attester_scores(subject, network, &bundle).await;
        calculate_trust_score(
            &bundle.verifications,
            &bundle.vouches,
            &bundle.flags,
            &attester_scores,
            now,
        )
    }

    /// Aggregated statistics for an identity. Fails closed to empty stats.
    pub async fn agent_stats(&self, subject: &Address, network: &str) -> AgentStats {
        let now = self.clock.now();
        let bundle = match self.source.fetch_claims(subject, network).await {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!(subject = %subject, network, error = %e, "claim fetch failed, using empty stats");
                return AgentStats::default();
            }
        };

        let voucher_tiers = self.estimate_voucher_tiers(&bundle, network).await;
        aggregate_stats(
            &bundle.verifications,
            &bundle.vouches,
            &bundle.flags,
            &voucher_tiers,
            &self.policy,
            now,
        )
    }

    /// Current tier with requirements and next-tier progress, cached per
    /// `(identity, network)` for the configured TTL.
    pub async fn tier_info(&self, subject: &Address, network: &str) -> TierInfo {
        if let Some(cached) = self.tier_cache.get(subject, network) {
            return cached;
        }

        let stats = self.agent_stats(subject, network).await;
        let info = tier_info(&stats, &self.policy, self.clock.now());
        self.tier_cache.insert(subject, network, info.clone());
        info
    }

    /// Current tier only.
    pub async fn tier(&self, subject: &Address, network: &str) -> Tier {
        self.tier_info(subject, network).await.tier
    }

    /// Whether the identity's tier meets `min_tier`. The gating primitive.
    pub async fn meets_tier(&self, subject: &Address, network: &str, min_tier: Tier) -> bool {
        self.tier(subject, network).await >= min_tier
    }

    /// [`TrustClient::meets_tier`] with an untrusted numeric level; rejects
    /// levels outside 0-4 instead of gating on them.
    pub async fn meets_tier_level(
        &self,
        subject: &Address,
        network: &str,
        min_level: u8,
    ) -> Result<bool, ClientError> {
        let min_tier = Tier::from_level(min_level)?;
        Ok(self.meets_tier(subject, network, min_tier).await)
    }

    /// Progress toward the tier above the current one; `None` at the
    /// maximum tier.
    pub async fn progress_to_next(
        &self,
        subject: &Address,
        network: &str,
    ) -> Option<TierProgress> {
        self.tier_info(subject, network).await.progress
    }

    /// Per-requirement progress toward `target_tier`, bypassing the tier
    /// cache so the numbers are current.
    pub async fn tier_progress(
        &self,
        subject: &Address,
        network: &str,
        target_tier: Tier,
    ) -> TierProgress {
        let stats = self.agent_stats(subject, network).await;
        progress_toward(&stats, target_tier, &self.policy)
    }

    /// Drop all cached tier results and attester scores.
    pub fn clear_caches(&self) {
        self.tier_cache.clear();
        self.attester_scores.clear();
    }

    pub fn tier_cache_stats(&self) -> CacheStats {
        self.tier_cache.stats()
    }

    /// Resolve the own-score of every distinct vouch and flag issuer in
    /// `bundle`, for weighting.
    async fn resolve_attester_scores(
        &self,
        subject: &Address,
        network: &str,
        bundle: &ClaimBundle,
    ) -> HashMap<Address, f64> {
        let issuers: HashSet<Address> = bundle
            .vouches
            .iter()
            .map(|v| v.issuer)
            .chain(bundle.flags.iter().map(|f| f.issuer))
            .collect();

        let mut visited = HashSet::new();
        visited.insert(*subject);

        let futures = issuers.iter().map(|issuer| {
            let visited = visited.clone();
            async move {
                (
                    *issuer,
                    self.attester_score(*issuer, network, MAX_ATTESTER_DEPTH, visited)
                        .await,
                )
            }
        });

        join_all(futures).await.into_iter().collect()
    }

    /// Depth-limited recursive attester score.
    ///
    /// Cycles, exhausted depth, fetch failures, and identities with no claims
    /// all resolve to the neutral default so one bad branch never poisons the
    /// weighting. Results are memoized for the cache TTL.
    fn attester_score<'a>(
        &'a self,
        attester: Address,
        network: &'a str,
        depth: u8,
        mut visited: HashSet<Address>,
    ) -> BoxFuture<'a, f64> {
        async move {
            if depth == 0 || !visited.insert(attester) {
                return DEFAULT_ATTESTER_SCORE;
            }

            let now = self.clock.now();
            let key = format!("{}:{}", attester.to_lowercase_hex(), network);
            if let Some(entry) = self.attester_scores.get(&key) {
                let (score, cached_at) = *entry;
                if now - cached_at < self.cache_ttl {
                    return score;
                }
            }

            let bundle = match self.source.fetch_claims(&attester, network).await {
                Ok(bundle) => bundle,
                Err(e) => {
                    warn!(attester = %attester, network, error = %e, "attester fetch failed, using default score");
                    return DEFAULT_ATTESTER_SCORE;
                }
            };
            if bundle.is_empty() {
                return DEFAULT_ATTESTER_SCORE;
            }

            let issuers: HashSet<Address> = bundle
                .vouches
                .iter()
                .map(|v| v.issuer)
                .chain(bundle.flags.iter().map(|f| f.issuer))
                .collect();

            let futures = issuers.iter().map(|issuer| {
                let visited = visited.clone();
                async move {
                    (
                        *issuer,
                        self.attester_score(*issuer, network, depth - 1, visited).await,
                    )
                }
            });
            let nested: HashMap<Address, f64> = join_all(futures).await.into_iter().collect();

            let score = calculate_trust_score(
                &bundle.verifications,
                &bundle.vouches,
                &bundle.flags,
                &nested,
                now,
            )
            .score;

            self.attester_scores.insert(key, (score, now));
            score
        }
        .boxed()
    }

    /// Estimate the tier of every distinct vouch issuer in `bundle`.
    async fn estimate_voucher_tiers(
        &self,
        bundle: &ClaimBundle,
        network: &str,
    ) -> HashMap<Address, Tier> {
        let issuers: HashSet<Address> = bundle.vouches.iter().map(|v| v.issuer).collect();

        let futures = issuers.iter().map(|issuer| async move {
            (*issuer, self.estimate_voucher_tier(issuer, network).await)
        });

        join_all(futures).await.into_iter().collect()
    }

    /// Cheap, non-recursive tier estimate for a voucher.
    ///
    /// Checks only the attestation-count and approval-rate rows of the
    /// policy, skipping vouch and tenure requirements, so estimating a
    /// voucher never triggers another round of voucher estimation. Biased
    /// high for vouch qualification purposes; fetch failures estimate low,
    /// at tier 0.
    pub async fn estimate_voucher_tier(&self, voucher: &Address, network: &str) -> Tier {
        let bundle = match self.source.fetch_claims(voucher, network).await {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!(voucher = %voucher, network, error = %e, "voucher fetch failed, estimating tier 0");
                return Tier::New;
            }
        };

        let total_attestations = (bundle.verifications.iter().filter(|v| !v.revoked).count()
            + bundle.vouches.iter().filter(|v| !v.revoked).count())
            as u32;
        let flag_count = bundle.flags.iter().filter(|f| !f.revoked).count() as u32;
        let approval = trustgate_scoring::stats::approval_rate(total_attestations, flag_count);

        for tier in Tier::ALL.iter().rev() {
            let req = self.policy.requirements_for(*tier);
            if total_attestations >= req.min_attestations && approval >= req.min_approval_rate {
                return *tier;
            }
        }

        Tier::New
    }
}
