//! Tier classification, inactivity decay, and progress reporting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trustgate_core::{Tier, TierPolicy, TierRequirements};

use crate::stats::{AgentStats, VouchInfo};

/// Progress toward a single requirement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RequirementProgress {
    pub current: f64,
    pub required: f64,
    pub met: bool,
}

impl RequirementProgress {
    fn new(current: f64, required: f64) -> Self {
        Self {
            current,
            required,
            met: current >= required,
        }
    }
}

/// Per-requirement progress toward a target tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierProgress {
    pub attestations: RequirementProgress,
    pub vouches: RequirementProgress,
    pub approval_rate: RequirementProgress,
    pub days_active: RequirementProgress,
}

/// Complete tier information for an identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierInfo {
    pub tier: Tier,
    pub name: String,
    /// Requirements for the currently held tier.
    pub requirements: TierRequirements,
    /// Progress toward the next tier; `None` at the maximum tier.
    pub progress: Option<TierProgress>,
    pub next_tier: Option<Tier>,
}

/// Classify an identity's tier from its stats, with decay applied.
///
/// Scans tiers from the top down and returns the first whose requirements
/// are all met; tier 0 has all-zero requirements and always matches.
pub fn classify_tier(stats: &AgentStats, policy: &TierPolicy, now: DateTime<Utc>) -> Tier {
    let mut base = Tier::MIN;
    for tier in Tier::ALL.iter().rev() {
        if meets_requirements(stats, policy.requirements_for(*tier)) {
            base = *tier;
            break;
        }
    }

    apply_decay(base, stats.last_positive_activity_at, policy, now)
}

/// Whether stats satisfy every threshold in `req`.
pub fn meets_requirements(stats: &AgentStats, req: &TierRequirements) -> bool {
    stats.total_attestations >= req.min_attestations
        && stats.qualified_vouches >= req.min_vouches
        && stats.approval_rate >= req.min_approval_rate
        && stats.days_active >= req.min_days_active
}

/// Apply inactivity decay to a base tier.
///
/// Unchanged for tier 0 or when there is no activity timestamp; unchanged
/// within the grace period; otherwise drops one level per elapsed decay
/// period, floored at tier 0. Decay is recomputed from the stored timestamp
/// on every call and never persisted, so new positive activity reverses it
/// without a recovery path.
pub fn apply_decay(
    base: Tier,
    last_positive_at: Option<DateTime<Utc>>,
    policy: &TierPolicy,
    now: DateTime<Utc>,
) -> Tier {
    let last = match (base, last_positive_at) {
        (Tier::New, _) | (_, None) => return base,
        (_, Some(last)) => last,
    };

    let days_since = (now.timestamp() - last.timestamp()).div_euclid(86_400);
    if days_since < policy.grace_period_days {
        return base;
    }

    let decay_levels = (days_since - policy.grace_period_days).div_euclid(policy.decay_period_days);

    Tier::from_level_saturating(i64::from(base.level()) - decay_levels)
}

/// Count vouches qualifying toward `target_tier`: active, strong enough, and
/// issued by a voucher whose own tier meets the target's voucher-tier floor.
///
/// This is what keeps Sybil rings of tier-0 accounts from vouching each
/// other upward.
pub fn qualified_vouch_count(vouches: &[VouchInfo], target_tier: Tier, policy: &TierPolicy) -> u32 {
    let min_voucher_tier = policy.requirements_for(target_tier).min_voucher_tier;

    vouches
        .iter()
        .filter(|v| {
            !v.revoked
                && v.strength >= policy.min_vouch_strength
                && v.voucher_tier >= min_voucher_tier
        })
        .count() as u32
}

/// Per-requirement progress toward `target_tier`.
pub fn progress_toward(stats: &AgentStats, target_tier: Tier, policy: &TierPolicy) -> TierProgress {
    let req = policy.requirements_for(target_tier);

    TierProgress {
        attestations: RequirementProgress::new(
            f64::from(stats.total_attestations),
            f64::from(req.min_attestations),
        ),
        vouches: RequirementProgress::new(
            f64::from(stats.qualified_vouches),
            f64::from(req.min_vouches),
        ),
        approval_rate: RequirementProgress::new(stats.approval_rate, req.min_approval_rate),
        days_active: RequirementProgress::new(
            stats.days_active as f64,
            req.min_days_active as f64,
        ),
    }
}

/// Classify and report the full tier picture for an identity.
pub fn tier_info(stats: &AgentStats, policy: &TierPolicy, now: DateTime<Utc>) -> TierInfo {
    let tier = classify_tier(stats, policy, now);
    let next_tier = tier.next();

    TierInfo {
        tier,
        name: tier.name().to_string(),
        requirements: *policy.requirements_for(tier),
        progress: next_tier.map(|next| progress_toward(stats, next, policy)),
        next_tier,
    }
}

/// Whether the identity's classified tier meets `min_tier`.
pub fn meets_tier(
    stats: &AgentStats,
    min_tier: Tier,
    policy: &TierPolicy,
    now: DateTime<Utc>,
) -> bool {
    classify_tier(stats, policy, now) >= min_tier
}
