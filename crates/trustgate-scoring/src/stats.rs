//! Aggregation of raw claims into per-identity statistics.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trustgate_core::{Address, Flag, Tier, TierPolicy, Verification, Vouch};

use crate::tier::qualified_vouch_count;

/// Derived statistics for one identity, consumed by the tier classifier.
///
/// All counts and rates are derived solely from non-revoked claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStats {
    /// Active verifications + vouches received.
    pub total_attestations: u32,
    /// Vouches qualifying at the highest tier with any qualifying vouches.
    pub qualified_vouches: u32,
    /// Percentage of active claims that are not flags, 0-100.
    pub approval_rate: f64,
    /// Days since the earliest active positive claim. May be negative for
    /// future-dated timestamps; deliberately not clamped.
    pub days_active: i64,
    /// Active flags received.
    pub flag_count: u32,
    /// Earliest active verification/vouch timestamp.
    pub first_activity_at: Option<DateTime<Utc>>,
    /// Latest active verification/vouch timestamp.
    pub last_positive_activity_at: Option<DateTime<Utc>>,
}

impl Default for AgentStats {
    fn default() -> Self {
        Self {
            total_attestations: 0,
            qualified_vouches: 0,
            approval_rate: 0.0,
            days_active: 0,
            flag_count: 0,
            first_activity_at: None,
            last_positive_activity_at: None,
        }
    }
}

/// A vouch paired with its issuer's estimated tier, for qualification checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VouchInfo {
    pub strength: u8,
    pub revoked: bool,
    pub voucher_tier: Tier,
    pub issued_at: DateTime<Utc>,
}

/// Approval rate as a percentage of non-flag activity, 0 when there is no
/// activity at all.
pub fn approval_rate(total_attestations: u32, flag_count: u32) -> f64 {
    if total_attestations == 0 {
        return 0.0;
    }
    let positive = f64::from(total_attestations) - f64::from(flag_count);
    ((positive / f64::from(total_attestations)) * 100.0).max(0.0)
}

/// Whole days elapsed since `first`, floored.
///
/// Future-dated timestamps produce negative values, which callers accept as a
/// data-quality edge case rather than correcting.
pub fn days_active(first: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    match first {
        Some(first) => (now.timestamp() - first.timestamp()).div_euclid(86_400),
        None => 0,
    }
}

/// Reduce raw claims into `AgentStats`.
///
/// `voucher_tiers` maps vouch issuers to their (externally estimated) tiers;
/// missing issuers count as tier 0. Pure given its inputs and `now`.
pub fn aggregate_stats(
    verifications: &[Verification],
    vouches: &[Vouch],
    flags: &[Flag],
    voucher_tiers: &HashMap<Address, Tier>,
    policy: &TierPolicy,
    now: DateTime<Utc>,
) -> AgentStats {
    let active_verifications: Vec<&Verification> =
        verifications.iter().filter(|v| !v.revoked).collect();
    let active_vouches: Vec<&Vouch> = vouches.iter().filter(|v| !v.revoked).collect();
    let flag_count = flags.iter().filter(|f| !f.revoked).count() as u32;

    let total_attestations = (active_verifications.len() + active_vouches.len()) as u32;

    let positive_times: Vec<DateTime<Utc>> = active_verifications
        .iter()
        .map(|v| v.issued_at)
        .chain(active_vouches.iter().map(|v| v.issued_at))
        .collect();

    let first_activity_at = positive_times.iter().min().copied();
    let last_positive_activity_at = positive_times.iter().max().copied();

    let vouch_infos: Vec<VouchInfo> = active_vouches
        .iter()
        .map(|v| VouchInfo {
            strength: v.strength,
            revoked: v.revoked,
            voucher_tier: voucher_tiers.get(&v.issuer).copied().unwrap_or(Tier::New),
            issued_at: v.issued_at,
        })
        .collect();

    // Scan tiers top-down and keep the first nonzero count. This biases
    // toward the highest tier with any qualifying vouches and can under-count
    // at lower tiers; intended semantics, preserved as-is.
    let mut qualified_vouches = 0;
    for tier in Tier::ALL.iter().rev() {
        qualified_vouches = qualified_vouch_count(&vouch_infos, *tier, policy);
        if qualified_vouches > 0 {
            break;
        }
    }

    AgentStats {
        total_attestations,
        qualified_vouches,
        approval_rate: approval_rate(total_attestations, flag_count),
        days_active: days_active(first_activity_at, now),
        flag_count,
        first_activity_at,
        last_positive_activity_at,
    }
}
