//! Trust score calculation.
//!
//! `score = base + vouch_bonus - flag_penalty`, where the base is 50 for a
//! verified identity, vouches add up to 40 with diminishing returns, and
//! flags subtract up to 50 linearly. Vouch and flag contributions are
//! weighted by the issuer's own trust score.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use trustgate_core::{Address, ClaimRecord, Flag, Verification, Vouch};

/// Score assumed for an attester whose own score is unknown.
///
/// Also what attester resolution falls back to on cycles, exhausted depth,
/// or fetch failures, so it is part of the public contract.
pub const DEFAULT_ATTESTER_SCORE: f64 = 50.0;

/// Upper bound on the vouch bonus.
const VOUCH_BONUS_CAP: f64 = 40.0;

/// Upper bound on the flag penalty.
const FLAG_PENALTY_CAP: f64 = 50.0;

/// Claims issued within this window count as recent for confidence.
const RECENCY_WINDOW_DAYS: i64 = 30;

/// Computed trust score for an identity.
///
/// Recomputed fresh on every call; never persisted by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustScore {
    /// Overall score, 0-100, one decimal place.
    pub score: f64,
    /// Evidence confidence, 0-1, two decimal places.
    pub confidence: f64,
    /// Active attestations contributing to the score.
    pub attestation_count: usize,
    /// Whether at least one active verification exists.
    pub verified: bool,
    /// Deduplicated platform names from active verifications.
    pub linked_platforms: Vec<String>,
    /// When this score was computed.
    pub computed_at: DateTime<Utc>,
}

impl TrustScore {
    /// The canonical "unknown identity" result: score 0, confidence 0.
    ///
    /// Also the fallback when the attestation source fails, so access gating
    /// fails closed.
    pub fn unknown(now: DateTime<Utc>) -> Self {
        Self {
            score: 0.0,
            confidence: 0.0,
            attestation_count: 0,
            verified: false,
            linked_platforms: Vec::new(),
            computed_at: now,
        }
    }
}

/// Calculate a trust score from an identity's claims.
///
/// `attester_scores` maps claim issuers to their own trust scores for
/// weighting; unknown issuers default to 50. Pure and deterministic given
/// its inputs and `now`.
pub fn calculate_trust_score(
    verifications: &[Verification],
    vouches: &[Vouch],
    flags: &[Flag],
    attester_scores: &HashMap<Address, f64>,
    now: DateTime<Utc>,
) -> TrustScore {
    let active_verifications: Vec<&Verification> =
        verifications.iter().filter(|v| !v.revoked).collect();
    let active_vouches: Vec<&Vouch> = vouches.iter().filter(|v| !v.revoked).collect();
    let active_flags: Vec<&Flag> = flags.iter().filter(|f| !f.revoked).collect();

    let verified = !active_verifications.is_empty();
    let base_score = if verified { 50.0 } else { 0.0 };

    let vouch_bonus = calculate_vouch_bonus(&active_vouches, attester_scores);
    let flag_penalty = calculate_flag_penalty(&active_flags, attester_scores);

    let score = (base_score + vouch_bonus - flag_penalty).clamp(0.0, 100.0);

    let all_active: Vec<&dyn ClaimRecord> = active_verifications
        .iter()
        .map(|v| *v as &dyn ClaimRecord)
        .chain(active_vouches.iter().map(|v| *v as &dyn ClaimRecord))
        .chain(active_flags.iter().map(|f| *f as &dyn ClaimRecord))
        .collect();

    let confidence = calculate_confidence(verified, active_vouches.len(), &all_active, now);

    let mut seen = HashSet::new();
    let linked_platforms: Vec<String> = active_verifications
        .iter()
        .filter(|v| seen.insert(v.platform.clone()))
        .map(|v| v.platform.clone())
        .collect();

    TrustScore {
        score: round_to(score, 1),
        confidence: round_to(confidence, 2),
        attestation_count: all_active.len(),
        verified,
        linked_platforms,
        computed_at: now,
    }
}

/// Bonus from vouches, capped at 40.
///
/// Weighted average of per-vouch values (weight `sqrt(attester_score)/10`,
/// value `strength/5 * 8`), scaled by `log2(n+1)` so additional vouches show
/// diminishing returns.
fn calculate_vouch_bonus(vouches: &[&Vouch], attester_scores: &HashMap<Address, f64>) -> f64 {
    if vouches.is_empty() {
        return 0.0;
    }

    let mut total_weighted = 0.0;
    let mut total_weight = 0.0;

    for vouch in vouches {
        let attester_score = attester_scores
            .get(&vouch.issuer)
            .copied()
            .unwrap_or(DEFAULT_ATTESTER_SCORE);
        // sqrt dampens extreme attester scores.
        let weight = attester_score.sqrt() / 10.0;
        let value = (f64::from(vouch.strength) / 5.0) * 8.0;

        total_weighted += value * weight;
        total_weight += weight;
    }

    let avg = if total_weight > 0.0 {
        total_weighted / total_weight
    } else {
        0.0
    };

    let multiplier = ((vouches.len() + 1) as f64).log2();

    (avg * multiplier).clamp(0.0, VOUCH_BONUS_CAP)
}

/// Penalty from flags, capped at 50.
///
/// Same weighting as the vouch bonus, but the count multiplier is linear
/// (capped at 5): penalties do not get cheaper with volume.
fn calculate_flag_penalty(flags: &[&Flag], attester_scores: &HashMap<Address, f64>) -> f64 {
    if flags.is_empty() {
        return 0.0;
    }

    let mut total_weighted = 0.0;
    let mut total_weight = 0.0;

    for flag in flags {
        let attester_score = attester_scores
            .get(&flag.issuer)
            .copied()
            .unwrap_or(DEFAULT_ATTESTER_SCORE);
        let weight = attester_score.sqrt() / 10.0;
        let value = (f64::from(flag.severity) / 5.0) * 10.0;

        total_weighted += value * weight;
        total_weight += weight;
    }

    let avg = if total_weight > 0.0 {
        total_weighted / total_weight
    } else {
        0.0
    };

    let multiplier = flags.len().min(5) as f64;

    (avg * multiplier).clamp(0.0, FLAG_PENALTY_CAP)
}

/// Confidence in the score, 0-1: verification presence (0.4), vouch volume
/// (up to 0.3, log scale), recency of claims (up to 0.2), and issuer
/// diversity (up to 0.1).
fn calculate_confidence(
    verified: bool,
    vouch_count: usize,
    all_active: &[&dyn ClaimRecord],
    now: DateTime<Utc>,
) -> f64 {
    let verification_factor = if verified { 0.4 } else { 0.0 };

    let vouch_factor = (((vouch_count + 1) as f64).log2() * 0.1).min(0.3);

    let window = Duration::days(RECENCY_WINDOW_DAYS);
    let recent = all_active
        .iter()
        .filter(|c| now - c.issued_at() < window)
        .count();
    let recency_factor =
        ((recent as f64 / all_active.len().max(1) as f64) * 0.2).min(0.2);

    let unique_issuers: HashSet<&Address> = all_active.iter().map(|c| c.issuer()).collect();
    let diversity_factor = ((unique_issuers.len() as f64 / 10.0) * 0.1).min(0.1);

    (verification_factor + vouch_factor + recency_factor + diversity_factor).min(1.0)
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}
