//! Trustgate Scoring — pure computation over claim sets.
//!
//! Everything in this crate is a synchronous, side-effect-free function of
//! its inputs plus an explicit `now` instant. Fetching claims and caching
//! results live in `trustgate-client`; this crate only reduces.

pub mod score;
pub mod stats;
pub mod tier;

pub use score::{calculate_trust_score, TrustScore, DEFAULT_ATTESTER_SCORE};
pub use stats::{aggregate_stats, AgentStats, VouchInfo};
pub use tier::{
    apply_decay, classify_tier, meets_tier, progress_toward, qualified_vouch_count, tier_info,
    RequirementProgress, TierInfo, TierProgress,
};
