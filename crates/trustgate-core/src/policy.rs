use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TrustError;

/// Ordinal reputation tier, 0-4.
///
/// Tiers form a strictly ordered chain. Upward transitions come from
/// accumulating attestations, vouches, approval, and tenure; the only
/// downward force is inactivity decay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    New,
    Contributor,
    Trusted,
    Verified,
    Expert,
}

impl Tier {
    pub const MIN: Tier = Tier::New;
    pub const MAX: Tier = Tier::Expert;

    /// All tiers in ascending order.
    pub const ALL: [Tier; 5] = [
        Tier::New,
        Tier::Contributor,
        Tier::Trusted,
        Tier::Verified,
        Tier::Expert,
    ];

    /// Numeric level, 0-4.
    pub fn level(&self) -> u8 {
        match self {
            Tier::New => 0,
            Tier::Contributor => 1,
            Tier::Trusted => 2,
            Tier::Verified => 3,
            Tier::Expert => 4,
        }
    }

    /// Build a tier from a numeric level.
    pub fn from_level(level: u8) -> Result<Self, TrustError> {
        match level {
            0 => Ok(Tier::New),
            1 => Ok(Tier::Contributor),
            2 => Ok(Tier::Trusted),
            3 => Ok(Tier::Verified),
            4 => Ok(Tier::Expert),
            other => Err(TrustError::InvalidTier {
                tier: other,
                max: Tier::MAX.level(),
            }),
        }
    }

    /// Build a tier from a level, saturating below 0 / above 4.
    pub fn from_level_saturating(level: i64) -> Self {
        match level {
            i64::MIN..=0 => Tier::New,
            1 => Tier::Contributor,
            2 => Tier::Trusted,
            3 => Tier::Verified,
            _ => Tier::Expert,
        }
    }

    /// The next tier up, or `None` at Expert.
    pub fn next(&self) -> Option<Tier> {
        Self::from_level(self.level() + 1).ok()
    }

    /// The next tier down, or `None` at New.
    pub fn previous(&self) -> Option<Tier> {
        self.level().checked_sub(1).and_then(|l| Self::from_level(l).ok())
    }

    /// Human-readable tier name.
    pub fn name(&self) -> &'static str {
        match self {
            Tier::New => "New",
            Tier::Contributor => "Contributor",
            Tier::Trusted => "Trusted",
            Tier::Verified => "Verified",
            Tier::Expert => "Expert",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// Tiers serialize as their numeric level so JSON consumers see 0-4.
impl Serialize for Tier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.level())
    }
}

impl<'de> Deserialize<'de> for Tier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let level = u8::deserialize(deserializer)?;
        Tier::from_level(level).map_err(serde::de::Error::custom)
    }
}

/// Thresholds an identity must meet to hold a tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierRequirements {
    /// Minimum active verifications + vouches received.
    pub min_attestations: u32,
    /// Minimum qualified vouches.
    pub min_vouches: u32,
    /// Minimum tier the voucher must hold for their vouch to qualify.
    pub min_voucher_tier: Tier,
    /// Minimum approval rate, 0-100.
    pub min_approval_rate: f64,
    /// Minimum days since first positive activity.
    pub min_days_active: i64,
}

/// Immutable tier configuration: per-tier thresholds plus decay parameters.
///
/// Passed explicitly into the classifier and aggregator so alternate policies
/// can be tested without recompilation. Each requirement field must be
/// monotonically non-decreasing with tier level; `validate` enforces this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierPolicy {
    /// Requirements indexed by tier level.
    pub requirements: [TierRequirements; 5],
    /// Days of inactivity before decay starts.
    pub grace_period_days: i64,
    /// Days per decay level once past the grace period.
    pub decay_period_days: i64,
    /// Minimum vouch strength for a vouch to count toward any tier.
    pub min_vouch_strength: u8,
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self {
            requirements: [
                TierRequirements {
                    min_attestations: 0,
                    min_vouches: 0,
                    min_voucher_tier: Tier::New,
                    min_approval_rate: 0.0,
                    min_days_active: 0,
                },
                TierRequirements {
                    min_attestations: 3,
                    min_vouches: 0,
                    min_voucher_tier: Tier::New,
                    min_approval_rate: 50.0,
                    min_days_active: 7,
                },
                TierRequirements {
                    min_attestations: 10,
                    min_vouches: 2,
                    min_voucher_tier: Tier::Trusted,
                    min_approval_rate: 70.0,
                    min_days_active: 30,
                },
                TierRequirements {
                    min_attestations: 25,
                    min_vouches: 5,
                    min_voucher_tier: Tier::Trusted,
                    min_approval_rate: 85.0,
                    min_days_active: 90,
                },
                TierRequirements {
                    min_attestations: 50,
                    min_vouches: 10,
                    min_voucher_tier: Tier::Verified,
                    min_approval_rate: 95.0,
                    min_days_active: 180,
                },
            ],
            grace_period_days: 90,
            decay_period_days: 90,
            min_vouch_strength: 3,
        }
    }
}

impl TierPolicy {
    /// Requirements for a given tier.
    pub fn requirements_for(&self, tier: Tier) -> &TierRequirements {
        &self.requirements[tier.level() as usize]
    }

    /// Check the monotonicity invariant across tier levels.
    pub fn validate(&self) -> Result<(), TrustError> {
        if self.grace_period_days < 0 || self.decay_period_days <= 0 {
            return Err(TrustError::InvalidPolicy(
                "decay periods must be positive".into(),
            ));
        }

        for (level, pair) in self.requirements.windows(2).enumerate() {
            let (lo, hi) = (&pair[0], &pair[1]);
            let monotone = hi.min_attestations >= lo.min_attestations
                && hi.min_vouches >= lo.min_vouches
                && hi.min_voucher_tier >= lo.min_voucher_tier
                && hi.min_approval_rate >= lo.min_approval_rate
                && hi.min_days_active >= lo.min_days_active;
            if !monotone {
                return Err(TrustError::InvalidPolicy(format!(
                    "requirements must be non-decreasing, violated between levels {} and {}",
                    level,
                    level + 1
                )));
            }
        }

        Ok(())
    }
}
