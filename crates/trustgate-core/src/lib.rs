//! Trustgate Core — fundamental types for attestation-based trust scoring.
//!
//! This is the leaf crate the rest of the workspace depends on. It defines:
//! - `Address`: checksummed 20-byte agent identities
//! - Claim records: `Verification`, `Vouch`, `Flag`
//! - `Tier` and `TierPolicy`: ordinal reputation levels and their thresholds
//! - `Clock`: injectable time source for deterministic tests
//! - `TrustError`: validation errors for the core types

pub mod address;
pub mod claim;
pub mod clock;
pub mod error;
pub mod policy;

pub use address::Address;
pub use claim::{ClaimId, ClaimRecord, Flag, Verification, Vouch};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::TrustError;
pub use policy::{Tier, TierPolicy, TierRequirements};
