//! Trustgate Client — async entry points over an attestation source.
//!
//! Wires the pure functions from `trustgate-scoring` to an
//! [`AttestationSource`], adding TTL caching, recursive attester weighting,
//! and fail-closed degradation when the source is unavailable.

pub mod cache;
pub mod client;
pub mod error;
pub mod source;

pub use cache::{CacheEntrySummary, CacheStats, TierCache};
pub use client::TrustClient;
pub use error::ClientError;
pub use source::{AttestationSource, ClaimBundle, InMemorySource, SnapshotSource};

// Result types callers of `TrustClient` handle directly.
pub use trustgate_scoring::{AgentStats, TierInfo, TierProgress, TrustScore};
