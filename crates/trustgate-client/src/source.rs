//! Attestation sources: where raw claims come from.
//!
//! The remote attestation index itself is out of scope; this module defines
//! the seam (`AttestationSource`) plus two local implementations: an
//! in-memory store for tests, and a JSON snapshot file for the CLI.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use trustgate_core::{Address, Flag, Verification, Vouch};

use crate::error::ClientError;

/// All claims about one identity, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimBundle {
    #[serde(default)]
    pub verifications: Vec<Verification>,
    #[serde(default)]
    pub vouches: Vec<Vouch>,
    #[serde(default)]
    pub flags: Vec<Flag>,
}

impl ClaimBundle {
    pub fn is_empty(&self) -> bool {
        self.verifications.is_empty() && self.vouches.is_empty() && self.flags.is_empty()
    }
}

/// Supplies raw claims for an identity on a given network.
///
/// An identity with no recorded claims yields an empty bundle, not an error;
/// errors are reserved for the source itself being unavailable or returning
/// garbage.
#[async_trait]
pub trait AttestationSource: Send + Sync {
    async fn fetch_claims(
        &self,
        subject: &Address,
        network: &str,
    ) -> Result<ClaimBundle, ClientError>;
}

fn bundle_key(subject: &Address, network: &str) -> String {
    format!("{}:{}", subject.to_lowercase_hex(), network)
}

/// In-memory attestation source backed by a concurrent map.
#[derive(Debug, Default)]
pub struct InMemorySource {
    bundles: DashMap<String, ClaimBundle>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the full claim bundle for an identity.
    pub fn set_claims(&self, subject: &Address, network: &str, bundle: ClaimBundle) {
        self.bundles.insert(bundle_key(subject, network), bundle);
    }

    pub fn add_verification(&self, network: &str, verification: Verification) {
        self.bundles
            .entry(bundle_key(&verification.subject, network))
            .or_default()
            .verifications
            .push(verification);
    }

    pub fn add_vouch(&self, network: &str, vouch: Vouch) {
        self.bundles
            .entry(bundle_key(&vouch.subject, network))
            .or_default()
            .vouches
            .push(vouch);
    }

    pub fn add_flag(&self, network: &str, flag: Flag) {
        self.bundles
            .entry(bundle_key(&flag.subject, network))
            .or_default()
            .flags
            .push(flag);
    }
}

#[async_trait]
impl AttestationSource for InMemorySource {
    async fn fetch_claims(
        &self,
        subject: &Address,
        network: &str,
    ) -> Result<ClaimBundle, ClientError> {
        Ok(self
            .bundles
            .get(&bundle_key(subject, network))
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }
}

/// Raw per-agent records as they appear in a snapshot file. Each record is
/// decoded individually so one malformed entry never sinks the rest.
#[derive(Debug, Deserialize)]
struct RawBundle {
    #[serde(default)]
    verifications: Vec<serde_json::Value>,
    #[serde(default)]
    vouches: Vec<serde_json::Value>,
    #[serde(default)]
    flags: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    network: String,
    agents: HashMap<String, RawBundle>,
}

/// Attestation source backed by a JSON snapshot file.
///
/// Snapshot format: `{ "network": "...", "agents": { "0x…": { "verifications":
/// [...], "vouches": [...], "flags": [...] } } }`.
pub struct SnapshotSource {
    network: String,
    bundles: HashMap<String, ClaimBundle>,
}

impl SnapshotSource {
    /// Load a snapshot from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ClientError::Upstream(format!("failed to read snapshot: {}", e)))?;
        Self::from_json(&raw)
    }

    /// Parse a snapshot from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self, ClientError> {
        let snapshot: Snapshot = serde_json::from_str(raw)
            .map_err(|e| ClientError::MalformedClaim(format!("invalid snapshot: {}", e)))?;

        let mut bundles = HashMap::new();
        for (address, raw_bundle) in snapshot.agents {
            let subject = Address::parse(&address)?;
            let bundle = ClaimBundle {
                verifications: decode_records(raw_bundle.verifications, "verification"),
                vouches: decode_records(raw_bundle.vouches, "vouch"),
                flags: decode_records(raw_bundle.flags, "flag"),
            };
            bundles.insert(subject.to_lowercase_hex(), bundle);
        }

        Ok(Self {
            network: snapshot.network,
            bundles,
        })
    }

    /// The network this snapshot was taken from.
    pub fn network(&self) -> &str {
        &self.network
    }

    /// Number of identities in the snapshot.
    pub fn agent_count(&self) -> usize {
        self.bundles.len()
    }
}

/// Decode records one by one, skipping any that fail.
fn decode_records<T: serde::de::DeserializeOwned>(
    raw: Vec<serde_json::Value>,
    kind: &str,
) -> Vec<T> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(kind = kind, error = %e, "skipping malformed claim record");
                None
            }
        })
        .collect()
}

#[async_trait]
impl AttestationSource for SnapshotSource {
    async fn fetch_claims(
        &self,
        subject: &Address,
        network: &str,
    ) -> Result<ClaimBundle, ClientError> {
        if network != self.network {
            return Err(ClientError::Upstream(format!(
                "snapshot covers network '{}', not '{}'",
                self.network, network
            )));
        }

        Ok(self
            .bundles
            .get(&subject.to_lowercase_hex())
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn addr(n: u8) -> Address {
        Address::from_bytes([n; 20])
    }

    #[tokio::test]
    async fn test_in_memory_unknown_identity_is_empty() {
        let source = InMemorySource::new();
        let bundle = source.fetch_claims(&addr(1), "base").await.unwrap();
        assert!(bundle.is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_add_and_fetch() {
        let source = InMemorySource::new();
        let t = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();

        source.add_verification(
            "base",
            Verification::new(addr(1), addr(2), t, "twitter", "agent"),
        );
        source.add_vouch("base", Vouch::new(addr(3), addr(2), t, 4));

        let bundle = source.fetch_claims(&addr(2), "base").await.unwrap();
        assert_eq!(bundle.verifications.len(), 1);
        assert_eq!(bundle.vouches.len(), 1);
        assert!(bundle.flags.is_empty());

        // Different network is a separate keyspace.
        let other = source.fetch_claims(&addr(2), "base-sepolia").await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_roundtrip() {
        let t = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let vouch = Vouch::new(addr(3), addr(2), t, 4);
        let json = serde_json::json!({
            "network": "base",
            "agents": {
                addr(2).to_checksum(): {
                    "vouches": [vouch],
                }
            }
        });

        let source = SnapshotSource::from_json(&json.to_string()).unwrap();
        assert_eq!(source.network(), "base");
        assert_eq!(source.agent_count(), 1);

        let bundle = source.fetch_claims(&addr(2), "base").await.unwrap();
        assert_eq!(bundle.vouches, vec![vouch]);
    }

    #[tokio::test]
    async fn test_snapshot_skips_malformed_records() {
        let t = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let good = Vouch::new(addr(3), addr(2), t, 4);
        let json = serde_json::json!({
            "network": "base",
            "agents": {
                addr(2).to_checksum(): {
                    "vouches": [good, serde_json::json!({"strength": "not a vouch"})],
                }
            }
        });

        let source = SnapshotSource::from_json(&json.to_string()).unwrap();
        let bundle = source.fetch_claims(&addr(2), "base").await.unwrap();
        // One good record survives the malformed sibling.
        assert_eq!(bundle.vouches.len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_wrong_network_errors() {
        let json = serde_json::json!({ "network": "base", "agents": {} });
        let source = SnapshotSource::from_json(&json.to_string()).unwrap();
        let result = source.fetch_claims(&addr(1), "base-sepolia").await;
        assert!(matches!(result, Err(ClientError::Upstream(_))));
    }

    #[test]
    fn test_snapshot_invalid_json_rejected() {
        assert!(matches!(
            SnapshotSource::from_json("{ not json"),
            Err(ClientError::MalformedClaim(_))
        ));
    }
}
