use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};

use crate::error::TrustError;

/// 20-byte agent identity address.
///
/// Parsed from `0x`-prefixed hex. All-lowercase and all-uppercase inputs are
/// accepted as checksum-agnostic; mixed-case inputs must carry a valid EIP-55
/// checksum. Display renders the checksummed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// Parse and validate an address string.
    pub fn parse(input: &str) -> Result<Self, TrustError> {
        let hex_part = input
            .strip_prefix("0x")
            .or_else(|| input.strip_prefix("0X"))
            .ok_or_else(|| {
                TrustError::InvalidAddress(format!("missing 0x prefix: {}", input))
            })?;

        if hex_part.len() != 40 {
            return Err(TrustError::InvalidAddress(format!(
                "expected 40 hex digits, got {}",
                hex_part.len()
            )));
        }

        let bytes = hex::decode(hex_part)
            .map_err(|e| TrustError::InvalidAddress(format!("invalid hex: {}", e)))?;
        let mut raw = [0u8; 20];
        raw.copy_from_slice(&bytes);
        let address = Self(raw);

        // Mixed-case input asserts an EIP-55 checksum; verify it.
        let has_lower = hex_part.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = hex_part.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper {
            let expected = address.checksum_hex();
            if hex_part != expected {
                return Err(TrustError::InvalidAddress(format!(
                    "checksum mismatch: {}",
                    input
                )));
            }
        }

        Ok(address)
    }

    /// Create an address from raw bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Raw 20-byte form.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase `0x…` form, used for cache keys.
    pub fn to_lowercase_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// EIP-55 checksummed `0x…` form.
    pub fn to_checksum(&self) -> String {
        format!("0x{}", self.checksum_hex())
    }

    fn checksum_hex(&self) -> String {
        let lower = hex::encode(self.0);
        let digest = Keccak256::digest(lower.as_bytes());

        lower
            .chars()
            .enumerate()
            .map(|(i, c)| {
                let nibble = if i % 2 == 0 {
                    digest[i / 2] >> 4
                } else {
                    digest[i / 2] & 0x0f
                };
                if nibble >= 8 {
                    c.to_ascii_uppercase()
                } else {
                    c
                }
            })
            .collect()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_checksum())
    }
}

impl std::str::FromStr for Address {
    type Err = TrustError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
