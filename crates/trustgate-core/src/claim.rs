use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Unique identifier for a claim record.
///
/// Remote indexes supply their own opaque uids; locally generated claims use
/// UUIDv7 so ids sort chronologically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimId(pub String);

impl ClaimId {
    /// Wrap an existing uid.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh UUIDv7-based id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClaimId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Common view over the three claim kinds.
///
/// The score calculator folds verifications, vouches, and flags into a single
/// recency/diversity pass through this trait. Revoked claims must be excluded
/// from every computation; revocation is the only lifecycle mutation a claim
/// undergoes.
pub trait ClaimRecord {
    fn id(&self) -> &ClaimId;
    fn issuer(&self) -> &Address;
    fn subject(&self) -> &Address;
    fn issued_at(&self) -> DateTime<Utc>;
    fn revoked(&self) -> bool;
}

macro_rules! impl_claim_record {
    ($ty:ty) => {
        impl ClaimRecord for $ty {
            fn id(&self) -> &ClaimId {
                &self.id
            }
            fn issuer(&self) -> &Address {
                &self.issuer
            }
            fn subject(&self) -> &Address {
                &self.subject
            }
            fn issued_at(&self) -> DateTime<Utc> {
                self.issued_at
            }
            fn revoked(&self) -> bool {
                self.revoked
            }
        }
    };
}

/// A confirmed ownership of a handle on an external platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub id: ClaimId,
    pub issuer: Address,
    pub subject: Address,
    pub issued_at: DateTime<Utc>,
    pub revoked: bool,
    /// Platform name, e.g. "twitter" or "github".
    pub platform: String,
    /// Handle on that platform.
    pub handle: String,
}

impl Verification {
    pub fn new(
        issuer: Address,
        subject: Address,
        issued_at: DateTime<Utc>,
        platform: impl Into<String>,
        handle: impl Into<String>,
    ) -> Self {
        Self {
            id: ClaimId::generate(),
            issuer,
            subject,
            issued_at,
            revoked: false,
            platform: platform.into(),
            handle: handle.into(),
        }
    }
}

/// A positive endorsement of the subject with a 1-5 strength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vouch {
    pub id: ClaimId,
    pub issuer: Address,
    pub subject: Address,
    pub issued_at: DateTime<Utc>,
    pub revoked: bool,
    /// Endorsement strength, 1-5.
    pub strength: u8,
}

impl Vouch {
    pub fn new(issuer: Address, subject: Address, issued_at: DateTime<Utc>, strength: u8) -> Self {
        Self {
            id: ClaimId::generate(),
            issuer,
            subject,
            issued_at,
            revoked: false,
            strength,
        }
    }
}

/// A negative report about the subject with a 1-5 severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    pub id: ClaimId,
    pub issuer: Address,
    pub subject: Address,
    pub issued_at: DateTime<Utc>,
    pub revoked: bool,
    /// Report severity, 1-5.
    pub severity: u8,
}

impl Flag {
    pub fn new(issuer: Address, subject: Address, issued_at: DateTime<Utc>, severity: u8) -> Self {
        Self {
            id: ClaimId::generate(),
            issuer,
            subject,
            issued_at,
            revoked: false,
            severity,
        }
    }
}

impl_claim_record!(Verification);
impl_claim_record!(Vouch);
impl_claim_record!(Flag);
