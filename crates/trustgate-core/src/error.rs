/// Validation errors for the core types.
///
/// These surface synchronously to the caller: a malformed address, an
/// out-of-range tier level, or an inconsistent policy is the caller's input
/// to fix. Failures of the attestation source live in the client crate's
/// error type.
#[derive(Debug, thiserror::Error)]
pub enum TrustError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid tier {tier}: must be between 0 and {max}")]
    InvalidTier { tier: u8, max: u8 },

    #[error("invalid tier policy: {0}")]
    InvalidPolicy(String),
}
