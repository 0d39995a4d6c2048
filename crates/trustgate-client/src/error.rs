use trustgate_core::TrustError;

/// Errors from the client layer.
///
/// `Upstream` failures never escape the scoring entry points; they degrade
/// to the canonical empty result so access gating fails toward the
/// least-privileged tier. They do surface from operations whose whole point
/// is the fetch, like loading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Core(#[from] TrustError),

    #[error("upstream attestation source failed: {0}")]
    Upstream(String),

    #[error("malformed claim record: {0}")]
    MalformedClaim(String),
}
