use alloy::primitives::Address;
use thiserror::Error;

/// Errors raised by signer adapters.
///
/// Adapter failures are never retried inside the core; retry policy belongs
/// to the caller.
#[derive(Debug, Error)]
pub enum SignerError {
    /// The key material could not be loaded into a signer.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),
    /// The underlying signer failed or the ceremony was cancelled.
    #[error("signer unavailable: {0}")]
    Unavailable(String),
    /// A DER ECDSA signature could not be decoded into `(r, s)`.
    #[error("invalid DER signature encoding")]
    InvalidDerEncoding,
    /// The WebAuthn client data JSON has no `"challenge":` field.
    #[error("clientDataJSON has no challenge field")]
    MissingChallengeField,
    /// The recovery id is outside `{0, 1, 27, 28}`, indicating signer
    /// corruption rather than a recoverable condition.
    #[error("invalid signature recovery id {0}")]
    InvalidRecoveryId(u8),
    /// No session grant exists for the session key.
    #[error("no session grant found for session key {0}")]
    UnknownSession(Address),
}
