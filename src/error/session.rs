use alloy::primitives::Address;
use thiserror::Error;

/// Errors raised by session policy checks.
///
/// A policy failure aborts the whole signing request; no signature is
/// produced for an operation that fails any of these checks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The session key was revoked by an owner.
    #[error("session key {0} is revoked")]
    Revoked(Address),
    /// The session validity window has not started yet.
    #[error("session key {session_key} is not valid before {valid_after} (now {now})")]
    NotYetValid {
        /// The session key address.
        session_key: Address,
        /// Start of the validity window.
        valid_after: u64,
        /// The current timestamp.
        now: u64,
    },
    /// The session validity window has passed.
    #[error("session key {session_key} expired at {valid_until} (now {now})")]
    Expired {
        /// The session key address.
        session_key: Address,
        /// End of the validity window.
        valid_until: u64,
        /// The current timestamp.
        now: u64,
    },
    /// A call destination is not whitelisted for the session key.
    #[error("destination {0} is not whitelisted for this session key")]
    NotWhitelisted(Address),
}
