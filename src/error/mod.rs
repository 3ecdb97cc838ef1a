//! Signing core error types.

use thiserror::Error;

mod encoding;
pub use encoding::EncodingError;

mod payload;
pub use payload::PayloadError;

mod session;
pub use session::SessionError;

mod signer;
pub use signer::SignerError;

/// The overarching error type returned by the authorization pipeline.
///
/// Every failure mode surfaces as a specific variant so callers can tell a
/// cancelled signer ceremony apart from an expired session or a malformed
/// request. Partial signatures are never returned alongside an error.
#[derive(Debug, Error)]
pub enum AuthorizationError {
    /// The pending operation or signing context is malformed.
    #[error(transparent)]
    Payload(#[from] PayloadError),
    /// A session policy check rejected the operation.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// A signer failed or produced an invalid signature.
    #[error(transparent)]
    Signer(#[from] SignerError),
    /// A signature byte layout could not be encoded or decoded.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    /// An error occurred during ABI encoding/decoding.
    #[error(transparent)]
    Abi(#[from] alloy::sol_types::Error),
    /// An error occurred while hashing dynamic typed data.
    #[error(transparent)]
    DynAbi(#[from] alloy::dyn_abi::Error),
    /// An internal error occurred in an injected collaborator.
    #[error(transparent)]
    Internal(#[from] eyre::Error),
}
