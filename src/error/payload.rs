use crate::context::VerifierRole;
use alloy::primitives::FixedBytes;
use thiserror::Error;

/// Errors related to malformed pending operations or signing context.
///
/// These are raised synchronously, before any signing attempt.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    /// Both `initCode` and `factory`/`factoryData` are populated.
    #[error("op carries both initCode and factory/factoryData, which is ambiguous")]
    AmbiguousInitCode,
    /// `factoryData` is populated without a `factory` address.
    #[error("op carries factoryData without a factory address")]
    DanglingFactoryData,
    /// The chain id is missing or zero.
    #[error("chain id is missing or zero")]
    MissingChainId,
    /// No verifying contract is configured for the given role.
    #[error("no verifying contract configured for {0}")]
    MissingVerifyingContract(VerifierRole),
    /// The account has no registered signer.
    #[error("no signer registered for account {0}")]
    MissingSigner(alloy::primitives::Address),
    /// The call data does not match any decodable execution shape.
    #[error("unsupported call data with selector {0}")]
    UnsupportedCallData(FixedBytes<4>),
}
